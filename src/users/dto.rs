use serde::Deserialize;

/// Request body for `PUT /users`. A missing or `null` image clears it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub image: Option<String>,
}
