use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::repo_types::{Campus, Course, User};

/// Request body for signup. Fields are optional so that missing and empty
/// values are reported the same way.
#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub campus: Option<String>,
    pub course: Option<String>,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Created user without credentials.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub campus: Option<Campus>,
    pub course: Option<Course>,
}

impl From<User> for UserSummary {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            campus: u.campus,
            course: u.course,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub auth_token: String,
}
