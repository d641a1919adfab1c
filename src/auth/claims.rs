use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::repo_types::{Campus, Course, User};

/// JWT payload: the user's public profile plus registered claims.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: Uuid,               // user ID
    pub username: String,
    pub campus: Option<Campus>,
    pub course: Option<Course>,
    pub image: Option<String>,
    pub iat: usize,              // issued at (unix timestamp)
    pub exp: usize,              // expires at (unix timestamp)
    pub iss: String,
    pub aud: String,
}

/// Public fields of a user that go into a token.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub campus: Option<Campus>,
    pub course: Option<Course>,
    pub image: Option<String>,
}

impl From<&User> for Identity {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            campus: u.campus,
            course: u.course,
            image: u.image.clone(),
        }
    }
}
