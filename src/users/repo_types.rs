use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Campus a student belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Campus {
    Madrid,
    Barcelona,
    Miami,
    Paris,
    Berlin,
    Amsterdam,
    #[serde(rename = "México")]
    Mexico,
    #[serde(rename = "Sao Paulo")]
    SaoPaulo,
    Lisbon,
    Remote,
}

impl Campus {
    pub const ALL: [Campus; 10] = [
        Campus::Madrid,
        Campus::Barcelona,
        Campus::Miami,
        Campus::Paris,
        Campus::Berlin,
        Campus::Amsterdam,
        Campus::Mexico,
        Campus::SaoPaulo,
        Campus::Lisbon,
        Campus::Remote,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Campus::Madrid => "Madrid",
            Campus::Barcelona => "Barcelona",
            Campus::Miami => "Miami",
            Campus::Paris => "Paris",
            Campus::Berlin => "Berlin",
            Campus::Amsterdam => "Amsterdam",
            Campus::Mexico => "México",
            Campus::SaoPaulo => "Sao Paulo",
            Campus::Lisbon => "Lisbon",
            Campus::Remote => "Remote",
        }
    }
}

/// Program a student is enrolled in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Course {
    #[serde(rename = "Web Dev")]
    WebDev,
    #[serde(rename = "UX/UI")]
    UxUi,
    #[serde(rename = "Data Analytics")]
    DataAnalytics,
    #[serde(rename = "Cyber Security")]
    CyberSecurity,
}

impl Course {
    pub const ALL: [Course; 4] = [
        Course::WebDev,
        Course::UxUi,
        Course::DataAnalytics,
        Course::CyberSecurity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Course::WebDev => "Web Dev",
            Course::UxUi => "UX/UI",
            Course::DataAnalytics => "Data Analytics",
            Course::CyberSecurity => "Cyber Security",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{value}` is not a valid {field}")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}

impl FromStr for Campus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Campus::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownVariant { field: "campus", value: s.to_string() })
    }
}

impl FromStr for Course {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Course::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownVariant { field: "course", value: s.to_string() })
    }
}

/// User record as exposed by the service.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never exposed
    pub campus: Option<Campus>,
    pub course: Option<Course>,
    pub image: Option<String>,
}

/// Fields needed to insert a user; the hash is computed by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub campus: Option<Campus>,
    pub course: Option<Course>,
}

impl From<NewUser> for User {
    fn from(n: NewUser) -> Self {
        Self {
            id: n.id,
            username: n.username,
            password_hash: n.password_hash,
            campus: n.campus,
            course: n.course,
            image: None,
        }
    }
}

/// Raw `users` row; enum columns are stored as text.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub campus: Option<String>,
    pub course: Option<String>,
    pub image: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = UnknownVariant;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            username: r.username,
            password_hash: r.password_hash,
            campus: r.campus.as_deref().map(str::parse::<Campus>).transpose()?,
            course: r.course.as_deref().map(str::parse::<Course>).transpose()?,
            image: r.image,
        })
    }
}
