use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::users::repo_types::{NewUser, User, UserRow};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("username already taken")]
    Duplicate,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Persistent user collection. Implementations enforce username uniqueness
/// atomically on insert.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
    /// Returns `None` when no user has this id.
    async fn update_image(&self, id: Uuid, image: Option<String>)
        -> Result<Option<User>, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const UNIQUE_VIOLATION: &str = "23505";

fn to_user(row: UserRow) -> Result<User, StoreError> {
    User::try_from(row)
        .context("decode users row")
        .map_err(StoreError::Backend)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, campus, course, image
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await
        .context("find user by username")?;
        row.map(to_user).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, campus, course, image
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        row.map(to_user).transpose()
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let res = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username, password_hash, campus, course)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, password_hash, campus, course, image
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.campus.map(|c| c.as_str()))
        .bind(user.course.map(|c| c.as_str()))
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(row) => to_user(row),
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                Err(StoreError::Duplicate)
            }
            Err(e) => Err(StoreError::Backend(anyhow::Error::new(e).context("insert user"))),
        }
    }

    async fn update_image(
        &self,
        id: Uuid,
        image: Option<String>,
    ) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
               SET image = $2
             WHERE id = $1
            RETURNING id, username, password_hash, campus, course, image
            "#,
        )
        .bind(id)
        .bind(image)
        .fetch_optional(&self.db)
        .await
        .context("update user image")?;
        row.map(to_user).transpose()
    }
}
