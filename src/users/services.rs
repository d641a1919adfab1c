use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::services::CredentialService,
    error::{AppError, AppResult},
    users::repo_types::User,
};

fn user_not_found(id: Uuid) -> AppError {
    warn!(user_id = %id, "user not found");
    AppError::NotFound("User not found.".into())
}

impl CredentialService {
    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<User> {
        self.store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| user_not_found(user_id))
    }

    /// Replaces the profile image; `None` clears it.
    pub async fn update_profile_image(
        &self,
        user_id: Uuid,
        image: Option<String>,
    ) -> AppResult<User> {
        let user = self
            .store
            .update_image(user_id, image)
            .await?
            .ok_or_else(|| user_not_found(user_id))?;
        info!(user_id = %user.id, "profile image updated");
        Ok(user)
    }
}
