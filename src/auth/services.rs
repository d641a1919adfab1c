use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        claims::Identity,
        jwt::JwtKeys,
        password::{hash_password, is_strong_password, verify_password},
    },
    error::{AppError, AppResult},
    users::{
        repo::UserStore,
        repo_types::{Campus, Course, NewUser},
    },
};

pub use crate::auth::dto::UserSummary;

/// Signup, login and profile access over a [`UserStore`].
#[derive(Clone)]
pub struct CredentialService {
    pub(crate) store: Arc<dyn UserStore>,
    keys: JwtKeys,
}

/// Trimmed, lowercased form under which usernames are stored.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn required(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Absent is allowed; present values must be non-empty members of `T`.
fn optional_variant<T>(value: Option<&str>) -> AppResult<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(None),
        Some("") => Err(AppError::Validation(
            "Provide username, password, campus and course".into(),
        )),
        Some(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|e| AppError::Validation(e.to_string())),
    }
}

impl CredentialService {
    pub fn new(store: Arc<dyn UserStore>, keys: JwtKeys) -> Self {
        Self { store, keys }
    }

    pub async fn register(
        &self,
        username: Option<&str>,
        password: Option<&str>,
        campus: Option<&str>,
        course: Option<&str>,
    ) -> AppResult<UserSummary> {
        let username = required(username).map(normalize_username).unwrap_or_default();
        let password = match required(password) {
            Some(p) if !username.is_empty() => p,
            _ => {
                return Err(AppError::Validation(
                    "Provide username, password, campus and course".into(),
                ))
            }
        };
        let campus = optional_variant::<Campus>(campus)?;
        let course = optional_variant::<Course>(course)?;

        if !is_strong_password(password) {
            warn!(%username, "weak password rejected");
            return Err(AppError::WeakPassword);
        }

        if self.store.find_by_username(&username).await?.is_some() {
            warn!(%username, "username already exists");
            return Err(AppError::Conflict);
        }

        let password_hash = hash_password(password)?;

        // a concurrent signup may still win here; the store reports it as Duplicate
        let user = self
            .store
            .insert(NewUser {
                id: Uuid::new_v4(),
                username,
                password_hash,
                campus,
                course,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user.into())
    }

    /// Returns a signed token for valid credentials.
    pub async fn authenticate(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> AppResult<String> {
        let username = required(username).map(normalize_username).unwrap_or_default();
        let password = match required(password) {
            Some(p) if !username.is_empty() => p,
            _ => return Err(AppError::Validation("Provide username and password.".into())),
        };

        let user = self
            .store
            .find_by_username(&username)
            .await?
            .ok_or_else(|| {
                warn!(%username, "login unknown username");
                AppError::NotFound("Username not found.".into())
            })?;

        if !verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AppError::Authentication);
        }

        let token = self.keys.sign(&Identity::from(&user))?;
        info!(user_id = %user.id, "user logged in");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, users::memory::MemoryUserStore};

    fn service() -> CredentialService {
        let keys = JwtKeys::new(&AppConfig::test_default().jwt);
        CredentialService::new(Arc::new(MemoryUserStore::new()), keys)
    }

    async fn signup(svc: &CredentialService, username: &str, password: &str) -> AppResult<UserSummary> {
        svc.register(Some(username), Some(password), Some("Madrid"), Some("Web Dev"))
            .await
    }

    #[tokio::test]
    async fn register_returns_summary_without_credentials() {
        let svc = service();
        let summary = signup(&svc, "  Ana  ", "Abc123").await.unwrap();
        assert_eq!(summary.username, "ana");
        assert_eq!(summary.campus, Some(Campus::Madrid));
        assert_eq!(summary.course, Some(Course::WebDev));

        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("Abc123"));
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));

        let stored = svc.store.find_by_username("ana").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "Abc123");
    }

    #[tokio::test]
    async fn register_rejects_weak_password() {
        let svc = service();
        let err = signup(&svc, "ana", "abc123").await.unwrap_err();
        assert!(matches!(err, AppError::WeakPassword));
        assert!(signup(&svc, "ana", "Abc123").await.is_ok());
    }

    #[tokio::test]
    async fn register_rejects_empty_fields() {
        let svc = service();
        for (u, p, c, k) in [
            (Some(""), Some("Abc123"), Some("Madrid"), Some("Web Dev")),
            (Some("   "), Some("Abc123"), None, None),
            (Some("ana"), Some(""), None, None),
            (None, Some("Abc123"), None, None),
            (Some("ana"), Some("Abc123"), Some(""), None),
            (Some("ana"), Some("Abc123"), None, Some("")),
        ] {
            let err = svc.register(u, p, c, k).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{u:?} {p:?} {c:?} {k:?}");
        }
    }

    #[tokio::test]
    async fn register_rejects_unknown_campus() {
        let svc = service();
        let err = svc
            .register(Some("ana"), Some("Abc123"), Some("Atlantis"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn register_allows_missing_campus_and_course() {
        let svc = service();
        let summary = svc.register(Some("ana"), Some("Abc123"), None, None).await.unwrap();
        assert_eq!(summary.campus, None);
        assert_eq!(summary.course, None);
    }

    #[tokio::test]
    async fn register_conflicts_case_insensitively() {
        let svc = service();
        signup(&svc, "ana", "Abc123").await.unwrap();
        let err = signup(&svc, "ANA ", "Abc123").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict));
    }

    #[tokio::test]
    async fn concurrent_register_same_username_has_one_winner() {
        let svc = service();
        let (a, b) = tokio::join!(signup(&svc, "ana", "Abc123"), signup(&svc, "ana", "Xyz789"));
        let results = [a, b];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(AppError::Conflict))));
    }

    #[tokio::test]
    async fn concurrent_register_on_threads_has_one_winner() {
        let svc = service();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let svc = svc.clone();
                tokio::spawn(async move { signup(&svc, "ana", "Abc123").await })
            })
            .collect();
        let mut ok = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => ok += 1,
                Err(e) => assert!(matches!(e, AppError::Conflict)),
            }
        }
        assert_eq!(ok, 1);
    }

    #[tokio::test]
    async fn authenticate_returns_token_with_profile() {
        let svc = service();
        let created = signup(&svc, "ana", "Abc123").await.unwrap();
        let token = svc.authenticate(Some("Ana"), Some("Abc123")).await.unwrap();

        let claims = svc.keys.verify(&token).unwrap();
        assert_eq!(claims.sub, created.id);
        assert_eq!(claims.username, "ana");
        assert_eq!(claims.campus, Some(Campus::Madrid));
        assert_eq!(claims.course, Some(Course::WebDev));
        assert_eq!(claims.image, None);
    }

    #[tokio::test]
    async fn authenticate_failures() {
        let svc = service();
        signup(&svc, "ana", "Abc123").await.unwrap();

        let err = svc.authenticate(Some("ana"), Some("Abc1234")).await.unwrap_err();
        assert!(matches!(err, AppError::Authentication));

        let err = svc.authenticate(Some("bob"), Some("Abc123")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = svc.authenticate(Some(""), Some("Abc123")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = svc.authenticate(Some("ana"), None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
