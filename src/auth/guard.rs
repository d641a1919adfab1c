//! Access guard: bearer-token verification in front of protected routes.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{
    auth::{claims::Claims, jwt::JwtKeys},
    error::AppError,
    state::AppState,
};

#[derive(Clone)]
pub struct AccessGuard {
    keys: JwtKeys,
}

impl AccessGuard {
    pub fn new(keys: JwtKeys) -> Self {
        Self { keys }
    }

    /// Validates the bearer token in `headers` and returns its claims.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<Claims, AppError> {
        let header = headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let token = bearer_token(header)
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header".into()))?;

        self.keys.verify(token).map_err(|e| {
            warn!(kind = ?e.kind(), "rejected token");
            AppError::Unauthorized("Invalid or expired token".into())
        })
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Middleware that rejects unauthenticated requests and stores the claims
/// in the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = state.guard.authorize(request.headers())?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Claims of the caller, as attached by [`require_auth`].
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::claims::Identity, config::AppConfig};
    use axum::http::HeaderValue;
    use time::{Duration, OffsetDateTime};
    use uuid::Uuid;

    fn keys() -> JwtKeys {
        JwtKeys::new(&AppConfig::test_default().jwt)
    }

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            username: "ana".into(),
            campus: None,
            course: None,
            image: None,
        }
    }

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let guard = AccessGuard::new(keys());
        let err = guard.authorize(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn non_bearer_scheme_is_unauthorized() {
        let guard = AccessGuard::new(keys());
        let token = keys().sign(&identity()).unwrap();
        let err = guard.authorize(&headers(&format!("Basic {token}"))).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        let err = guard.authorize(&headers("Bearer ")).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn malformed_token_is_unauthorized() {
        let guard = AccessGuard::new(keys());
        let err = guard.authorize(&headers("Bearer not.a.jwt")).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let guard = AccessGuard::new(keys());
        let issued = OffsetDateTime::now_utc() - Duration::hours(7);
        let token = keys().sign_at(&identity(), issued).unwrap();
        let err = guard.authorize(&headers(&format!("Bearer {token}"))).unwrap_err();
        match err {
            AppError::Unauthorized(msg) => assert_eq!(msg, "Invalid or expired token"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn valid_token_yields_claims() {
        let guard = AccessGuard::new(keys());
        let id = identity();
        let token = keys().sign(&id).unwrap();
        let claims = guard.authorize(&headers(&format!("bearer {token}"))).unwrap();
        assert_eq!(claims.sub, id.id);
        assert_eq!(claims.username, "ana");
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("BEARER abc"), Some("abc"));
        assert_eq!(bearer_token("Bearerabc"), None);
        assert_eq!(bearer_token("Token abc"), None);
    }
}
