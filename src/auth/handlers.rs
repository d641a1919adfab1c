use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, instrument};

use crate::{
    auth::{
        claims::Claims,
        dto::{LoginRequest, LoginResponse, SignupRequest, SignupResponse},
        guard::{require_auth, AuthUser},
    },
    error::AppResult,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

pub fn verify_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/verify", get(verify))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<SignupResponse>)> {
    let Json(body) = payload?;
    let user = state
        .credentials
        .register(
            body.username.as_deref(),
            body.password.as_deref(),
            body.campus.as_deref(),
            body.course.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(SignupResponse { user })))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let Json(body) = payload?;
    let auth_token = state
        .credentials
        .authenticate(body.username.as_deref(), body.password.as_deref())
        .await?;
    Ok(Json(LoginResponse { auth_token }))
}

/// Echoes the verified token payload back to the client.
#[instrument(skip(claims))]
pub async fn verify(AuthUser(claims): AuthUser) -> Json<Claims> {
    debug!(user_id = %claims.sub, "token verified");
    Json(claims)
}
