use axum::{
    extract::{rejection::JsonRejection, State},
    middleware,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::guard::{require_auth, AuthUser},
    error::AppResult,
    state::AppState,
    users::{dto::UpdateUserRequest, repo_types::User},
};

pub fn users_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(get_user).put(update_user))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

#[instrument(skip(state, claims))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> AppResult<Json<User>> {
    let user = state.credentials.get_profile(claims.sub).await?;
    Ok(Json(user))
}

#[instrument(skip(state, claims, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> AppResult<Json<User>> {
    let Json(body) = payload?;
    let user = state
        .credentials
        .update_profile_image(claims.sub, body.image)
        .await?;
    Ok(Json(user))
}
