use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{MeResponse, RegisterRequest, RegisterResponse, UpdateMeRequest},
    services::{load_user, register_user, update_user},
    validation::{validate_signup, validate_update},
};
use crate::{auth::extractors::AuthUser, body::JsonObject, error::ApiError, state::AppState};

pub fn register_routes() -> Router<AppState> {
    Router::new().route("/register", post(register))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me).patch(update_me))
}

/// POST /register
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonObject(payload): JsonObject<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let signup = validate_signup(state.store.as_ref(), payload).await?;
    let (user, _profile) = register_user(state.store.as_ref(), signup).await?;
    let tokens = state
        .keys
        .issue_pair(user.id)
        .map_err(|e| ApiError::Internal(e.into()))?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            name: user.first_name,
            email: user.email,
            username: user.username,
            access: tokens.access,
            refresh: tokens.refresh,
        }),
    ))
}

/// GET /me
#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MeResponse>, ApiError> {
    let (user, profile) = load_user(state.store.as_ref(), user_id).await?;
    Ok(Json(MeResponse::new(user, profile)))
}

/// PATCH /me
#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonObject(payload): JsonObject<UpdateMeRequest>,
) -> Result<Json<MeResponse>, ApiError> {
    let changes = validate_update(payload)?;
    let (user, profile) = update_user(state.store.as_ref(), user_id, changes).await?;
    Ok(Json(MeResponse::new(user, profile)))
}
