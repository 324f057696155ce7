use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{LoginRequest, RefreshRequest, RefreshResponse},
        jwt::TokenPair,
        services::{obtain_pair, refresh_access},
    },
    body::JsonObject,
    error::{ApiError, FieldErrors},
    state::AppState,
    users::validation::{normalize_email, required},
};

pub fn token_routes() -> Router<AppState> {
    Router::new()
        .route("/token", post(obtain_token))
        .route("/token/refresh", post(refresh_token))
}

/// POST /token
#[instrument(skip(state, payload))]
pub async fn obtain_token(
    State(state): State<AppState>,
    JsonObject(payload): JsonObject<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let mut errors = FieldErrors::default();
    let email = required(&mut errors, "email", payload.email);
    let password = required(&mut errors, "password", payload.password);
    errors.into_result()?;
    let (Some(email), Some(password)) = (email, password) else {
        return Err(ApiError::Internal(anyhow::anyhow!("validated login field missing")));
    };

    let email = normalize_email(&email);
    let pair = obtain_pair(state.store.as_ref(), &state.keys, &email, &password).await?;
    Ok(Json(pair))
}

/// POST /token/refresh
#[instrument(skip(state, payload))]
pub async fn refresh_token(
    State(state): State<AppState>,
    JsonObject(payload): JsonObject<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let mut errors = FieldErrors::default();
    let refresh = required(&mut errors, "refresh", payload.refresh);
    errors.into_result()?;
    let Some(refresh) = refresh else {
        return Err(ApiError::Internal(anyhow::anyhow!("validated refresh field missing")));
    };

    let (user_id, access) = refresh_access(state.store.as_ref(), &state.keys, &refresh)
        .await
        .map_err(|f| f.into_token_error())?;
    info!(user_id = %user_id, "access token refreshed");
    Ok(Json(RefreshResponse { access }))
}

#[cfg(test)]
mod tests {
    use crate::app::{build_app, test_support::send};
    use crate::state::AppState;
    use axum::{http::StatusCode, Router};
    use serde_json::{json, Value};

    async fn app_with_ana() -> (Router, Value) {
        let app = build_app(AppState::fake());
        let (status, registered) = send(
            &app,
            "POST",
            "/api/register",
            None,
            Some(json!({
                "first_name": "Ana",
                "email": "ana@x.com",
                "password": "p1",
                "confirm_password": "p1",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        (app, registered)
    }

    #[tokio::test]
    async fn login_returns_token_pair() {
        let (app, _) = app_with_ana().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/token",
            None,
            Some(json!({ "email": " ana@X.com ", "password": "p1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["access"].as_str().unwrap().is_empty());
        assert!(!body["refresh"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn login_with_wrong_password_uses_uniform_envelope() {
        let (app, _) = app_with_ana().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/token",
            None,
            Some(json!({ "email": "ana@x.com", "password": "nope" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Invalid credentials");
        assert_eq!(
            body["details"],
            "No active account found with the given credentials"
        );
    }

    #[tokio::test]
    async fn login_with_unknown_email_looks_the_same() {
        let (app, _) = app_with_ana().await;
        let (wrong_pw_status, wrong_pw) = send(
            &app,
            "POST",
            "/api/token",
            None,
            Some(json!({ "email": "ana@x.com", "password": "nope" })),
        )
        .await;
        let (unknown_status, unknown) = send(
            &app,
            "POST",
            "/api/token",
            None,
            Some(json!({ "email": "bob@x.com", "password": "p1" })),
        )
        .await;
        assert_eq!(wrong_pw_status, unknown_status);
        assert_eq!(wrong_pw, unknown);
    }

    #[tokio::test]
    async fn login_missing_fields_are_field_errors() {
        let (app, _) = app_with_ana().await;
        let (status, body) = send(&app, "POST", "/api/token", None, Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "email": ["This field is required."],
                "password": ["This field is required."],
            })
        );
    }

    #[tokio::test]
    async fn login_rejects_positional_array_body() {
        let (app, _) = app_with_ana().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/token",
            None,
            Some(json!(["ana@x.com", "p1"])),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());
        assert!(body.get("access").is_none());
    }

    #[tokio::test]
    async fn refresh_rejects_positional_array_body() {
        let (app, registered) = app_with_ana().await;
        let refresh = registered["refresh"].as_str().unwrap();

        let (status, body) = send(
            &app,
            "POST",
            "/api/token/refresh",
            None,
            Some(json!([refresh])),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());
        assert!(body.get("access").is_none());
    }

    #[tokio::test]
    async fn refresh_mints_new_access_token() {
        let (app, registered) = app_with_ana().await;
        let refresh = registered["refresh"].as_str().unwrap();

        let (status, body) = send(
            &app,
            "POST",
            "/api/token/refresh",
            None,
            Some(json!({ "refresh": refresh })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let access = body["access"].as_str().unwrap();

        let (status, me) = send(&app, "GET", "/api/me", Some(access), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["email"], "ana@x.com");
    }

    #[tokio::test]
    async fn refresh_rejects_access_token() {
        let (app, registered) = app_with_ana().await;
        let access = registered["access"].as_str().unwrap();

        let (status, body) = send(
            &app,
            "POST",
            "/api/token/refresh",
            None,
            Some(json!({ "refresh": access })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Invalid token");
        assert_eq!(body["details"], "Token has wrong type");
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = build_app(AppState::fake());
        let (status, _) = send(&app, "GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
