use serde::{Deserialize, Serialize};

/// Request body for `POST /token`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Request body for `POST /token/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Response of `POST /token/refresh`.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access: String,
}
