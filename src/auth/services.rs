use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::jwt::{JwtKeys, TokenError, TokenKind, TokenPair};
use super::password::verify_password_blocking;
use crate::error::ApiError;
use crate::store::UserStore;
use crate::users::repo_types::User;

/// Reasons a token-obtain or token-refresh request fails.
#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("No active account found with the given credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Login boundary: every credential or token failure collapses into the
/// uniform "Invalid credentials" envelope. Store failures remain internal.
impl From<AuthFailure> for ApiError {
    fn from(failure: AuthFailure) -> Self {
        match failure {
            AuthFailure::Store(e) => ApiError::Internal(e),
            other => ApiError::InvalidCredentials {
                details: other.to_string(),
            },
        }
    }
}

impl AuthFailure {
    /// Refresh boundary: failures surface as a 401 token error instead.
    pub fn into_token_error(self) -> ApiError {
        match self {
            AuthFailure::Store(e) => ApiError::Internal(e),
            other => ApiError::InvalidToken {
                details: other.to_string(),
            },
        }
    }
}

/// Look the user up by email and check the password.
pub async fn authenticate(
    store: &dyn UserStore,
    email: &str,
    password: &str,
) -> Result<User, AuthFailure> {
    let Some(user) = store.find_by_email(email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AuthFailure::InvalidCredentials);
    };

    if !verify_password_blocking(password.to_owned(), user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AuthFailure::InvalidCredentials);
    }
    Ok(user)
}

/// Credentials in, token pair out.
pub async fn obtain_pair(
    store: &dyn UserStore,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> Result<TokenPair, AuthFailure> {
    let user = authenticate(store, email, password).await?;
    let pair = keys.issue_pair(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(pair)
}

/// Verify a refresh token and mint a new access token for its subject.
pub async fn refresh_access(
    store: &dyn UserStore,
    keys: &JwtKeys,
    refresh: &str,
) -> Result<(Uuid, String), AuthFailure> {
    let claims = keys.verify_kind(refresh, TokenKind::Refresh)?;
    if store.find_by_id(claims.sub).await?.is_none() {
        warn!(user_id = %claims.sub, "refresh for unknown user");
        return Err(AuthFailure::InvalidCredentials);
    }
    let access = keys.sign_access(claims.sub)?;
    Ok((claims.sub, access))
}
