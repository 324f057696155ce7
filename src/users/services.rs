use tracing::{info, warn};

use super::repo_types::{NewUser, Profile, User, UserChanges};
use super::validation::{duplicate_message, ValidatedSignup};
use crate::auth::password::hash_password_blocking;
use crate::error::{ApiError, FieldErrors};
use crate::store::{StoreError, UserStore};
use uuid::Uuid;

fn store_error(err: StoreError) -> ApiError {
    match err {
        StoreError::Duplicate(field) => {
            warn!(field = field.name(), "unique constraint hit on write");
            ApiError::Validation(FieldErrors::single("email", duplicate_message(field)))
        }
        StoreError::NotFound => ApiError::Unauthorized("User not found".into()),
        StoreError::Other(e) => ApiError::Internal(e),
    }
}

/// Create the user and its profile. The email doubles as the username.
pub async fn register_user(
    store: &dyn UserStore,
    signup: ValidatedSignup,
) -> Result<(User, Profile), ApiError> {
    let password_hash = hash_password_blocking(signup.password).await?;
    let new = NewUser {
        username: signup.email.clone(),
        email: signup.email,
        first_name: signup.first_name,
        password_hash,
    };
    let (user, profile) = store
        .create_user_with_profile(new)
        .await
        .map_err(store_error)?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((user, profile))
}

/// Load the user and its profile.
pub async fn load_user(store: &dyn UserStore, user_id: Uuid) -> Result<(User, Profile), ApiError> {
    let user = store
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;
    let profile = store
        .profile_for(user_id)
        .await?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("user {user_id} has no profile")))?;
    Ok((user, profile))
}

pub async fn update_user(
    store: &dyn UserStore,
    user_id: Uuid,
    changes: UserChanges,
) -> Result<(User, Profile), ApiError> {
    let saved = store
        .save_user_and_profile(user_id, changes)
        .await
        .map_err(store_error)?;
    info!(user_id = %user_id, "user updated");
    Ok(saved)
}
