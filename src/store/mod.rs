pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::users::repo_types::{NewUser, Profile, User, UserChanges};

/// Column guarded by a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Username,
}

impl UniqueField {
    pub fn name(self) -> &'static str {
        match self {
            UniqueField::Email => "email",
            UniqueField::Username => "username",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate {}", .0.name())]
    Duplicate(UniqueField),
    #[error("user not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Persistence seam for users and their profiles.
///
/// Writes touching a user always write its profile in the same unit of work:
/// no reader may observe a user without a profile.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool>;
    async fn username_exists(&self, username: &str) -> anyhow::Result<bool>;

    /// Insert the user and its initial profile atomically.
    async fn create_user_with_profile(&self, new: NewUser) -> Result<(User, Profile), StoreError>;

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn profile_for(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>>;

    /// Save the user and its profile together, refreshing `updated_at`.
    async fn save_user_and_profile(
        &self,
        user_id: Uuid,
        changes: UserChanges,
    ) -> Result<(User, Profile), StoreError>;
}
