use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Image reference given to profiles created without one.
pub const DEFAULT_PROFILE_IMAGE: &str = "default.jpg";

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,                   // unique user ID
    pub email: String,              // login identifier
    pub username: String,           // same as email for self-registered users
    pub first_name: String,
    pub password_hash: String,      // Argon2 PHC string, never sent to clients
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime, // bumped on every save
}

/// One-to-one companion record of a [`User`].
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct Profile {
    pub user_id: Uuid,
    pub full_name: String,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub verified: bool,
}

impl Profile {
    /// Initial profile for a freshly created user.
    pub fn initial_for(user: &User) -> Self {
        Self {
            user_id: user.id,
            full_name: user.first_name.clone(),
            bio: None,
            image: Some(DEFAULT_PROFILE_IMAGE.to_string()),
            verified: false,
        }
    }
}

/// Columns needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub password_hash: String,
}

/// Partial update applied to a user and its profile in one save.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub full_name: Option<String>,
    pub bio: Option<String>,
}
