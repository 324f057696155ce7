use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Profile, User};

/// Request body for `POST /register`. Fields are optional so that missing
/// ones are reported per field instead of as a body parse error.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, alias = "confirmPassword")]
    pub confirm_password: Option<String>,
}

/// Response of a successful registration.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub name: String,
    pub email: String,
    pub username: String,
    pub access: String,
    pub refresh: String,
}

/// Request body for `PATCH /me`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMeRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub full_name: String,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub verified: bool,
}

/// Public view of the caller and their profile.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub profile: ProfileView,
}

impl MeResponse {
    pub fn new(user: User, profile: Profile) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            name: user.first_name,
            created_at: user.created_at,
            updated_at: user.updated_at,
            profile: ProfileView {
                full_name: profile.full_name,
                bio: profile.bio,
                image: profile.image,
                verified: profile.verified,
            },
        }
    }
}
