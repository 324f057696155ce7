use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use super::dto::{RegisterRequest, UpdateMeRequest};
use super::repo_types::UserChanges;
use crate::error::{ApiError, FieldErrors, BLANK, REQUIRED};
use crate::store::{UniqueField, UserStore};

pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const PASSWORD_MISMATCH: &str = "Passwords do not match.";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trims and lowercases the domain; the local part keeps its case.
pub(crate) fn normalize_email(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => trimmed.to_string(),
    }
}

/// Uniqueness message, reported against `email` since the username is
/// derived from it.
pub(crate) fn duplicate_message(field: UniqueField) -> &'static str {
    match field {
        UniqueField::Email => "user with this email already exists.",
        UniqueField::Username => "A user with that username already exists.",
    }
}

/// Record a required/blank error for `field`, returning the value if present.
/// Blankness is judged on the trimmed value; the returned value is untouched.
pub(crate) fn required(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    match value {
        None => {
            errors.add(field, REQUIRED);
            None
        }
        Some(v) if v.trim().is_empty() => {
            errors.add(field, BLANK);
            None
        }
        Some(v) => Some(v),
    }
}

/// Signup data that passed validation. The confirmation field is gone.
#[derive(Debug)]
pub struct ValidatedSignup {
    pub first_name: String,
    pub email: String,
    pub password: String,
}

/// Field checks first, all collected; the password confirmation is compared
/// only once every field is individually valid.
pub async fn validate_signup(
    store: &dyn UserStore,
    req: RegisterRequest,
) -> Result<ValidatedSignup, ApiError> {
    let mut errors = FieldErrors::default();

    let first_name = required(&mut errors, "first_name", req.first_name).map(|n| n.trim().to_string());

    let email = match required(&mut errors, "email", req.email).map(|e| normalize_email(&e)) {
        Some(email) if !is_valid_email(&email) => {
            errors.add("email", INVALID_EMAIL);
            None
        }
        Some(email) => {
            if store.email_exists(&email).await? {
                errors.add("email", duplicate_message(UniqueField::Email));
                None
            } else if store.username_exists(&email).await? {
                errors.add("email", duplicate_message(UniqueField::Username));
                None
            } else {
                Some(email)
            }
        }
        None => None,
    };

    let password = required(&mut errors, "password", req.password);
    let confirm_password = required(&mut errors, "confirm_password", req.confirm_password);

    errors.into_result()?;

    // All present once the field checks passed.
    let (Some(first_name), Some(email), Some(password), Some(confirm_password)) =
        (first_name, email, password, confirm_password)
    else {
        return Err(ApiError::Internal(anyhow::anyhow!("validated signup field missing")));
    };

    if password != confirm_password {
        warn!(email = %email, "signup password confirmation mismatch");
        return Err(ApiError::Validation(FieldErrors::single(
            "confirm_password",
            PASSWORD_MISMATCH,
        )));
    }

    Ok(ValidatedSignup {
        first_name,
        email,
        password,
    })
}

/// Validate a `PATCH /me` body into store changes.
pub fn validate_update(req: UpdateMeRequest) -> Result<UserChanges, ApiError> {
    let mut errors = FieldErrors::default();

    let first_name = match req.first_name {
        Some(name) if name.trim().is_empty() => {
            errors.add("first_name", BLANK);
            None
        }
        other => other.map(|n| n.trim().to_string()),
    };

    errors.into_result()?;
    Ok(UserChanges {
        first_name,
        full_name: req.full_name.map(|n| n.trim().to_string()),
        bio: req.bio,
    })
}
