use anyhow::Context;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Hash a plaintext password into an Argon2id PHC string.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!("hash password: {e}")
        })
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!("parse stored hash: {e}")
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// [`hash_password`] on the blocking pool, off the async workers.
pub async fn hash_password_blocking(plain: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .context("join hash_password task")?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(plain: String, hash: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &hash))
        .await
        .context("join verify_password task")?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_never_plaintext() {
        let first = hash_password("plain-text-secret").expect("hash");
        let second = hash_password("plain-text-secret").expect("hash");
        assert_ne!(first, second);
        assert!(!first.contains("plain-text-secret"));
        assert!(first.starts_with("$argon2id$"));
    }

    #[test]
    fn verify_accepts_matching_password() {
        let hash = hash_password("correct horse").expect("hash");
        assert!(verify_password("correct horse", &hash).expect("verify"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("correct horse").expect("hash");
        assert!(!verify_password("Correct horse", &hash).expect("verify"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(err.to_string().contains("parse stored hash"));
    }

    #[tokio::test]
    async fn blocking_wrappers_hash_and_verify() {
        let hash = hash_password_blocking("correct horse".into())
            .await
            .expect("hash");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password_blocking("correct horse".into(), hash.clone())
            .await
            .expect("verify"));
        assert!(!verify_password_blocking("wrong".into(), hash)
            .await
            .expect("verify"));
    }

    #[tokio::test]
    async fn blocking_verify_propagates_malformed_hash() {
        let err = verify_password_blocking("anything".into(), "nope".into())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("parse stored hash"));
    }
}
