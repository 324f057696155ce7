use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{StoreError, UniqueField, UserStore};
use crate::users::repo_types::{NewUser, Profile, User, UserChanges, DEFAULT_PROFILE_IMAGE};

const USER_COLUMNS: &str =
    "id, email, username, first_name, password_hash, created_at, updated_at";
const PROFILE_COLUMNS: &str = "user_id, full_name, bio, image, verified";

/// PostgreSQL-backed user store.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Column guarded by a unique constraint, judged by its name
/// (`users_username_key`, `users_email_key`). Unnamed ones count as email.
fn unique_field_for_constraint(constraint: Option<&str>) -> UniqueField {
    match constraint {
        Some(c) if c.contains("username") => UniqueField::Username,
        _ => UniqueField::Email,
    }
}

fn classify_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Duplicate(unique_field_for_constraint(db_err.constraint()));
        }
    }
    StoreError::Other(anyhow::Error::new(err))
}

#[async_trait]
impl UserStore for PgStore {
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.db)
            .await
            .context("check email")?;
        Ok(exists)
    }

    async fn username_exists(&self, username: &str) -> anyhow::Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.db)
                .await
                .context("check username")?;
        Ok(exists)
    }

    async fn create_user_with_profile(&self, new: NewUser) -> Result<(User, Profile), StoreError> {
        let mut tx = self.db.begin().await.context("begin transaction")?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, username, first_name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.email)
        .bind(&new.username)
        .bind(&new.first_name)
        .bind(&new.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify_write_error)?;

        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles (user_id, full_name, image)
            VALUES ($1, $2, $3)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.first_name)
        .bind(DEFAULT_PROFILE_IMAGE)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify_write_error)?;

        tx.commit().await.context("commit user and profile")?;
        debug!(user_id = %user.id, "user and profile inserted");
        Ok((user, profile))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn profile_for(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("find profile")?;
        Ok(profile)
    }

    async fn save_user_and_profile(
        &self,
        user_id: Uuid,
        changes: UserChanges,
    ) -> Result<(User, Profile), StoreError> {
        let mut tx = self.db.begin().await.context("begin transaction")?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name), updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(changes.first_name)
        .fetch_optional(&mut *tx)
        .await
        .map_err(classify_write_error)?
        .ok_or(StoreError::NotFound)?;

        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            UPDATE profiles
            SET full_name = COALESCE($2, full_name), bio = COALESCE($3, bio)
            WHERE user_id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(changes.full_name)
        .bind(changes.bio)
        .fetch_optional(&mut *tx)
        .await
        .map_err(classify_write_error)?
        .ok_or(StoreError::NotFound)?;

        tx.commit().await.context("commit user and profile")?;
        debug!(user_id = %user.id, "user and profile saved");
        Ok((user, profile))
    }
}
