use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{StoreError, UniqueField, UserStore};
use crate::users::repo_types::{NewUser, Profile, User, UserChanges};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    profiles: HashMap<Uuid, Profile>,
}

/// Process-local store for development runs and tests.
///
/// One lock covers both tables, so a user and its profile are always
/// inserted and saved together.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[cfg(test)]
    pub async fn user_count(&self) -> usize {
        self.tables.lock().await.users.len()
    }

    #[cfg(test)]
    pub async fn profile_count(&self) -> usize {
        self.tables.lock().await.profiles.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().any(|u| u.email == email))
    }

    async fn username_exists(&self, username: &str) -> anyhow::Result<bool> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().any(|u| u.username == username))
    }

    async fn create_user_with_profile(&self, new: NewUser) -> Result<(User, Profile), StoreError> {
        let mut tables = self.tables.lock().await;

        if tables.users.values().any(|u| u.email == new.email) {
            return Err(StoreError::Duplicate(UniqueField::Email));
        }
        if tables.users.values().any(|u| u.username == new.username) {
            return Err(StoreError::Duplicate(UniqueField::Username));
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            username: new.username,
            first_name: new.first_name,
            password_hash: new.password_hash,
            created_at: now,
            updated_at: now,
        };
        let profile = Profile::initial_for(&user);

        tables.users.insert(user.id, user.clone());
        tables.profiles.insert(user.id, profile.clone());
        Ok((user, profile))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn profile_for(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        Ok(self.tables.lock().await.profiles.get(&user_id).cloned())
    }

    async fn save_user_and_profile(
        &self,
        user_id: Uuid,
        changes: UserChanges,
    ) -> Result<(User, Profile), StoreError> {
        let mut guard = self.tables.lock().await;
        let tables = &mut *guard;

        let (Some(user), Some(profile)) = (
            tables.users.get_mut(&user_id),
            tables.profiles.get_mut(&user_id),
        ) else {
            return Err(StoreError::NotFound);
        };

        if let Some(first_name) = changes.first_name {
            user.first_name = first_name;
        }
        if let Some(full_name) = changes.full_name {
            profile.full_name = full_name;
        }
        if let Some(bio) = changes.bio {
            profile.bio = Some(bio);
        }
        user.updated_at = OffsetDateTime::now_utc();

        Ok((user.clone(), profile.clone()))
    }
}
