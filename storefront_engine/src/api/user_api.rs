//! Unified API for the credential store.

use std::fmt::Debug;

use log::debug;

use crate::{
    db_types::{ExternalUserInfo, NewUser, User, UserDto, UserUpdate},
    traits::{UserStore, UserStoreError},
};

/// The `UserApi` wraps a [`UserStore`] backend and is the only path the server uses to read or mutate principal
/// records.
pub struct UserApi<B> {
    db: B,
}

impl<B: Debug> Debug for UserApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserApi ({:?})", self.db)
    }
}

impl<B> UserApi<B>
where B: UserStore
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn user_by_username(&self, username: &str) -> Result<Option<User>, UserStoreError> {
        self.db.fetch_user_by_username(username).await
    }

    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>, UserStoreError> {
        self.db.fetch_user_by_email(email).await
    }

    pub async fn user_by_id(&self, id: i64) -> Result<Option<User>, UserStoreError> {
        self.db.fetch_user_by_id(id).await
    }

    /// All users as DTOs (passwords never leave the store through this path).
    pub async fn all_users(&self) -> Result<Vec<UserDto>, UserStoreError> {
        let users = self.db.fetch_all_users().await?;
        Ok(users.into_iter().map(UserDto::from).collect())
    }

    pub async fn register(&self, user: NewUser) -> Result<User, UserStoreError> {
        let user = self.db.create_user(user).await?;
        debug!("📇️ New user registered: {} (#{})", user.username, user.id);
        Ok(user)
    }

    pub async fn update_user(&self, id: i64, update: UserUpdate) -> Result<User, UserStoreError> {
        self.db.update_user(id, update).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), UserStoreError> {
        self.db.delete_user(id).await
    }

    /// Provisioning entry point for external logins. See [`UserStore::upsert_external_user`] for the atomicity
    /// contract.
    pub async fn provision_external_user(&self, info: &ExternalUserInfo) -> Result<User, UserStoreError> {
        let user = self.db.upsert_external_user(info).await?;
        debug!("📇️ External login provisioned to user {} (#{})", user.username, user.id);
        Ok(user)
    }
}
