use thiserror::Error;

use crate::db_types::{ExternalUserInfo, NewUser, User, UserUpdate};

#[derive(Debug, Clone, Error)]
pub enum UserStoreError {
    #[error("Username already exists")]
    DuplicateUsername,
    #[error("Email already exists")]
    DuplicateEmail,
    #[error("User not found")]
    UserNotFound,
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for UserStoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref de) = e {
            // SQLITE_CONSTRAINT_UNIQUE
            if de.code().as_deref() == Some("2067") {
                let msg = de.message();
                if msg.contains("users.email") {
                    return UserStoreError::DuplicateEmail;
                }
                if msg.contains("users.username") {
                    return UserStoreError::DuplicateUsername;
                }
            }
        }
        UserStoreError::DatabaseError(e.to_string())
    }
}

/// The `UserStore` trait is the credential store contract. It backs the authentication middleware (subject
/// resolution), local login and registration, the admin user endpoints, and external-identity provisioning.
#[allow(async_fn_in_trait)]
pub trait UserStore {
    async fn fetch_user_by_username(&self, username: &str) -> Result<Option<User>, UserStoreError>;

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, UserStoreError>;

    async fn fetch_user_by_id(&self, id: i64) -> Result<Option<User>, UserStoreError>;

    async fn fetch_all_users(&self) -> Result<Vec<User>, UserStoreError>;

    /// Creates a local account. Fails with [`UserStoreError::DuplicateUsername`] if the username is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, UserStoreError>;

    async fn update_user(&self, id: i64, update: UserUpdate) -> Result<User, UserStoreError>;

    async fn delete_user(&self, id: i64) -> Result<(), UserStoreError>;

    /// Atomic get-or-create keyed on `email`, used by external-identity provisioning.
    ///
    /// The implementation must guarantee that two concurrent calls for the same new email produce exactly one
    /// record, and that a legacy record with an empty username is backfilled with the email. A lookup followed by
    /// a separate insert does not satisfy this contract.
    async fn upsert_external_user(&self, info: &ExternalUserInfo) -> Result<User, UserStoreError>;
}
