use mockall::mock;
use storefront_engine::{
    db_types::{ExternalUserInfo, NewUser, User, UserUpdate},
    traits::{UserStore, UserStoreError},
};

use crate::oauth::{IdentityProvider, OauthProviderError};

mock! {
    pub UserBackend {}
    impl UserStore for UserBackend {
        async fn fetch_user_by_username(&self, username: &str) -> Result<Option<User>, UserStoreError>;
        async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, UserStoreError>;
        async fn fetch_user_by_id(&self, id: i64) -> Result<Option<User>, UserStoreError>;
        async fn fetch_all_users(&self) -> Result<Vec<User>, UserStoreError>;
        async fn create_user(&self, user: NewUser) -> Result<User, UserStoreError>;
        async fn update_user(&self, id: i64, update: UserUpdate) -> Result<User, UserStoreError>;
        async fn delete_user(&self, id: i64) -> Result<(), UserStoreError>;
        async fn upsert_external_user(&self, info: &ExternalUserInfo) -> Result<User, UserStoreError>;
    }
}

mock! {
    pub GoogleProvider {}
    impl IdentityProvider for GoogleProvider {
        async fn fetch_profile(&self, code: &str) -> Result<ExternalUserInfo, OauthProviderError>;
    }
}
