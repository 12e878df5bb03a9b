use chrono::Utc;
use sfs_common::Secret;
use storefront_engine::db_types::{Provider, Role, User};

use crate::auth::TokenIssuer;

// A fixed secret so that tokens minted in one part of a test validate in another. DO NOT re-use anywhere.
pub fn test_issuer() -> TokenIssuer {
    TokenIssuer::new(Secret::new("unit-test-signing-secret-0123456789abcdef".to_string()))
}

pub fn test_user(id: i64, username: &str, role: Role) -> User {
    User {
        id,
        username: username.to_string(),
        email: Some(format!("{username}@example.com")),
        password: "hunter2".to_string(),
        role,
        provider: Provider::Local,
        name: None,
        avatar: None,
        created_at: Utc::now(),
    }
}
