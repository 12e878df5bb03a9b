//! # Storefront engine public API
//!
//! The pattern for all the APIs is the same as the backend traits they wrap: an API instance is created by
//! supplying a database backend that implements the relevant trait, and the server stores one instance of each in
//! its application data.
//!
//! ```rust,ignore
//! use storefront_engine::{SqliteDatabase, UserApi};
//! let db = SqliteDatabase::new_with_url(url, 25).await?;
//! let users = UserApi::new(db);
//! let principal = users.user_by_username("alice").await?;
//! ```

pub mod catalog_api;
pub mod content_api;
pub mod order_api;
pub mod user_api;
