//! # Backend trait contracts
//!
//! This module defines the interface contracts that storefront database *backends* must implement.
//!
//! * [`UserStore`] is the credential store: lookup of principals by username, email or id, account creation, and
//!   the atomic external-identity upsert needed by OAuth2 provisioning.
//! * [`CatalogManagement`] covers products and categories.
//! * [`OrderManagement`] covers order placement and the order status workflow.
//! * [`ContentManagement`] covers banners, news and product reviews.
//!
//! The server crate programs against these traits only; handlers are generic over the backend so that endpoint
//! tests can substitute mocks.

mod catalog_management;
mod content_management;
mod order_management;
mod user_store;

pub use catalog_management::{CatalogApiError, CatalogManagement};
pub use content_management::{ContentApiError, ContentManagement};
pub use order_management::{OrderApiError, OrderManagement};
pub use user_store::{UserStore, UserStoreError};
