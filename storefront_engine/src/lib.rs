//! Storefront Engine
//!
//! The storefront engine is the data layer for the storefront server. This library contains the row types, the
//! backend trait contracts, and the SQLite implementation of those contracts. It is HTTP-framework agnostic.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). You should rarely need to access the database functions
//!    directly. Instead, use the public API wrappers. The exception is the data types used in the database; these
//!    are defined in the [`db_types`] module and are public.
//! 2. The engine public API ([`mod@api`]). The API is modular: clients pick the functionality they need by
//!    supplying a backend that implements the relevant trait from [`mod@traits`]. The server's endpoint tests use
//!    this to substitute `mockall` backends for the real database.

pub mod db_types;
pub mod traits;

mod api;
#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::{db, SqliteDatabase};

pub use api::{catalog_api::CatalogApi, content_api::ContentApi, order_api::OrderApi, user_api::UserApi};
