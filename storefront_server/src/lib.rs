//! # Storefront server
//! This crate hosts the HTTP surface of the storefront. It is responsible for:
//! * Authenticating requests via HMAC-signed bearer tokens and resolving them to local accounts.
//! * Enforcing the route access policy (public / authenticated / admin) ahead of every handler.
//! * Provisioning accounts from Google OAuth2 logins.
//! * The REST API for products, categories, orders, banners, news, reviews, image uploads and the shopping
//!   assistant.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! The data layer lives in the `storefront_engine` crate; handlers here are generic over its backend traits so
//! that the endpoint tests can run against mocks.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod oauth;
pub mod policy;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
