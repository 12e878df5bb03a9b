//! Request middleware.
//!
//! Authentication and authorization are two separate layers. [`authn::AuthenticationMiddlewareFactory`] resolves a
//! bearer token into an [`crate::auth::AuthenticatedUser`] on the request, and never rejects anything.
//! [`acl::AclMiddlewareFactory`] enforces the route policy table against whatever identity (if any) the first
//! layer attached.

pub mod acl;
pub mod authn;

pub use acl::AclMiddlewareFactory;
pub use authn::AuthenticationMiddlewareFactory;
