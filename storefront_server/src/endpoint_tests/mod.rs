mod acl;
mod auth;
mod helpers;
mod mocks;
mod oauth;
