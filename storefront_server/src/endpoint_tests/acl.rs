//! Integration tests for the authentication + ACL middleware pair.
//!
//! The app under test carries the production policy table, the token middleware and a mock user store, plus a
//! whoami handler reporting which identity (if any) reached it.

use actix_web::{
    body::MessageBody,
    http::{Method, StatusCode},
    test,
    test::TestRequest,
    web,
    App,
    HttpMessage,
    HttpRequest,
    HttpResponse,
};
use serde_json::json;
use storefront_engine::{db_types::Role, traits::UserStoreError, UserApi};

use super::{helpers::{test_issuer, test_user}, mocks::MockUserBackend};
use crate::{
    auth::AuthenticatedUser,
    middleware::{AclMiddlewareFactory, AuthenticationMiddlewareFactory},
    policy::AccessPolicy,
};

/// Answers with the username the middleware attached, or `null` for an anonymous request.
async fn whoami(req: HttpRequest) -> HttpResponse {
    let identity = req.extensions().get::<AuthenticatedUser>().map(|u| u.username.clone());
    HttpResponse::Ok().json(json!({ "identity": identity }))
}

async fn call(
    store: MockUserBackend,
    req: actix_http::Request,
) -> (StatusCode, String) {
    let app = App::new()
        .wrap(AclMiddlewareFactory::new(AccessPolicy::storefront_defaults()))
        .wrap(AuthenticationMiddlewareFactory::<MockUserBackend>::new())
        .app_data(web::Data::new(test_issuer()))
        .app_data(web::Data::new(UserApi::new(store)))
        .service(web::resource("/api/products").route(web::get().to(whoami)))
        .service(web::resource("/api/orders/mine").route(web::get().to(whoami)))
        .service(
            web::resource("/api/admin/users")
                .route(web::get().to(whoami))
                .route(web::method(Method::OPTIONS).to(whoami)),
        );
    let app = test::init_service(app).await;
    // Middleware rejections leave the service as `Err`; render them the way `HttpServer` does in production.
    match test::try_call_service(&app, req).await {
        Ok(res) => {
            let status = res.status();
            let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
            (status, body)
        },
        Err(err) => {
            let res = HttpResponse::from_error(err);
            let status = res.status();
            let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
            (status, body)
        },
    }
}

fn store_with(user: storefront_engine::db_types::User) -> MockUserBackend {
    let mut store = MockUserBackend::new();
    store.expect_fetch_user_by_username().returning(move |_| Ok(Some(user.clone())));
    store
}

#[actix_web::test]
async fn public_route_without_a_token_passes_through_anonymously() {
    let mut store = MockUserBackend::new();
    store.expect_fetch_user_by_username().never();
    let req = TestRequest::get().uri("/api/products").to_request();
    let (status, body) = call(store, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"identity":null}"#);
}

#[actix_web::test]
async fn guarded_route_without_a_token_is_unauthorized() {
    let req = TestRequest::get().uri("/api/admin/users").to_request();
    let (status, body) = call(MockUserBackend::new(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Unauthorized"}"#);
}

#[actix_web::test]
async fn a_valid_token_reaches_the_handler_with_its_identity() {
    let token = test_issuer().issue("alice");
    let req = TestRequest::get()
        .uri("/api/orders/mine")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let (status, body) = call(store_with(test_user(1, "alice", Role::User)), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"identity":"alice"}"#);
}

#[actix_web::test]
async fn a_user_token_on_an_admin_route_is_forbidden() {
    let token = test_issuer().issue("alice");
    let req = TestRequest::get()
        .uri("/api/admin/users")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let (status, body) = call(store_with(test_user(1, "alice", Role::User)), req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("ADMIN role required"), "was: {body}");
}

#[actix_web::test]
async fn an_admin_token_passes_the_admin_route() {
    let token = test_issuer().issue("root");
    let req = TestRequest::get()
        .uri("/api/admin/users")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let (status, body) = call(store_with(test_user(7, "root", Role::Admin)), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"identity":"root"}"#);
}

#[actix_web::test]
async fn a_garbage_token_on_a_public_route_is_ignored() {
    let mut store = MockUserBackend::new();
    store.expect_fetch_user_by_username().never();
    let req = TestRequest::get()
        .uri("/api/products")
        .insert_header(("Authorization", "Bearer utter.garbage.token"))
        .to_request();
    let (status, body) = call(store, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"identity":null}"#);
}

#[actix_web::test]
async fn an_expired_token_on_a_guarded_route_is_unauthorized() {
    let issuer = test_issuer();
    let now = chrono::Utc::now().timestamp();
    let stale = issuer.sign(&crate::auth::TokenClaims {
        sub: "alice".to_string(),
        iat: now - 100_000,
        exp: now - 10,
    });
    let req = TestRequest::get()
        .uri("/api/orders/mine")
        .insert_header(("Authorization", format!("Bearer {stale}")))
        .to_request();
    let (status, body) = call(store_with(test_user(1, "alice", Role::User)), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Unauthorized"}"#);
}

#[actix_web::test]
async fn a_valid_token_for_an_unknown_account_stays_anonymous() {
    let token = test_issuer().issue("ghost");
    let mut store = MockUserBackend::new();
    store.expect_fetch_user_by_username().returning(|_| Ok(None));
    let req = TestRequest::get()
        .uri("/api/orders/mine")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let (status, body) = call(store, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Unauthorized"}"#);
}

#[actix_web::test]
async fn a_store_outage_fails_closed() {
    let token = test_issuer().issue("alice");
    let mut store = MockUserBackend::new();
    store
        .expect_fetch_user_by_username()
        .returning(|_| Err(UserStoreError::DatabaseError("connection refused".to_string())));
    let req = TestRequest::get()
        .uri("/api/orders/mine")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let (status, _) = call(store, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn running_the_token_middleware_twice_resolves_the_identity_once() {
    let user = test_user(1, "alice", Role::User);
    let mut store = MockUserBackend::new();
    store.expect_fetch_user_by_username().times(1).returning(move |_| Ok(Some(user.clone())));
    let token = test_issuer().issue("alice");
    let app = App::new()
        .wrap(AclMiddlewareFactory::new(AccessPolicy::storefront_defaults()))
        // Doubled on purpose. The second pass must see the identity already attached and skip the store lookup.
        .wrap(AuthenticationMiddlewareFactory::<MockUserBackend>::new())
        .wrap(AuthenticationMiddlewareFactory::<MockUserBackend>::new())
        .app_data(web::Data::new(test_issuer()))
        .app_data(web::Data::new(UserApi::new(store)))
        .service(web::resource("/api/orders/mine").route(web::get().to(whoami)));
    let app = test::init_service(app).await;
    let req = TestRequest::get()
        .uri("/api/orders/mine")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    assert_eq!(body, r#"{"identity":"alice"}"#);
}

#[actix_web::test]
async fn preflight_requests_bypass_authentication_entirely() {
    let mut store = MockUserBackend::new();
    store.expect_fetch_user_by_username().never();
    let req = TestRequest::default()
        .method(Method::OPTIONS)
        .uri("/api/admin/users")
        .insert_header(("Authorization", "Bearer not.even.valid"))
        .to_request();
    let (status, _) = call(store, req).await;
    assert_eq!(status, StatusCode::OK);
}
