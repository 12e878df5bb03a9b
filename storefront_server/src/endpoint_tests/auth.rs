use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App, HttpResponse};
use serde_json::{json, Value};
use storefront_engine::{
    db_types::{Provider, Role},
    traits::UserStoreError,
    UserApi,
};

use super::{helpers::{test_issuer, test_user}, mocks::MockUserBackend};
use crate::{
    middleware::{AclMiddlewareFactory, AuthenticationMiddlewareFactory},
    policy::AccessPolicy,
    routes::{LoginRoute, MyProfileRoute, RegisterRoute},
};

async fn call(store: MockUserBackend, req: actix_http::Request) -> (StatusCode, String) {
    let app = App::new()
        .wrap(AclMiddlewareFactory::new(AccessPolicy::storefront_defaults()))
        .wrap(AuthenticationMiddlewareFactory::<MockUserBackend>::new())
        .app_data(web::Data::new(test_issuer()))
        .app_data(web::Data::new(UserApi::new(store)))
        .service(LoginRoute::<MockUserBackend>::new())
        .service(RegisterRoute::<MockUserBackend>::new())
        .service(MyProfileRoute::<MockUserBackend>::new());
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

fn login_request(username: &str, password: &str) -> actix_http::Request {
    TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request()
}

#[actix_web::test]
async fn a_successful_login_returns_the_profile_and_a_valid_token() {
    let mut store = MockUserBackend::new();
    let alice = test_user(1, "alice", Role::User);
    store.expect_fetch_user_by_username().returning(move |_| Ok(Some(alice.clone())));
    let (status, body) = call(store, login_request("alice", "hunter2")).await;
    assert_eq!(status, StatusCode::OK);
    let body = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["id"], 1);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["role"], "USER");
    let claims = test_issuer().validate(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.sub, "alice");
}

#[actix_web::test]
async fn a_wrong_password_is_invalid_credentials() {
    let mut store = MockUserBackend::new();
    let alice = test_user(1, "alice", Role::User);
    store.expect_fetch_user_by_username().returning(move |_| Ok(Some(alice.clone())));
    let (status, body) = call(store, login_request("alice", "password123")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"message":"Invalid credentials"}"#);
}

#[actix_web::test]
async fn an_unknown_username_gets_the_same_response_as_a_wrong_password() {
    let mut store = MockUserBackend::new();
    store.expect_fetch_user_by_username().returning(|_| Ok(None));
    let (status, body) = call(store, login_request("nobody", "hunter2")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"message":"Invalid credentials"}"#);
}

#[actix_web::test]
async fn an_external_account_cannot_log_in_with_the_sentinel_password() {
    let mut store = MockUserBackend::new();
    let mut bob = test_user(2, "bob@example.com", Role::User);
    bob.provider = Provider::Google;
    bob.password = "OAUTH2_USER".to_string();
    store.expect_fetch_user_by_username().returning(move |_| Ok(Some(bob.clone())));
    let (status, body) = call(store, login_request("bob@example.com", "OAUTH2_USER")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"message":"Invalid credentials"}"#);
}

#[actix_web::test]
async fn registration_answers_with_a_confirmation_message() {
    let mut store = MockUserBackend::new();
    store.expect_create_user().returning(|u| {
        let mut user = test_user(10, &u.username, Role::User);
        user.password = u.password;
        Ok(user)
    });
    let req = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "username": "carol", "password": "s3cret" }))
        .to_request();
    let (status, body) = call(store, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"message":"User registered successfully"}"#);
}

#[actix_web::test]
async fn registering_a_taken_username_is_a_client_error() {
    let mut store = MockUserBackend::new();
    store.expect_create_user().returning(|_| Err(UserStoreError::DuplicateUsername));
    let req = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "username": "alice", "password": "s3cret" }))
        .to_request();
    let (status, body) = call(store, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"message":"Username already exists"}"#);
}

#[actix_web::test]
async fn the_profile_endpoint_returns_the_caller_without_the_password() {
    let mut store = MockUserBackend::new();
    let alice = test_user(1, "alice", Role::User);
    let by_id = alice.clone();
    store.expect_fetch_user_by_username().returning(move |_| Ok(Some(alice.clone())));
    store.expect_fetch_user_by_id().returning(move |_| Ok(Some(by_id.clone())));
    let token = test_issuer().issue("alice");
    let req = TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let (status, body) = call(store, req).await;
    assert_eq!(status, StatusCode::OK);
    let profile = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(profile["username"], "alice");
    assert_eq!(profile["email"], "alice@example.com");
    assert!(profile.get("password").is_none(), "was: {body}");
}

#[actix_web::test]
async fn the_profile_endpoint_requires_a_token() {
    let req = TestRequest::get().uri("/api/auth/me").to_request();
    let (status, body) = call(MockUserBackend::new(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Unauthorized"}"#);
}
