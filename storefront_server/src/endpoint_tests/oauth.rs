use actix_web::{body::MessageBody, http::{header, StatusCode}, test, test::TestRequest, web, App};
use storefront_engine::{
    db_types::{Provider, Role},
    UserApi,
};

use super::{helpers::{test_issuer, test_user}, mocks::{MockGoogleProvider, MockUserBackend}};
use crate::{config::ServerOptions, oauth::OauthProviderError, routes::GoogleCallbackRoute};

async fn call(store: MockUserBackend, provider: MockGoogleProvider, uri: &str) -> (StatusCode, Option<String>, String) {
    let options = ServerOptions { frontend_url: "http://localhost:5173".to_string(), upload_dir: "uploads".into() };
    let app = App::new()
        .app_data(web::Data::new(test_issuer()))
        .app_data(web::Data::new(UserApi::new(store)))
        .app_data(web::Data::new(provider))
        .app_data(web::Data::new(options))
        .service(GoogleCallbackRoute::<MockUserBackend, MockGoogleProvider>::new());
    let app = test::init_service(app).await;
    let res = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
    let status = res.status();
    let location = res.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()).map(String::from);
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, location, body)
}

#[actix_web::test]
async fn a_successful_callback_provisions_and_redirects_with_a_token() {
    let mut provider = MockGoogleProvider::new();
    provider.expect_fetch_profile().returning(|_| {
        Ok(storefront_engine::db_types::ExternalUserInfo {
            email: "dana@example.com".to_string(),
            name: Some("Dana".to_string()),
            provider: Provider::Google,
        })
    });
    let mut store = MockUserBackend::new();
    store.expect_upsert_external_user().returning(|info| {
        assert_eq!(info.email, "dana@example.com");
        assert_eq!(info.provider, Provider::Google);
        let mut user = test_user(42, &info.email, Role::User);
        user.provider = Provider::Google;
        Ok(user)
    });
    let (status, location, _) = call(store, provider, "/oauth2/callback/google?code=good-code").await;
    assert_eq!(status, StatusCode::FOUND);
    let location = location.expect("redirect must carry a Location header");
    assert!(location.starts_with("http://localhost:5173/login-success?token="), "was: {location}");
    let token = location.rsplit_once("token=").unwrap().1;
    let claims = test_issuer().validate(token).unwrap();
    assert_eq!(claims.sub, "dana@example.com");
}

#[actix_web::test]
async fn a_failed_code_exchange_does_not_touch_the_store() {
    let mut provider = MockGoogleProvider::new();
    provider
        .expect_fetch_profile()
        .returning(|_| Err(OauthProviderError::CodeExchangeFailed("invalid_grant".to_string())));
    let mut store = MockUserBackend::new();
    store.expect_upsert_external_user().never();
    let (status, location, body) = call(store, provider, "/oauth2/callback/google?code=bad-code").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(location.is_none());
    assert!(body.contains("Could not complete the sign-in"), "was: {body}");
}

#[actix_web::test]
async fn a_callback_without_a_code_is_a_client_error() {
    let mut provider = MockGoogleProvider::new();
    provider.expect_fetch_profile().never();
    let (status, _, _) = call(MockUserBackend::new(), provider, "/oauth2/callback/google").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
