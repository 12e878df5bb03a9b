use std::time::Duration;

use actix_cors::Cors;
use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use storefront_engine::{CatalogApi, ContentApi, OrderApi, SqliteDatabase, UserApi};

use crate::{
    auth::TokenIssuer,
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    integrations::gemini::GeminiClient,
    middleware::{AclMiddlewareFactory, AuthenticationMiddlewareFactory},
    oauth::GoogleOauthProvider,
    policy::AccessPolicy,
    routes::{
        chat,
        health,
        serve_upload,
        upload,
        ActiveBannersRoute,
        AllOrdersRoute,
        AllUsersRoute,
        BannersRoute,
        CategoriesRoute,
        CategoryRoute,
        CreateBannerRoute,
        CreateCategoryRoute,
        CreateNewsRoute,
        CreateProductRoute,
        CreateReviewRoute,
        DeleteBannerRoute,
        DeleteCategoryRoute,
        DeleteNewsRoute,
        DeleteOrderRoute,
        DeleteProductRoute,
        DeleteUserRoute,
        GoogleCallbackRoute,
        LoginRoute,
        MyOrdersRoute,
        MyProfileRoute,
        NewsItemRoute,
        NewsRoute,
        PlaceOrderRoute,
        ProductReviewsRoute,
        ProductRoute,
        ProductsRoute,
        RegisterRoute,
        SearchProductsRoute,
        UpdateBannerRoute,
        UpdateCategoryRoute,
        UpdateNewsRoute,
        UpdateOrderStatusRoute,
        UpdateProductRoute,
        UpdateUserRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let bind_address = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let user_api = UserApi::new(db.clone());
        let catalog_api = CatalogApi::new(db.clone());
        let order_api = OrderApi::new(db.clone());
        let content_api = ContentApi::new(db.clone());
        let jwt_signer = TokenIssuer::new(config.auth.jwt_secret.clone());
        let google = GoogleOauthProvider::new(&config.google);
        let gemini = GeminiClient::new(&config.gemini);
        let options = ServerOptions::from_config(&config);
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);
        for origin in &config.cors_origins {
            cors = cors.allowed_origin(origin);
        }
        // Middleware runs in the reverse order of the `wrap` calls below: logger, then CORS (so preflights never
        // reach the guards), then authentication (which attaches the identity), then the ACL (which reads it).
        App::new()
            .wrap(AclMiddlewareFactory::new(AccessPolicy::storefront_defaults()))
            .wrap(AuthenticationMiddlewareFactory::<SqliteDatabase>::new())
            .wrap(cors)
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sfs::access_log"))
            .app_data(web::Data::new(user_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(order_api))
            .app_data(web::Data::new(content_api))
            .app_data(web::Data::new(jwt_signer))
            .app_data(web::Data::new(google))
            .app_data(web::Data::new(gemini))
            .app_data(web::Data::new(options))
            .service(health)
            .service(LoginRoute::<SqliteDatabase>::new())
            .service(RegisterRoute::<SqliteDatabase>::new())
            .service(MyProfileRoute::<SqliteDatabase>::new())
            .service(GoogleCallbackRoute::<SqliteDatabase, GoogleOauthProvider>::new())
            .service(AllUsersRoute::<SqliteDatabase>::new())
            .service(UpdateUserRoute::<SqliteDatabase>::new())
            .service(DeleteUserRoute::<SqliteDatabase>::new())
            // `/api/products/search` must come before `/api/products/{id}`.
            .service(SearchProductsRoute::<SqliteDatabase>::new())
            .service(ProductsRoute::<SqliteDatabase>::new())
            .service(ProductRoute::<SqliteDatabase>::new())
            .service(CreateProductRoute::<SqliteDatabase>::new())
            .service(UpdateProductRoute::<SqliteDatabase>::new())
            .service(DeleteProductRoute::<SqliteDatabase>::new())
            .service(CategoriesRoute::<SqliteDatabase>::new())
            .service(CategoryRoute::<SqliteDatabase>::new())
            .service(CreateCategoryRoute::<SqliteDatabase>::new())
            .service(UpdateCategoryRoute::<SqliteDatabase>::new())
            .service(DeleteCategoryRoute::<SqliteDatabase>::new())
            // `/api/orders/mine` and `/api/orders/all` likewise precede `/api/orders/{id}`.
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(AllOrdersRoute::<SqliteDatabase>::new())
            .service(PlaceOrderRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(DeleteOrderRoute::<SqliteDatabase>::new())
            .service(ActiveBannersRoute::<SqliteDatabase>::new())
            .service(BannersRoute::<SqliteDatabase>::new())
            .service(CreateBannerRoute::<SqliteDatabase>::new())
            .service(UpdateBannerRoute::<SqliteDatabase>::new())
            .service(DeleteBannerRoute::<SqliteDatabase>::new())
            .service(NewsRoute::<SqliteDatabase>::new())
            .service(NewsItemRoute::<SqliteDatabase>::new())
            .service(CreateNewsRoute::<SqliteDatabase>::new())
            .service(UpdateNewsRoute::<SqliteDatabase>::new())
            .service(DeleteNewsRoute::<SqliteDatabase>::new())
            .service(ProductReviewsRoute::<SqliteDatabase>::new())
            .service(CreateReviewRoute::<SqliteDatabase>::new())
            .service(upload)
            .service(serve_upload)
            .service(chat)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind(bind_address)?
    .run();
    Ok(srv)
}
