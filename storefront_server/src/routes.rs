//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Access control is *not* done in the handlers. The ACL middleware checks every request against the policy table
//! in [`crate::policy`] before it gets here; a handler that needs to know *who* is calling takes an
//! [`AuthenticatedUser`] parameter, and relies on the policy to guarantee one is present.

use actix_web::{get, http::header, post, web, HttpResponse, Responder};
use chrono::Utc;
use log::*;
use serde_json::json;
use storefront_engine::{
    db_types::{
        NewBanner,
        NewCategory,
        NewNews,
        NewOrderRequest,
        NewProduct,
        NewReview,
        NewUser,
        ProductQueryFilter,
        Provider,
        UserUpdate,
    },
    traits::{CatalogManagement, ContentManagement, OrderManagement, UserStore},
    CatalogApi,
    ContentApi,
    OrderApi,
    UserApi,
};

use crate::{
    auth::{AuthenticatedUser, TokenIssuer},
    config::ServerOptions,
    data_objects::{ChatRequest, JsonResponse, LoginRequest, OauthCallbackParams, StatusUpdateParams, UploadParams},
    errors::ServerError,
    integrations::gemini::GeminiClient,
    oauth::IdentityProvider,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Auth  ----------------------------------------------------
route!(login => Post "/api/auth/login" impl UserStore);
/// Route handler for local-account logins.
///
/// A successful login answers with the account's public profile fields and a fresh bearer token. Every failure
/// path, whether the username is unknown, the password does not match, or the account belongs to an external
/// identity provider, produces the *same* 401 response so the endpoint cannot be used to probe which usernames
/// exist.
pub async fn login<B: UserStore>(
    body: web::Json<LoginRequest>,
    api: web::Data<UserApi<B>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    let LoginRequest { username, password } = body.into_inner();
    let user = api
        .user_by_username(&username)
        .await?
        .filter(|u| u.provider == Provider::Local)
        .filter(|u| u.password == password)
        .ok_or(ServerError::InvalidCredentials)?;
    let token = signer.issue(&user.username);
    debug!("💻️ {} logged in", user.username);
    Ok(HttpResponse::Ok().json(json!({
        "message": "Login successful",
        "id": user.id,
        "username": user.username,
        "role": user.role,
        "token": token,
    })))
}

route!(register => Post "/api/auth/register" impl UserStore);
pub async fn register<B: UserStore>(
    body: web::Json<NewUser>,
    api: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user = api.register(body.into_inner()).await?;
    debug!("💻️ New account registered for {}", user.username);
    Ok(HttpResponse::Ok().json(JsonResponse::new("User registered successfully")))
}

route!(my_profile => Get "/api/auth/me" impl UserStore);
/// Returns the profile of the authenticated caller. The password column never serializes.
pub async fn my_profile<B: UserStore>(
    user: AuthenticatedUser,
    api: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let profile = api
        .user_by_id(user.id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No profile for user #{}", user.id)))?;
    Ok(HttpResponse::Ok().json(profile))
}

//----------------------------------------------   OAuth2  ----------------------------------------------------
route!(google_callback => Get "/oauth2/callback/google" impl UserStore, IdentityProvider);
/// Route handler for the Google OAuth2 callback.
///
/// Exchanges the authorization code for a verified profile, provisions (or finds) the matching local account in a
/// single atomic upsert, and bounces the browser back to the frontend with a freshly issued bearer token in the
/// `token` query parameter.
pub async fn google_callback<B: UserStore, P: IdentityProvider>(
    params: web::Query<OauthCallbackParams>,
    provider: web::Data<P>,
    api: web::Data<UserApi<B>>,
    signer: web::Data<TokenIssuer>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError> {
    let profile = provider
        .fetch_profile(&params.code)
        .await
        .map_err(|e| ServerError::OauthExchangeFailed(e.to_string()))?;
    let user = api.provision_external_user(&profile).await?;
    let token = signer.issue(&user.username);
    let destination = format!("{}/login-success?token={token}", options.frontend_url);
    debug!("💻️ OAuth2 login for {} completed. Redirecting to the frontend.", user.username);
    Ok(HttpResponse::Found().insert_header((header::LOCATION, destination)).finish())
}

//----------------------------------------------   Admin: users  ----------------------------------------------------
route!(all_users => Get "/api/admin/users" impl UserStore);
pub async fn all_users<B: UserStore>(api: web::Data<UserApi<B>>) -> Result<HttpResponse, ServerError> {
    let users = api.all_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

route!(update_user => Put "/api/admin/users/{id}" impl UserStore);
pub async fn update_user<B: UserStore>(
    path: web::Path<i64>,
    body: web::Json<UserUpdate>,
    api: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let user = api.update_user(id, body.into_inner()).await?;
    debug!("💻️ User #{id} updated");
    Ok(HttpResponse::Ok().json(user))
}

route!(delete_user => Delete "/api/admin/users/{id}" impl UserStore);
pub async fn delete_user<B: UserStore>(
    path: web::Path<i64>,
    api: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    api.delete_user(id).await?;
    debug!("💻️ User #{id} deleted");
    Ok(HttpResponse::Ok().json(JsonResponse::new("User deleted")))
}

//----------------------------------------------   Products  ----------------------------------------------------
route!(products => Get "/api/products" impl CatalogManagement);
pub async fn products<B: CatalogManagement>(api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError> {
    let products = api.products().await?;
    Ok(HttpResponse::Ok().json(products))
}

// NB: must be registered before the `/api/products/{id}` resource, or "search" gets captured as an id.
route!(search_products => Get "/api/products/search" impl CatalogManagement);
pub async fn search_products<B: CatalogManagement>(
    filter: web::Query<ProductQueryFilter>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let products = api.search_products(filter.into_inner()).await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(product => Get "/api/products/{id}" impl CatalogManagement);
pub async fn product<B: CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let detail =
        api.product(id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("No product with id {id}")))?;
    Ok(HttpResponse::Ok().json(detail))
}

route!(create_product => Post "/api/products" impl CatalogManagement);
pub async fn create_product<B: CatalogManagement>(
    body: web::Json<NewProduct>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let detail = api.create_product(body.into_inner()).await?;
    debug!("💻️ Product #{} created", detail.product.id);
    Ok(HttpResponse::Ok().json(detail))
}

route!(update_product => Put "/api/products/{id}" impl CatalogManagement);
pub async fn update_product<B: CatalogManagement>(
    path: web::Path<i64>,
    body: web::Json<NewProduct>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let detail = api.update_product(path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

route!(delete_product => Delete "/api/products/{id}" impl CatalogManagement);
pub async fn delete_product<B: CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    api.delete_product(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::new("Product deleted")))
}

//----------------------------------------------   Categories  ----------------------------------------------------
route!(categories => Get "/api/categories" impl CatalogManagement);
pub async fn categories<B: CatalogManagement>(api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError> {
    let categories = api.categories().await?;
    Ok(HttpResponse::Ok().json(categories))
}

route!(category => Get "/api/categories/{id}" impl CatalogManagement);
pub async fn category<B: CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let detail =
        api.category(id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("No category with id {id}")))?;
    Ok(HttpResponse::Ok().json(detail))
}

route!(create_category => Post "/api/categories" impl CatalogManagement);
pub async fn create_category<B: CatalogManagement>(
    body: web::Json<NewCategory>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let category = api.create_category(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(category))
}

route!(update_category => Put "/api/categories/{id}" impl CatalogManagement);
pub async fn update_category<B: CatalogManagement>(
    path: web::Path<i64>,
    body: web::Json<NewCategory>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let category = api.update_category(path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(category))
}

route!(delete_category => Delete "/api/categories/{id}" impl CatalogManagement);
pub async fn delete_category<B: CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    api.delete_category(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::new("Category deleted")))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(place_order => Post "/api/orders" impl OrderManagement);
/// Places an order for the authenticated caller. Unit prices and the order total are read from the product table
/// inside the same transaction; nothing price-shaped in the request body is trusted.
pub async fn place_order<B: OrderManagement>(
    user: AuthenticatedUser,
    body: web::Json<NewOrderRequest>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let detail = api.place_order(user.id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

route!(my_orders => Get "/api/orders/mine" impl OrderManagement);
pub async fn my_orders<B: OrderManagement>(
    user: AuthenticatedUser,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let orders = api.orders_for_user(user.id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(all_orders => Get "/api/orders/all" impl OrderManagement);
pub async fn all_orders<B: OrderManagement>(api: web::Data<OrderApi<B>>) -> Result<HttpResponse, ServerError> {
    let orders = api.all_orders().await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(update_order_status => Put "/api/orders/{id}/status" impl OrderManagement);
pub async fn update_order_status<B: OrderManagement>(
    path: web::Path<i64>,
    params: web::Query<StatusUpdateParams>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order = api.update_status(path.into_inner(), params.status).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(delete_order => Delete "/api/orders/{id}" impl OrderManagement);
pub async fn delete_order<B: OrderManagement>(
    path: web::Path<i64>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    api.delete_order(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::new("Order deleted")))
}

//----------------------------------------------   Banners  ----------------------------------------------------
route!(banners => Get "/api/banners" impl ContentManagement);
pub async fn banners<B: ContentManagement>(api: web::Data<ContentApi<B>>) -> Result<HttpResponse, ServerError> {
    let banners = api.banners().await?;
    Ok(HttpResponse::Ok().json(banners))
}

route!(active_banners => Get "/api/banners/active" impl ContentManagement);
pub async fn active_banners<B: ContentManagement>(
    api: web::Data<ContentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let banners = api.active_banners().await?;
    Ok(HttpResponse::Ok().json(banners))
}

route!(create_banner => Post "/api/banners" impl ContentManagement);
pub async fn create_banner<B: ContentManagement>(
    body: web::Json<NewBanner>,
    api: web::Data<ContentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let banner = api.create_banner(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(banner))
}

route!(update_banner => Put "/api/banners/{id}" impl ContentManagement);
pub async fn update_banner<B: ContentManagement>(
    path: web::Path<i64>,
    body: web::Json<NewBanner>,
    api: web::Data<ContentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let banner = api.update_banner(path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(banner))
}

route!(delete_banner => Delete "/api/banners/{id}" impl ContentManagement);
pub async fn delete_banner<B: ContentManagement>(
    path: web::Path<i64>,
    api: web::Data<ContentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    api.delete_banner(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::new("Banner deleted")))
}

//----------------------------------------------   News  ----------------------------------------------------
route!(news => Get "/api/news" impl ContentManagement);
pub async fn news<B: ContentManagement>(api: web::Data<ContentApi<B>>) -> Result<HttpResponse, ServerError> {
    let news = api.news().await?;
    Ok(HttpResponse::Ok().json(news))
}

route!(news_item => Get "/api/news/{id}" impl ContentManagement);
pub async fn news_item<B: ContentManagement>(
    path: web::Path<i64>,
    api: web::Data<ContentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let item =
        api.news_item(id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("No news article with id {id}")))?;
    Ok(HttpResponse::Ok().json(item))
}

route!(create_news => Post "/api/news" impl ContentManagement);
pub async fn create_news<B: ContentManagement>(
    body: web::Json<NewNews>,
    api: web::Data<ContentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let item = api.create_news(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

route!(update_news => Put "/api/news/{id}" impl ContentManagement);
pub async fn update_news<B: ContentManagement>(
    path: web::Path<i64>,
    body: web::Json<NewNews>,
    api: web::Data<ContentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let item = api.update_news(path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

route!(delete_news => Delete "/api/news/{id}" impl ContentManagement);
pub async fn delete_news<B: ContentManagement>(
    path: web::Path<i64>,
    api: web::Data<ContentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    api.delete_news(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::new("News article deleted")))
}

//----------------------------------------------   Reviews  ----------------------------------------------------
route!(product_reviews => Get "/api/reviews/{product_id}" impl ContentManagement);
pub async fn product_reviews<B: ContentManagement>(
    path: web::Path<i64>,
    api: web::Data<ContentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let reviews = api.reviews_for_product(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

route!(create_review => Post "/api/reviews" impl ContentManagement);
pub async fn create_review<B: ContentManagement>(
    user: AuthenticatedUser,
    body: web::Json<NewReview>,
    api: web::Data<ContentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let review = api.create_review(user.id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(review))
}

//----------------------------------------------   Uploads  ----------------------------------------------------
/// Stores an uploaded image and returns the public path it will be served from. The stored name carries a timestamp
/// prefix so that two uploads with the same filename never clobber each other.
#[post("/api/upload")]
pub async fn upload(
    params: web::Query<UploadParams>,
    body: web::Bytes,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError> {
    let name = sanitize_filename(&params.filename)?;
    let stored = format!("{}_{name}", Utc::now().timestamp_millis());
    tokio::fs::create_dir_all(&options.upload_dir).await?;
    let path = std::path::Path::new(&options.upload_dir).join(&stored);
    tokio::fs::write(&path, &body).await?;
    info!("💻️ Stored upload {} ({} bytes)", path.display(), body.len());
    Ok(HttpResponse::Ok().body(format!("/uploads/{stored}")))
}

#[get("/uploads/{filename:.*}")]
pub async fn serve_upload(
    path: web::Path<String>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError> {
    let name = sanitize_filename(&path.into_inner())?;
    let file = std::path::Path::new(&options.upload_dir).join(&name);
    let contents = tokio::fs::read(&file)
        .await
        .map_err(|_| ServerError::NoRecordFound(format!("No uploaded file named {name}")))?;
    Ok(HttpResponse::Ok().content_type(content_type_for(&name)).body(contents))
}

fn sanitize_filename(name: &str) -> Result<String, ServerError> {
    let name = name.trim();
    if name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(ServerError::InvalidRequestBody(format!("Invalid filename: {name}")));
    }
    Ok(name.to_string())
}

fn content_type_for(name: &str) -> &'static str {
    match name.rsplit('.').next().map(|ext| ext.to_ascii_lowercase()).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

//----------------------------------------------   Assistant  ----------------------------------------------------
#[post("/api/ai/chat")]
pub async fn chat(body: web::Json<ChatRequest>, client: web::Data<GeminiClient>) -> impl Responder {
    let reply = client.ask(&body.message).await;
    HttpResponse::Ok().json(reply)
}
