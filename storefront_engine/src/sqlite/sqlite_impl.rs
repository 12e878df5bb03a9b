//! `SqliteDatabase` is a concrete implementation of a storefront engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`traits`] module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{banners, categories, db_url, new_pool, news, orders, products, reviews, users};
use crate::{
    db_types::{
        Banner,
        Category,
        CategoryDetail,
        ExternalUserInfo,
        NewBanner,
        NewCategory,
        NewNews,
        NewOrderRequest,
        NewProduct,
        NewReview,
        NewUser,
        News,
        Order,
        OrderDetail,
        OrderStatusType,
        Product,
        ProductDetail,
        ProductQueryFilter,
        Review,
        User,
        UserUpdate,
    },
    traits::{
        CatalogApiError,
        CatalogManagement,
        ContentApiError,
        ContentManagement,
        OrderApiError,
        OrderManagement,
        UserStore,
        UserStoreError,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl UserStore for SqliteDatabase {
    async fn fetch_user_by_username(&self, username: &str) -> Result<Option<User>, UserStoreError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user_by_username(username, &mut conn).await
    }

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, UserStoreError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user_by_email(email, &mut conn).await
    }

    async fn fetch_user_by_id(&self, id: i64) -> Result<Option<User>, UserStoreError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user_by_id(id, &mut conn).await
    }

    async fn fetch_all_users(&self) -> Result<Vec<User>, UserStoreError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_all_users(&mut conn).await
    }

    async fn create_user(&self, user: NewUser) -> Result<User, UserStoreError> {
        let mut conn = self.pool.acquire().await?;
        users::create_user(user, &mut conn).await
    }

    async fn update_user(&self, id: i64, update: UserUpdate) -> Result<User, UserStoreError> {
        let mut conn = self.pool.acquire().await?;
        users::update_user(id, update, &mut conn).await
    }

    async fn delete_user(&self, id: i64) -> Result<(), UserStoreError> {
        let mut conn = self.pool.acquire().await?;
        users::delete_user(id, &mut conn).await
    }

    async fn upsert_external_user(&self, info: &ExternalUserInfo) -> Result<User, UserStoreError> {
        let mut conn = self.pool.acquire().await?;
        users::upsert_external_user(info, &mut conn).await
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        products::fetch_products(&mut conn).await
    }

    async fn fetch_product(&self, id: i64) -> Result<Option<ProductDetail>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        products::fetch_product(id, &mut conn).await
    }

    async fn search_products(&self, filter: ProductQueryFilter) -> Result<Vec<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        products::search_products(filter, &mut conn).await
    }

    async fn create_product(&self, product: NewProduct) -> Result<ProductDetail, CatalogApiError> {
        let mut tx = self.pool.begin().await?;
        let detail = products::create_product(product, &mut tx).await?;
        tx.commit().await?;
        Ok(detail)
    }

    async fn update_product(&self, id: i64, product: NewProduct) -> Result<ProductDetail, CatalogApiError> {
        let mut tx = self.pool.begin().await?;
        let detail = products::update_product(id, product, &mut tx).await?;
        tx.commit().await?;
        Ok(detail)
    }

    async fn delete_product(&self, id: i64) -> Result<(), CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        products::delete_product(id, &mut conn).await
    }

    async fn fetch_categories(&self) -> Result<Vec<CategoryDetail>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        categories::fetch_categories(&mut conn).await
    }

    async fn fetch_category(&self, id: i64) -> Result<Option<CategoryDetail>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        categories::fetch_category(id, &mut conn).await
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        categories::create_category(category, &mut conn).await
    }

    async fn update_category(&self, id: i64, category: NewCategory) -> Result<Category, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        categories::update_category(id, category, &mut conn).await
    }

    async fn delete_category(&self, id: i64) -> Result<(), CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        categories::delete_category(id, &mut conn).await
    }
}

impl OrderManagement for SqliteDatabase {
    async fn create_order(&self, user_id: i64, order: NewOrderRequest) -> Result<OrderDetail, OrderApiError> {
        let mut tx = self.pool.begin().await?;
        let detail = orders::create_order(user_id, order, &mut tx).await?;
        tx.commit().await?;
        Ok(detail)
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<OrderDetail>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders_for_user(user_id, &mut conn).await
    }

    async fn fetch_all_orders(&self) -> Result<Vec<OrderDetail>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_all_orders(&mut conn).await
    }

    async fn update_order_status(&self, id: i64, status: OrderStatusType) -> Result<Order, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        orders::update_order_status(id, status, &mut conn).await
    }

    async fn delete_order(&self, id: i64) -> Result<(), OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        orders::delete_order(id, &mut conn).await
    }
}

impl ContentManagement for SqliteDatabase {
    async fn fetch_banners(&self) -> Result<Vec<Banner>, ContentApiError> {
        let mut conn = self.pool.acquire().await?;
        banners::fetch_banners(&mut conn).await
    }

    async fn fetch_active_banners(&self) -> Result<Vec<Banner>, ContentApiError> {
        let mut conn = self.pool.acquire().await?;
        banners::fetch_active_banners(&mut conn).await
    }

    async fn create_banner(&self, banner: NewBanner) -> Result<Banner, ContentApiError> {
        let mut conn = self.pool.acquire().await?;
        banners::create_banner(banner, &mut conn).await
    }

    async fn update_banner(&self, id: i64, banner: NewBanner) -> Result<Banner, ContentApiError> {
        let mut conn = self.pool.acquire().await?;
        banners::update_banner(id, banner, &mut conn).await
    }

    async fn delete_banner(&self, id: i64) -> Result<(), ContentApiError> {
        let mut conn = self.pool.acquire().await?;
        banners::delete_banner(id, &mut conn).await
    }

    async fn fetch_news(&self) -> Result<Vec<News>, ContentApiError> {
        let mut conn = self.pool.acquire().await?;
        news::fetch_news(&mut conn).await
    }

    async fn fetch_news_item(&self, id: i64) -> Result<Option<News>, ContentApiError> {
        let mut conn = self.pool.acquire().await?;
        news::fetch_news_item(id, &mut conn).await
    }

    async fn create_news(&self, item: NewNews) -> Result<News, ContentApiError> {
        let mut conn = self.pool.acquire().await?;
        news::create_news(item, &mut conn).await
    }

    async fn update_news(&self, id: i64, item: NewNews) -> Result<News, ContentApiError> {
        let mut conn = self.pool.acquire().await?;
        news::update_news(id, item, &mut conn).await
    }

    async fn delete_news(&self, id: i64) -> Result<(), ContentApiError> {
        let mut conn = self.pool.acquire().await?;
        news::delete_news(id, &mut conn).await
    }

    async fn fetch_reviews_for_product(&self, product_id: i64) -> Result<Vec<Review>, ContentApiError> {
        let mut conn = self.pool.acquire().await?;
        reviews::fetch_reviews_for_product(product_id, &mut conn).await
    }

    async fn create_review(&self, user_id: i64, review: NewReview) -> Result<Review, ContentApiError> {
        let mut conn = self.pool.acquire().await?;
        reviews::create_review(user_id, review, &mut conn).await
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the url from the environment.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
