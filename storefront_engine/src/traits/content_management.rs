use thiserror::Error;

use crate::db_types::{Banner, NewBanner, NewNews, NewReview, News, Review};

#[derive(Debug, Clone, Error)]
pub enum ContentApiError {
    #[error("Banner not found")]
    BannerNotFound,
    #[error("News item not found")]
    NewsNotFound,
    #[error("Product not found: {0}")]
    ProductNotFound(i64),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for ContentApiError {
    fn from(e: sqlx::Error) -> Self {
        ContentApiError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait ContentManagement {
    async fn fetch_banners(&self) -> Result<Vec<Banner>, ContentApiError>;

    /// Active banners only, ordered by `display_order`. This is the public storefront view.
    async fn fetch_active_banners(&self) -> Result<Vec<Banner>, ContentApiError>;

    async fn create_banner(&self, banner: NewBanner) -> Result<Banner, ContentApiError>;

    async fn update_banner(&self, id: i64, banner: NewBanner) -> Result<Banner, ContentApiError>;

    async fn delete_banner(&self, id: i64) -> Result<(), ContentApiError>;

    /// All news items, newest first.
    async fn fetch_news(&self) -> Result<Vec<News>, ContentApiError>;

    async fn fetch_news_item(&self, id: i64) -> Result<Option<News>, ContentApiError>;

    async fn create_news(&self, news: NewNews) -> Result<News, ContentApiError>;

    async fn update_news(&self, id: i64, news: NewNews) -> Result<News, ContentApiError>;

    async fn delete_news(&self, id: i64) -> Result<(), ContentApiError>;

    /// Reviews for a product, newest first.
    async fn fetch_reviews_for_product(&self, product_id: i64) -> Result<Vec<Review>, ContentApiError>;

    async fn create_review(&self, user_id: i64, review: NewReview) -> Result<Review, ContentApiError>;
}
