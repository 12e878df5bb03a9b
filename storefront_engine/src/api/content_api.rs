use std::fmt::Debug;

use crate::{
    db_types::{Banner, NewBanner, NewNews, NewReview, News, Review},
    traits::{ContentApiError, ContentManagement},
};

pub struct ContentApi<B> {
    db: B,
}

impl<B: Debug> Debug for ContentApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentApi ({:?})", self.db)
    }
}

impl<B> ContentApi<B>
where B: ContentManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn banners(&self) -> Result<Vec<Banner>, ContentApiError> {
        self.db.fetch_banners().await
    }

    pub async fn active_banners(&self) -> Result<Vec<Banner>, ContentApiError> {
        self.db.fetch_active_banners().await
    }

    pub async fn create_banner(&self, banner: NewBanner) -> Result<Banner, ContentApiError> {
        self.db.create_banner(banner).await
    }

    pub async fn update_banner(&self, id: i64, banner: NewBanner) -> Result<Banner, ContentApiError> {
        self.db.update_banner(id, banner).await
    }

    pub async fn delete_banner(&self, id: i64) -> Result<(), ContentApiError> {
        self.db.delete_banner(id).await
    }

    pub async fn news(&self) -> Result<Vec<News>, ContentApiError> {
        self.db.fetch_news().await
    }

    pub async fn news_item(&self, id: i64) -> Result<Option<News>, ContentApiError> {
        self.db.fetch_news_item(id).await
    }

    pub async fn create_news(&self, news: NewNews) -> Result<News, ContentApiError> {
        self.db.create_news(news).await
    }

    pub async fn update_news(&self, id: i64, news: NewNews) -> Result<News, ContentApiError> {
        self.db.update_news(id, news).await
    }

    pub async fn delete_news(&self, id: i64) -> Result<(), ContentApiError> {
        self.db.delete_news(id).await
    }

    pub async fn reviews_for_product(&self, product_id: i64) -> Result<Vec<Review>, ContentApiError> {
        self.db.fetch_reviews_for_product(product_id).await
    }

    pub async fn create_review(&self, user_id: i64, review: NewReview) -> Result<Review, ContentApiError> {
        self.db.create_review(user_id, review).await
    }
}
