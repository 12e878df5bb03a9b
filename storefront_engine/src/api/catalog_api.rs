use std::fmt::Debug;

use crate::{
    db_types::{Category, CategoryDetail, NewCategory, NewProduct, Product, ProductDetail, ProductQueryFilter},
    traits::{CatalogApiError, CatalogManagement},
};

pub struct CatalogApi<B> {
    db: B,
}

impl<B: Debug> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi ({:?})", self.db)
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn products(&self) -> Result<Vec<Product>, CatalogApiError> {
        self.db.fetch_products().await
    }

    pub async fn product(&self, id: i64) -> Result<Option<ProductDetail>, CatalogApiError> {
        self.db.fetch_product(id).await
    }

    pub async fn search_products(&self, filter: ProductQueryFilter) -> Result<Vec<Product>, CatalogApiError> {
        self.db.search_products(filter).await
    }

    pub async fn create_product(&self, product: NewProduct) -> Result<ProductDetail, CatalogApiError> {
        self.db.create_product(product).await
    }

    pub async fn update_product(&self, id: i64, product: NewProduct) -> Result<ProductDetail, CatalogApiError> {
        self.db.update_product(id, product).await
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), CatalogApiError> {
        self.db.delete_product(id).await
    }

    pub async fn categories(&self) -> Result<Vec<CategoryDetail>, CatalogApiError> {
        self.db.fetch_categories().await
    }

    pub async fn category(&self, id: i64) -> Result<Option<CategoryDetail>, CatalogApiError> {
        self.db.fetch_category(id).await
    }

    pub async fn create_category(&self, category: NewCategory) -> Result<Category, CatalogApiError> {
        self.db.create_category(category).await
    }

    pub async fn update_category(&self, id: i64, category: NewCategory) -> Result<Category, CatalogApiError> {
        self.db.update_category(id, category).await
    }

    pub async fn delete_category(&self, id: i64) -> Result<(), CatalogApiError> {
        self.db.delete_category(id).await
    }
}
