use thiserror::Error;

use crate::db_types::{Category, CategoryDetail, NewCategory, NewProduct, Product, ProductDetail, ProductQueryFilter};

#[derive(Debug, Clone, Error)]
pub enum CatalogApiError {
    #[error("Product not found")]
    ProductNotFound,
    #[error("Category not found")]
    CategoryNotFound,
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CatalogApiError {
    fn from(e: sqlx::Error) -> Self {
        CatalogApiError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogApiError>;

    async fn fetch_product(&self, id: i64) -> Result<Option<ProductDetail>, CatalogApiError>;

    async fn search_products(&self, filter: ProductQueryFilter) -> Result<Vec<Product>, CatalogApiError>;

    /// Fails with [`CatalogApiError::CategoryNotFound`] if the referenced category does not exist.
    async fn create_product(&self, product: NewProduct) -> Result<ProductDetail, CatalogApiError>;

    /// Replaces the product fields and its image gallery.
    async fn update_product(&self, id: i64, product: NewProduct) -> Result<ProductDetail, CatalogApiError>;

    async fn delete_product(&self, id: i64) -> Result<(), CatalogApiError>;

    async fn fetch_categories(&self) -> Result<Vec<CategoryDetail>, CatalogApiError>;

    async fn fetch_category(&self, id: i64) -> Result<Option<CategoryDetail>, CatalogApiError>;

    async fn create_category(&self, category: NewCategory) -> Result<Category, CatalogApiError>;

    async fn update_category(&self, id: i64, category: NewCategory) -> Result<Category, CatalogApiError>;

    async fn delete_category(&self, id: i64) -> Result<(), CatalogApiError>;
}
