//! SQLite operations for the product catalog.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db_types::{NewProduct, Product, ProductDetail, ProductImage, ProductQueryFilter},
    traits::CatalogApiError,
};

pub async fn fetch_products(conn: &mut SqliteConnection) -> Result<Vec<Product>, CatalogApiError> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY id").fetch_all(conn).await?;
    Ok(products)
}

pub async fn fetch_product(id: i64, conn: &mut SqliteConnection) -> Result<Option<ProductDetail>, CatalogApiError> {
    let product =
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?").bind(id).fetch_optional(&mut *conn).await?;
    let Some(product) = product else {
        return Ok(None);
    };
    let images = fetch_images(id, conn).await?;
    Ok(Some(ProductDetail { product, images }))
}

async fn fetch_images(product_id: i64, conn: &mut SqliteConnection) -> Result<Vec<ProductImage>, CatalogApiError> {
    let images = sqlx::query_as::<_, ProductImage>("SELECT * FROM product_images WHERE product_id = ? ORDER BY id")
        .bind(product_id)
        .fetch_all(conn)
        .await?;
    Ok(images)
}

/// Filters apply name, then category (including sub-categories), then price range, in that order of precedence.
pub async fn search_products(
    filter: ProductQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Product>, CatalogApiError> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM products");
    if let Some(name) = &filter.name {
        builder.push(" WHERE name LIKE ").push_bind(format!("%{name}%")).push(" COLLATE NOCASE");
    } else if let Some(category_id) = filter.category_id {
        builder
            .push(" WHERE category_id = ")
            .push_bind(category_id)
            .push(" OR category_id IN (SELECT id FROM categories WHERE parent_id = ")
            .push_bind(category_id)
            .push(")");
    } else if let (Some(min), Some(max)) = (filter.min_price, filter.max_price) {
        builder.push(" WHERE price BETWEEN ").push_bind(min).push(" AND ").push_bind(max);
    }
    builder.push(" ORDER BY id");
    let products = builder.build_query_as::<Product>().fetch_all(conn).await?;
    Ok(products)
}

async fn category_exists(category_id: i64, conn: &mut SqliteConnection) -> Result<bool, CatalogApiError> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT count(id) FROM categories WHERE id = ?")
        .bind(category_id)
        .fetch_one(conn)
        .await?;
    Ok(exists > 0)
}

pub async fn create_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<ProductDetail, CatalogApiError> {
    if !category_exists(product.category_id, conn).await? {
        return Err(CatalogApiError::CategoryNotFound);
    }
    let created = sqlx::query_as::<_, Product>(
        r#"INSERT INTO products (name, price, quantity, image_url, description, category_id)
           VALUES (?, ?, ?, ?, ?, ?)
           RETURNING *"#,
    )
    .bind(&product.name)
    .bind(product.price)
    .bind(product.quantity)
    .bind(&product.image_url)
    .bind(&product.description)
    .bind(product.category_id)
    .fetch_one(&mut *conn)
    .await?;
    replace_images(created.id, &product.images, conn).await?;
    let images = fetch_images(created.id, conn).await?;
    Ok(ProductDetail { product: created, images })
}

pub async fn update_product(
    id: i64,
    product: NewProduct,
    conn: &mut SqliteConnection,
) -> Result<ProductDetail, CatalogApiError> {
    if !category_exists(product.category_id, conn).await? {
        return Err(CatalogApiError::CategoryNotFound);
    }
    let updated = sqlx::query_as::<_, Product>(
        r#"UPDATE products
           SET name = ?, price = ?, quantity = ?, image_url = ?, description = ?, category_id = ?
           WHERE id = ?
           RETURNING *"#,
    )
    .bind(&product.name)
    .bind(product.price)
    .bind(product.quantity)
    .bind(&product.image_url)
    .bind(&product.description)
    .bind(product.category_id)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(CatalogApiError::ProductNotFound)?;
    replace_images(id, &product.images, conn).await?;
    let images = fetch_images(id, conn).await?;
    Ok(ProductDetail { product: updated, images })
}

async fn replace_images(product_id: i64, urls: &[String], conn: &mut SqliteConnection) -> Result<(), CatalogApiError> {
    sqlx::query("DELETE FROM product_images WHERE product_id = ?").bind(product_id).execute(&mut *conn).await?;
    for url in urls {
        sqlx::query("INSERT INTO product_images (product_id, url) VALUES (?, ?)")
            .bind(product_id)
            .bind(url)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub async fn delete_product(id: i64, conn: &mut SqliteConnection) -> Result<(), CatalogApiError> {
    let res = sqlx::query("DELETE FROM products WHERE id = ?").bind(id).execute(conn).await?;
    if res.rows_affected() == 0 {
        return Err(CatalogApiError::ProductNotFound);
    }
    Ok(())
}
