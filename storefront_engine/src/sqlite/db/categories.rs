//! SQLite operations for the category tree.

use sqlx::SqliteConnection;

use crate::{
    db_types::{Category, CategoryDetail, NewCategory},
    traits::CatalogApiError,
};

pub async fn fetch_categories(conn: &mut SqliteConnection) -> Result<Vec<CategoryDetail>, CatalogApiError> {
    let all = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY id").fetch_all(conn).await?;
    let details = all
        .iter()
        .map(|c| CategoryDetail {
            category: c.clone(),
            children: all.iter().filter(|ch| ch.parent_id == Some(c.id)).cloned().collect(),
        })
        .collect();
    Ok(details)
}

pub async fn fetch_category(id: i64, conn: &mut SqliteConnection) -> Result<Option<CategoryDetail>, CatalogApiError> {
    let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    let Some(category) = category else {
        return Ok(None);
    };
    let children = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE parent_id = ? ORDER BY id")
        .bind(id)
        .fetch_all(conn)
        .await?;
    Ok(Some(CategoryDetail { category, children }))
}

pub async fn create_category(category: NewCategory, conn: &mut SqliteConnection) -> Result<Category, CatalogApiError> {
    let created =
        sqlx::query_as::<_, Category>("INSERT INTO categories (name, parent_id) VALUES (?, ?) RETURNING *")
            .bind(&category.name)
            .bind(category.parent_id)
            .fetch_one(conn)
            .await?;
    Ok(created)
}

pub async fn update_category(
    id: i64,
    category: NewCategory,
    conn: &mut SqliteConnection,
) -> Result<Category, CatalogApiError> {
    let updated =
        sqlx::query_as::<_, Category>("UPDATE categories SET name = ?, parent_id = ? WHERE id = ? RETURNING *")
            .bind(&category.name)
            .bind(category.parent_id)
            .bind(id)
            .fetch_optional(conn)
            .await?;
    updated.ok_or(CatalogApiError::CategoryNotFound)
}

pub async fn delete_category(id: i64, conn: &mut SqliteConnection) -> Result<(), CatalogApiError> {
    let res = sqlx::query("DELETE FROM categories WHERE id = ?").bind(id).execute(conn).await?;
    if res.rows_affected() == 0 {
        return Err(CatalogApiError::CategoryNotFound);
    }
    Ok(())
}
