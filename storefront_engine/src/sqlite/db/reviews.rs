//! SQLite operations for product reviews.

use sqlx::SqliteConnection;

use crate::{
    db_types::{NewReview, Review},
    traits::ContentApiError,
};

pub async fn fetch_reviews_for_product(
    product_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Review>, ContentApiError> {
    let reviews =
        sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE product_id = ? ORDER BY created_at DESC, id DESC")
            .bind(product_id)
            .fetch_all(conn)
            .await?;
    Ok(reviews)
}

pub async fn create_review(
    user_id: i64,
    review: NewReview,
    conn: &mut SqliteConnection,
) -> Result<Review, ContentApiError> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT count(id) FROM products WHERE id = ?")
        .bind(review.product_id)
        .fetch_one(&mut *conn)
        .await?;
    if exists == 0 {
        return Err(ContentApiError::ProductNotFound(review.product_id));
    }
    let created = sqlx::query_as::<_, Review>(
        "INSERT INTO reviews (product_id, user_id, content, rating) VALUES (?, ?, ?, ?) RETURNING *",
    )
    .bind(review.product_id)
    .bind(user_id)
    .bind(&review.content)
    .bind(review.rating)
    .fetch_one(conn)
    .await?;
    Ok(created)
}
