//! SQLite operations for news articles.

use sqlx::SqliteConnection;

use crate::{
    db_types::{NewNews, News},
    traits::ContentApiError,
};

pub async fn fetch_news(conn: &mut SqliteConnection) -> Result<Vec<News>, ContentApiError> {
    let news =
        sqlx::query_as::<_, News>("SELECT * FROM news ORDER BY created_at DESC, id DESC").fetch_all(conn).await?;
    Ok(news)
}

pub async fn fetch_news_item(id: i64, conn: &mut SqliteConnection) -> Result<Option<News>, ContentApiError> {
    let item = sqlx::query_as::<_, News>("SELECT * FROM news WHERE id = ?").bind(id).fetch_optional(conn).await?;
    Ok(item)
}

pub async fn create_news(news: NewNews, conn: &mut SqliteConnection) -> Result<News, ContentApiError> {
    let created = sqlx::query_as::<_, News>(
        "INSERT INTO news (title, content, image_url, author) VALUES (?, ?, ?, ?) RETURNING *",
    )
    .bind(&news.title)
    .bind(&news.content)
    .bind(&news.image_url)
    .bind(&news.author)
    .fetch_one(conn)
    .await?;
    Ok(created)
}

pub async fn update_news(id: i64, news: NewNews, conn: &mut SqliteConnection) -> Result<News, ContentApiError> {
    let updated = sqlx::query_as::<_, News>(
        r#"UPDATE news
           SET title = ?, content = ?, image_url = ?, author = ?, updated_at = CURRENT_TIMESTAMP
           WHERE id = ?
           RETURNING *"#,
    )
    .bind(&news.title)
    .bind(&news.content)
    .bind(&news.image_url)
    .bind(&news.author)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    updated.ok_or(ContentApiError::NewsNotFound)
}

pub async fn delete_news(id: i64, conn: &mut SqliteConnection) -> Result<(), ContentApiError> {
    let res = sqlx::query("DELETE FROM news WHERE id = ?").bind(id).execute(conn).await?;
    if res.rows_affected() == 0 {
        return Err(ContentApiError::NewsNotFound);
    }
    Ok(())
}
