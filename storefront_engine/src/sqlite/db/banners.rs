//! SQLite operations for home-page banners.

use sqlx::SqliteConnection;

use crate::{
    db_types::{Banner, NewBanner},
    traits::ContentApiError,
};

pub async fn fetch_banners(conn: &mut SqliteConnection) -> Result<Vec<Banner>, ContentApiError> {
    let banners =
        sqlx::query_as::<_, Banner>("SELECT * FROM banners ORDER BY display_order, id").fetch_all(conn).await?;
    Ok(banners)
}

pub async fn fetch_active_banners(conn: &mut SqliteConnection) -> Result<Vec<Banner>, ContentApiError> {
    let banners = sqlx::query_as::<_, Banner>("SELECT * FROM banners WHERE active = 1 ORDER BY display_order, id")
        .fetch_all(conn)
        .await?;
    Ok(banners)
}

pub async fn create_banner(banner: NewBanner, conn: &mut SqliteConnection) -> Result<Banner, ContentApiError> {
    let created = sqlx::query_as::<_, Banner>(
        "INSERT INTO banners (image_url, link, section, active, display_order) VALUES (?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(&banner.image_url)
    .bind(&banner.link)
    .bind(&banner.section)
    .bind(banner.active)
    .bind(banner.display_order)
    .fetch_one(conn)
    .await?;
    Ok(created)
}

pub async fn update_banner(id: i64, banner: NewBanner, conn: &mut SqliteConnection) -> Result<Banner, ContentApiError> {
    let updated = sqlx::query_as::<_, Banner>(
        r#"UPDATE banners
           SET image_url = ?, link = ?, section = ?, active = ?, display_order = ?
           WHERE id = ?
           RETURNING *"#,
    )
    .bind(&banner.image_url)
    .bind(&banner.link)
    .bind(&banner.section)
    .bind(banner.active)
    .bind(banner.display_order)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    updated.ok_or(ContentApiError::BannerNotFound)
}

pub async fn delete_banner(id: i64, conn: &mut SqliteConnection) -> Result<(), ContentApiError> {
    let res = sqlx::query("DELETE FROM banners WHERE id = ?").bind(id).execute(conn).await?;
    if res.rows_affected() == 0 {
        return Err(ContentApiError::BannerNotFound);
    }
    Ok(())
}
