//! SQLite operations for the credential store.
//!
//! Generally clients should never call these methods directly, and prefer the [`UserStore`] trait methods
//! implemented on the [`SqliteDatabase`](crate::SqliteDatabase) struct instead.

use sqlx::SqliteConnection;

use crate::{
    db_types::{ExternalUserInfo, NewUser, User, UserUpdate, EXTERNAL_PASSWORD_SENTINEL},
    traits::UserStoreError,
};

pub async fn fetch_user_by_username(
    username: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<User>, UserStoreError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(conn)
        .await?;
    Ok(user)
}

pub async fn fetch_user_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<User>, UserStoreError> {
    let user =
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?").bind(email).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn fetch_user_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, UserStoreError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?").bind(id).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn fetch_all_users(conn: &mut SqliteConnection) -> Result<Vec<User>, UserStoreError> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id").fetch_all(conn).await?;
    Ok(users)
}

pub async fn create_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, UserStoreError> {
    let created = sqlx::query_as::<_, User>(
        r#"INSERT INTO users (username, email, password, role, provider, name, avatar)
           VALUES (?, ?, ?, 'USER', 'LOCAL', ?, ?)
           RETURNING *"#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password)
    .bind(&user.name)
    .bind(&user.avatar)
    .fetch_one(conn)
    .await?;
    Ok(created)
}

pub async fn update_user(id: i64, update: UserUpdate, conn: &mut SqliteConnection) -> Result<User, UserStoreError> {
    let updated = sqlx::query_as::<_, User>(
        r#"UPDATE users
           SET username = ?, email = ?, password = COALESCE(?, password)
           WHERE id = ?
           RETURNING *"#,
    )
    .bind(&update.username)
    .bind(&update.email)
    .bind(update.password.as_ref().filter(|p| !p.is_empty()))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    updated.ok_or(UserStoreError::UserNotFound)
}

pub async fn delete_user(id: i64, conn: &mut SqliteConnection) -> Result<(), UserStoreError> {
    let res = sqlx::query("DELETE FROM users WHERE id = ?").bind(id).execute(conn).await?;
    if res.rows_affected() == 0 {
        return Err(UserStoreError::UserNotFound);
    }
    Ok(())
}

/// Atomic get-or-create for external logins, keyed on `email`.
///
/// A single `INSERT .. ON CONFLICT(email) DO UPDATE .. RETURNING` statement guarantees that two concurrent first
/// logins for the same email resolve to one row. The conflict arm also backfills an empty legacy username with the
/// email, which is the migration-on-read behaviour required for pre-provisioning records.
pub async fn upsert_external_user(
    info: &ExternalUserInfo,
    conn: &mut SqliteConnection,
) -> Result<User, UserStoreError> {
    let user = sqlx::query_as::<_, User>(
        r#"INSERT INTO users (username, email, password, role, provider, name)
           VALUES (?, ?, ?, 'USER', ?, ?)
           ON CONFLICT (email) DO UPDATE SET
               username = COALESCE(NULLIF(users.username, ''), excluded.username),
               name = COALESCE(users.name, excluded.name)
           RETURNING *"#,
    )
    .bind(&info.email)
    .bind(&info.email)
    .bind(EXTERNAL_PASSWORD_SENTINEL)
    .bind(info.provider)
    .bind(&info.name)
    .fetch_one(conn)
    .await?;
    Ok(user)
}
