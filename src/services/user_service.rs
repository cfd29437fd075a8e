// src/services/user_service.rs
use crate::{
    error::{AppError, AppResult},
    models::user::User,
    services::auth_service,
};
use sqlx::SqlitePool;

pub async fn find_user_by_id(db_pool: &SqlitePool, user_id: i64) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, is_admin, created_at FROM users WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(db_pool)
    .await?;
    Ok(user)
}

pub async fn find_user_by_username(
    db_pool: &SqlitePool,
    username: &str,
) -> AppResult<Option<User>> {
    tracing::debug!("Looking up user by username: {}", username);
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, is_admin, created_at FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(db_pool)
    .await?;
    Ok(user)
}

/// Registers a new account. The username must be free; the check is done up
/// front so the caller gets a readable conflict message, with the UNIQUE
/// constraint still catching anything that slips past it.
pub async fn create_user(
    db_pool: &SqlitePool,
    username: &str,
    raw_password: &str,
) -> AppResult<i64> {
    tracing::info!("Registering user: {}", username);

    if find_user_by_username(db_pool, username).await?.is_some() {
        tracing::warn!("Registration refused: username '{}' is taken.", username);
        return Err(AppError::Conflict(
            "That username is already taken. Please choose a different one.".to_string(),
        ));
    }

    let password_hash = auth_service::hash_password(raw_password).await?;

    let insert_result = sqlx::query(
        "INSERT INTO users (username, password_hash, is_admin) VALUES (?, ?, 0)",
    )
    .bind(username)
    .bind(&password_hash)
    .execute(db_pool)
    .await;

    // UNIQUE constraint violation (SQLite code 19 family) -> duplicate username.
    if let Err(sqlx::Error::Database(db_err)) = &insert_result {
        if db_err.code().map_or(false, |c| c == "19" || c == "2067" || c == "1555") {
            tracing::warn!("Registration lost a race: username '{}' is taken.", username);
            return Err(AppError::Conflict(
                "That username is already taken. Please choose a different one.".to_string(),
            ));
        }
    }
    let user_id = insert_result?.last_insert_rowid();

    tracing::info!("User '{}' registered (id {}).", username, user_id);
    Ok(user_id)
}
