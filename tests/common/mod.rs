// tests/common/mod.rs
use rollcall::services::{class_service, student_service};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Fresh in-memory database with the application schema applied. A single
/// connection, because every :memory: connection is its own database.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid sqlite url")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("connect to in-memory sqlite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    pool
}

pub async fn create_class(pool: &SqlitePool, name: &str, teacher: Option<&str>) -> i64 {
    class_service::create_class(pool, name, teacher)
        .await
        .expect("create class")
}

pub async fn create_student(
    pool: &SqlitePool,
    first_name: &str,
    last_name: &str,
    class_id: Option<i64>,
) -> i64 {
    student_service::create_student(pool, first_name, last_name, class_id)
        .await
        .expect("create student")
}

pub async fn attendance_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM attendance")
        .fetch_one(pool)
        .await
        .expect("count attendance rows")
}

pub async fn attendance_count_for_student(pool: &SqlitePool, student_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM attendance WHERE student_id = ?")
        .bind(student_id)
        .fetch_one(pool)
        .await
        .expect("count attendance rows for student")
}
