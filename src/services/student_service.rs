// src/services/student_service.rs
use crate::{
    error::{AppError, AppResult},
    models::student::{Student, StudentWithClass},
    services::class_service,
};
use sqlx::SqlitePool;

pub async fn list_students_with_class(db_pool: &SqlitePool) -> AppResult<Vec<StudentWithClass>> {
    let students = sqlx::query_as::<_, StudentWithClass>(
        r#"
        SELECT s.id, s.first_name, s.last_name, s.class_id, c.name AS class_name
        FROM students s
        LEFT JOIN classes c ON c.id = s.class_id
        ORDER BY s.last_name ASC, s.first_name ASC
        "#,
    )
    .fetch_all(db_pool)
    .await?;
    Ok(students)
}

pub async fn find_student_by_id(
    db_pool: &SqlitePool,
    student_id: i64,
) -> AppResult<Option<Student>> {
    let student = sqlx::query_as::<_, Student>(
        "SELECT id, first_name, last_name, class_id FROM students WHERE id = ?",
    )
    .bind(student_id)
    .fetch_optional(db_pool)
    .await?;
    Ok(student)
}

async fn check_class_assignment(db_pool: &SqlitePool, class_id: Option<i64>) -> AppResult<()> {
    if let Some(id) = class_id {
        if class_service::find_class_by_id(db_pool, id).await?.is_none() {
            return Err(AppError::Validation(
                "The selected class does not exist.".to_string(),
            ));
        }
    }
    Ok(())
}

pub async fn create_student(
    db_pool: &SqlitePool,
    first_name: &str,
    last_name: &str,
    class_id: Option<i64>,
) -> AppResult<i64> {
    tracing::info!("Creating student: {} {}", first_name, last_name);
    check_class_assignment(db_pool, class_id).await?;

    let result =
        sqlx::query("INSERT INTO students (first_name, last_name, class_id) VALUES (?, ?, ?)")
            .bind(first_name)
            .bind(last_name)
            .bind(class_id)
            .execute(db_pool)
            .await?;

    Ok(result.last_insert_rowid())
}

pub async fn update_student(
    db_pool: &SqlitePool,
    student_id: i64,
    first_name: &str,
    last_name: &str,
    class_id: Option<i64>,
) -> AppResult<()> {
    tracing::info!("Updating student {}: {} {}", student_id, first_name, last_name);
    check_class_assignment(db_pool, class_id).await?;

    let rows_affected = sqlx::query(
        "UPDATE students SET first_name = ?, last_name = ?, class_id = ? WHERE id = ?",
    )
    .bind(first_name)
    .bind(last_name)
    .bind(class_id)
    .bind(student_id)
    .execute(db_pool)
    .await?
    .rows_affected();

    if rows_affected == 0 {
        return Err(AppError::NotFound("Student"));
    }
    Ok(())
}

/// Deletes a student and all of its attendance records. The cascade is
/// explicit: both deletes run inside one transaction so a failure partway
/// leaves nothing half-removed.
pub async fn delete_student(db_pool: &SqlitePool, student_id: i64) -> AppResult<Student> {
    let student = find_student_by_id(db_pool, student_id)
        .await?
        .ok_or(AppError::NotFound("Student"))?;

    let mut tx = db_pool.begin().await?;

    sqlx::query("DELETE FROM attendance WHERE student_id = ?")
        .bind(student_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM students WHERE id = ?")
        .bind(student_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        "Student '{} {}' deleted along with their attendance records.",
        student.first_name,
        student.last_name
    );
    Ok(student)
}
