// src/services/class_service.rs
use crate::{
    error::{AppError, AppResult},
    models::class::Class,
};
use sqlx::SqlitePool;

pub async fn list_classes(db_pool: &SqlitePool) -> AppResult<Vec<Class>> {
    let classes = sqlx::query_as::<_, Class>(
        "SELECT id, name, teacher_name FROM classes ORDER BY name ASC",
    )
    .fetch_all(db_pool)
    .await?;
    Ok(classes)
}

pub async fn find_class_by_id(db_pool: &SqlitePool, class_id: i64) -> AppResult<Option<Class>> {
    let class = sqlx::query_as::<_, Class>(
        "SELECT id, name, teacher_name FROM classes WHERE id = ?",
    )
    .bind(class_id)
    .fetch_optional(db_pool)
    .await?;
    Ok(class)
}

/// True when another class (any class for create, a different id for rename)
/// already uses this name.
async fn name_taken(db_pool: &SqlitePool, name: &str, exclude_id: Option<i64>) -> AppResult<bool> {
    let existing: Option<i64> = match exclude_id {
        Some(id) => {
            sqlx::query_scalar("SELECT id FROM classes WHERE name = ? AND id <> ?")
                .bind(name)
                .bind(id)
                .fetch_optional(db_pool)
                .await?
        }
        None => {
            sqlx::query_scalar("SELECT id FROM classes WHERE name = ?")
                .bind(name)
                .fetch_optional(db_pool)
                .await?
        }
    };
    Ok(existing.is_some())
}

pub async fn create_class(
    db_pool: &SqlitePool,
    name: &str,
    teacher_name: Option<&str>,
) -> AppResult<i64> {
    tracing::info!("Creating class: {}", name);

    if name_taken(db_pool, name, None).await? {
        tracing::warn!("Create refused: class name '{}' already exists.", name);
        return Err(AppError::Conflict(
            "A class with this name already exists. Please use a different name.".to_string(),
        ));
    }

    let result = sqlx::query("INSERT INTO classes (name, teacher_name) VALUES (?, ?)")
        .bind(name)
        .bind(teacher_name)
        .execute(db_pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Renaming to the class's own current name is allowed; renaming onto another
/// class's name is a conflict.
pub async fn update_class(
    db_pool: &SqlitePool,
    class_id: i64,
    name: &str,
    teacher_name: Option<&str>,
) -> AppResult<()> {
    tracing::info!("Updating class {}: name '{}'", class_id, name);

    if name_taken(db_pool, name, Some(class_id)).await? {
        tracing::warn!("Update refused: class name '{}' already exists.", name);
        return Err(AppError::Conflict(
            "A class with this name already exists. Please use a different name.".to_string(),
        ));
    }

    let rows_affected = sqlx::query("UPDATE classes SET name = ?, teacher_name = ? WHERE id = ?")
        .bind(name)
        .bind(teacher_name)
        .bind(class_id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        return Err(AppError::NotFound("Class"));
    }
    Ok(())
}

/// Deletion is refused while students are assigned to the class, and also
/// while attendance history still references it. Both checks run before any
/// mutation; the FK constraints remain as a backstop.
pub async fn delete_class(db_pool: &SqlitePool, class_id: i64) -> AppResult<Class> {
    let class = find_class_by_id(db_pool, class_id)
        .await?
        .ok_or(AppError::NotFound("Class"))?;

    let student_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE class_id = ?")
            .bind(class_id)
            .fetch_one(db_pool)
            .await?;
    if student_count > 0 {
        tracing::warn!(
            "Delete refused: class '{}' has {} assigned student(s).",
            class.name,
            student_count
        );
        return Err(AppError::InUse(format!(
            "Class \"{}\" cannot be deleted because it has students assigned to it. Please reassign students first.",
            class.name
        )));
    }

    let attendance_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM attendance WHERE class_id = ?")
            .bind(class_id)
            .fetch_one(db_pool)
            .await?;
    if attendance_count > 0 {
        tracing::warn!(
            "Delete refused: class '{}' has {} attendance record(s).",
            class.name,
            attendance_count
        );
        return Err(AppError::InUse(format!(
            "Class \"{}\" cannot be deleted because attendance records still reference it.",
            class.name
        )));
    }

    sqlx::query("DELETE FROM classes WHERE id = ?")
        .bind(class_id)
        .execute(db_pool)
        .await?;

    tracing::info!("Class '{}' deleted.", class.name);
    Ok(class)
}
