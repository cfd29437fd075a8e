// src/models/class.rs
use sqlx::FromRow;

// A row from the 'classes' table. teacher_name is optional.
#[derive(Debug, Clone, FromRow)]
pub struct Class {
    pub id: i64,
    pub name: String,
    pub teacher_name: Option<String>,
}
