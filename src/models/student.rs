// src/models/student.rs
use sqlx::FromRow;

// A row from the 'students' table. class_id is NULL for unassigned students.
#[derive(Debug, Clone, FromRow)]
pub struct Student {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub class_id: Option<i64>,
}

/// A student joined with the name of its assigned class, for the list page.
#[derive(Debug, Clone, FromRow)]
pub struct StudentWithClass {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub class_id: Option<i64>,
    pub class_name: Option<String>,
}
