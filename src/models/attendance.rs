// src/models/attendance.rs
use chrono::NaiveDate;
use sqlx::FromRow;

// A row from the 'attendance' table. At most one row exists per
// (student_id, class_id, date); the submission upsert relies on that.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub is_present: bool,
    pub student_id: i64,
    pub class_id: i64,
}

/// One line of the take-attendance grid: a student of the selected class
/// paired with its present/absent state for the selected date. Students with
/// no stored record yet default to present.
#[derive(Debug, Clone, FromRow)]
pub struct RosterEntry {
    pub student_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub is_present: bool,
}

/// A stored attendance record joined with its student and class, as shown on
/// the view screen.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceViewRow {
    pub date: NaiveDate,
    pub is_present: bool,
    pub first_name: String,
    pub last_name: String,
    pub class_name: String,
}
