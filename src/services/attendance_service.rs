// src/services/attendance_service.rs
use crate::{
    error::{AppError, AppResult},
    models::attendance::{AttendanceRecord, AttendanceViewRow, RosterEntry},
};
use chrono::NaiveDate;
use sqlx::SqlitePool;

/// Parses a calendar date in the %Y-%m-%d form the date inputs submit.
pub fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format for attendance submission.".to_string()))
}

/// Loads the roster for one class and date: every student assigned to the
/// class, ordered by last then first name, each with its stored present flag.
/// Students without a record for that date default to present.
pub async fn load_roster(
    db_pool: &SqlitePool,
    class_id: i64,
    date: NaiveDate,
) -> AppResult<Vec<RosterEntry>> {
    tracing::debug!("Loading roster for class {} on {}", class_id, date);

    let roster = sqlx::query_as::<_, RosterEntry>(
        r#"
        SELECT s.id AS student_id, s.first_name, s.last_name,
               COALESCE(a.is_present, 1) AS is_present
        FROM students s
        LEFT JOIN attendance a
          ON a.student_id = s.id AND a.class_id = ? AND a.date = ?
        WHERE s.class_id = ?
        ORDER BY s.last_name ASC, s.first_name ASC
        "#,
    )
    .bind(class_id)
    .bind(date)
    .bind(class_id)
    .fetch_all(db_pool)
    .await?;

    Ok(roster)
}

/// Applies one submission as a single transaction: one conflict-resolving
/// upsert per (student, present) pair. The UNIQUE (student_id, class_id, date)
/// constraint guarantees one row per triple even under concurrent submissions.
pub async fn submit_attendance(
    db_pool: &SqlitePool,
    class_id: i64,
    date: NaiveDate,
    marks: &[(i64, bool)],
) -> AppResult<()> {
    tracing::debug!(
        "Recording attendance for class {} on {} ({} students)",
        class_id,
        date,
        marks.len()
    );

    let mut tx = db_pool.begin().await?;

    for &(student_id, is_present) in marks {
        sqlx::query(
            r#"
            INSERT INTO attendance (date, is_present, student_id, class_id)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (student_id, class_id, date) DO UPDATE SET
               is_present = excluded.is_present
            "#,
        )
        .bind(date)
        .bind(is_present)
        .bind(student_id)
        .bind(class_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// The stored record for one (student, class, date) triple, if any.
pub async fn find_record(
    db_pool: &SqlitePool,
    student_id: i64,
    class_id: i64,
    date: NaiveDate,
) -> AppResult<Option<AttendanceRecord>> {
    let record = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, date, is_present, student_id, class_id
        FROM attendance
        WHERE student_id = ? AND class_id = ? AND date = ?
        "#,
    )
    .bind(student_id)
    .bind(class_id)
    .bind(date)
    .fetch_optional(db_pool)
    .await?;
    Ok(record)
}

/// Filtered view over all attendance records, joined with student and class.
/// Either filter may be absent; an absent filter matches everything. Ordered
/// by date descending, then class name, then student last/first name.
pub async fn view_records(
    db_pool: &SqlitePool,
    class_filter: Option<i64>,
    date_filter: Option<NaiveDate>,
) -> AppResult<Vec<AttendanceViewRow>> {
    let mut sql = String::from(
        r#"
        SELECT a.date, a.is_present, s.first_name, s.last_name, c.name AS class_name
        FROM attendance a
        JOIN students s ON s.id = a.student_id
        JOIN classes c ON c.id = a.class_id
        "#,
    );

    let mut clauses: Vec<&str> = Vec::new();
    if class_filter.is_some() {
        clauses.push("a.class_id = ?");
    }
    if date_filter.is_some() {
        clauses.push("a.date = ?");
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY a.date DESC, c.name ASC, s.last_name ASC, s.first_name ASC");

    let mut query = sqlx::query_as::<_, AttendanceViewRow>(&sql);
    if let Some(class_id) = class_filter {
        query = query.bind(class_id);
    }
    if let Some(date) = date_filter {
        query = query.bind(date);
    }

    let records = query.fetch_all(db_pool).await?;
    tracing::debug!(
        "View query (class: {:?}, date: {:?}) matched {} record(s).",
        class_filter,
        date_filter,
        records.len()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::parse_date;
    use chrono::NaiveDate;

    #[test]
    fn parse_date_accepts_iso_dates() {
        assert_eq!(
            parse_date("2024-01-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        assert!(parse_date("01/02/2024").is_err());
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("").is_err());
    }
}
