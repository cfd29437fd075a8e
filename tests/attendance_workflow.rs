// tests/attendance_workflow.rs
//
// Service-level coverage of the attendance workflow: roster loading with the
// optimistic present default, the transactional upsert submission, and the
// filtered view query.
mod common;

use chrono::NaiveDate;
use common::{attendance_count, attendance_count_for_student, create_class, create_student, test_pool};
use rollcall::services::attendance_service;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[tokio::test]
async fn roster_defaults_to_present() {
    let pool = test_pool().await;
    let class_id = create_class(&pool, "Math 101", None).await;
    create_student(&pool, "Alice", "Smith", Some(class_id)).await;
    create_student(&pool, "Bob", "Brown", Some(class_id)).await;

    let roster = attendance_service::load_roster(&pool, class_id, day(2024, 1, 15))
        .await
        .unwrap();

    assert_eq!(roster.len(), 2);
    assert!(roster.iter().all(|entry| entry.is_present));
}

#[tokio::test]
async fn roster_is_ordered_by_last_then_first_name() {
    let pool = test_pool().await;
    let class_id = create_class(&pool, "Science A", None).await;
    create_student(&pool, "Zoe", "Adams", Some(class_id)).await;
    create_student(&pool, "Amy", "Young", Some(class_id)).await;
    create_student(&pool, "Ben", "Adams", Some(class_id)).await;

    let roster = attendance_service::load_roster(&pool, class_id, day(2024, 1, 15))
        .await
        .unwrap();

    let names: Vec<(String, String)> = roster
        .into_iter()
        .map(|entry| (entry.last_name, entry.first_name))
        .collect();
    assert_eq!(
        names,
        vec![
            ("Adams".to_string(), "Ben".to_string()),
            ("Adams".to_string(), "Zoe".to_string()),
            ("Young".to_string(), "Amy".to_string()),
        ]
    );
}

#[tokio::test]
async fn roster_for_class_without_students_is_empty() {
    let pool = test_pool().await;
    let class_id = create_class(&pool, "Empty Class", None).await;

    let roster = attendance_service::load_roster(&pool, class_id, day(2024, 1, 15))
        .await
        .unwrap();
    assert!(roster.is_empty());
}

#[tokio::test]
async fn roster_only_includes_students_of_that_class() {
    let pool = test_pool().await;
    let class_a = create_class(&pool, "Class Alpha", None).await;
    let class_b = create_class(&pool, "Class Beta", None).await;
    create_student(&pool, "In", "Alpha", Some(class_a)).await;
    create_student(&pool, "In", "Beta", Some(class_b)).await;
    create_student(&pool, "No", "Class", None).await;

    let roster = attendance_service::load_roster(&pool, class_a, day(2024, 1, 15))
        .await
        .unwrap();

    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].last_name, "Alpha");
}

#[tokio::test]
async fn submission_is_idempotent_and_keeps_latest_flag() {
    let pool = test_pool().await;
    let class_id = create_class(&pool, "Submit Att Class", None).await;
    let student_id = create_student(&pool, "Submit", "Ter", Some(class_id)).await;
    let date = day(2024, 2, 1);

    attendance_service::submit_attendance(&pool, class_id, date, &[(student_id, true)])
        .await
        .unwrap();
    attendance_service::submit_attendance(&pool, class_id, date, &[(student_id, false)])
        .await
        .unwrap();

    // Exactly one row for the triple, carrying the latest flag.
    assert_eq!(attendance_count_for_student(&pool, student_id).await, 1);
    let record = attendance_service::find_record(&pool, student_id, class_id, date)
        .await
        .unwrap()
        .expect("record exists");
    assert!(!record.is_present);
    assert_eq!(record.date, date);
}

#[tokio::test]
async fn submission_with_no_marks_writes_nothing() {
    let pool = test_pool().await;
    let class_id = create_class(&pool, "Quiet Class", None).await;
    create_student(&pool, "Una", "Heard", Some(class_id)).await;

    attendance_service::submit_attendance(&pool, class_id, day(2024, 2, 1), &[])
        .await
        .unwrap();

    assert_eq!(attendance_count(&pool).await, 0);
}

#[tokio::test]
async fn records_for_same_student_on_other_dates_are_untouched() {
    let pool = test_pool().await;
    let class_id = create_class(&pool, "History B", None).await;
    let student_id = create_student(&pool, "Bob", "Brown", Some(class_id)).await;

    attendance_service::submit_attendance(&pool, class_id, day(2024, 3, 1), &[(student_id, false)])
        .await
        .unwrap();
    attendance_service::submit_attendance(&pool, class_id, day(2024, 3, 2), &[(student_id, true)])
        .await
        .unwrap();

    assert_eq!(attendance_count_for_student(&pool, student_id).await, 2);

    let day_one = attendance_service::load_roster(&pool, class_id, day(2024, 3, 1)).await.unwrap();
    assert!(!day_one[0].is_present);
    let day_two = attendance_service::load_roster(&pool, class_id, day(2024, 3, 2)).await.unwrap();
    assert!(day_two[0].is_present);
}

#[tokio::test]
async fn view_filters_compose() {
    let pool = test_pool().await;
    let history = create_class(&pool, "History 101", Some("Dr. Jones")).await;
    let math = create_class(&pool, "Math 201", None).await;
    let s1 = create_student(&pool, "Alice", "Smith", Some(history)).await;
    let s2 = create_student(&pool, "Bob", "Brown", Some(math)).await;
    let monday = day(2024, 1, 1);
    let tuesday = day(2024, 1, 2);

    attendance_service::submit_attendance(&pool, history, monday, &[(s1, true)]).await.unwrap();
    attendance_service::submit_attendance(&pool, history, tuesday, &[(s1, false)]).await.unwrap();
    attendance_service::submit_attendance(&pool, math, monday, &[(s2, true)]).await.unwrap();

    // No criteria: everything.
    let all = attendance_service::view_records(&pool, None, None).await.unwrap();
    assert_eq!(all.len(), 3);

    // Class filter only.
    let history_only = attendance_service::view_records(&pool, Some(history), None).await.unwrap();
    assert_eq!(history_only.len(), 2);
    assert!(history_only.iter().all(|r| r.class_name == "History 101"));

    // Date filter only.
    let monday_only = attendance_service::view_records(&pool, None, Some(monday)).await.unwrap();
    assert_eq!(monday_only.len(), 2);
    assert!(monday_only.iter().all(|r| r.date == monday));

    // Both filters: the intersection.
    let both = attendance_service::view_records(&pool, Some(history), Some(monday)).await.unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].last_name, "Smith");

    // Criteria matching nothing: success with an empty set.
    let none = attendance_service::view_records(&pool, Some(math), Some(tuesday)).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn view_orders_by_date_desc_then_class_then_student() {
    let pool = test_pool().await;
    let beta = create_class(&pool, "Beta", None).await;
    let alpha = create_class(&pool, "Alpha", None).await;
    let b_student = create_student(&pool, "Ben", "Oldman", Some(beta)).await;
    let a_young = create_student(&pool, "Amy", "Young", Some(alpha)).await;
    let a_adams = create_student(&pool, "Zoe", "Adams", Some(alpha)).await;
    let earlier = day(2024, 5, 1);
    let later = day(2024, 5, 2);

    attendance_service::submit_attendance(&pool, beta, earlier, &[(b_student, true)]).await.unwrap();
    attendance_service::submit_attendance(&pool, alpha, later, &[(a_young, true), (a_adams, false)])
        .await
        .unwrap();
    attendance_service::submit_attendance(&pool, beta, later, &[(b_student, false)]).await.unwrap();

    let records = attendance_service::view_records(&pool, None, None).await.unwrap();
    let order: Vec<(NaiveDate, String, String)> = records
        .into_iter()
        .map(|r| (r.date, r.class_name, r.last_name))
        .collect();

    assert_eq!(
        order,
        vec![
            (later, "Alpha".to_string(), "Adams".to_string()),
            (later, "Alpha".to_string(), "Young".to_string()),
            (later, "Beta".to_string(), "Oldman".to_string()),
            (earlier, "Beta".to_string(), "Oldman".to_string()),
        ]
    );
}

// The full scenario from the requirements: History 101 with one student,
// loaded, flipped to absent, reloaded.
#[tokio::test]
async fn take_attendance_scenario_end_to_end() {
    let pool = test_pool().await;
    let class_id = create_class(&pool, "History 101", Some("Dr. Jones")).await;
    let student_id = create_student(&pool, "Att", "Ender", Some(class_id)).await;
    let date = day(2024, 1, 1);

    let roster = attendance_service::load_roster(&pool, class_id, date).await.unwrap();
    assert_eq!(roster.len(), 1);
    assert!(roster[0].is_present);

    attendance_service::submit_attendance(&pool, class_id, date, &[(student_id, false)])
        .await
        .unwrap();

    let roster = attendance_service::load_roster(&pool, class_id, date).await.unwrap();
    assert_eq!(roster.len(), 1);
    assert!(!roster[0].is_present);
    assert_eq!(attendance_count_for_student(&pool, student_id).await, 1);
    let record = attendance_service::find_record(&pool, student_id, class_id, date)
        .await
        .unwrap()
        .expect("record exists");
    assert_eq!(record.student_id, student_id);
    assert_eq!(record.class_id, class_id);
}
