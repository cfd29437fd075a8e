// src/web/attendance_handlers.rs
//
// The take-attendance screen is one route serving a two-phase flow: a
// selection POST (class + date) loads the roster grid, and a second POST
// submits the grid. The two are told apart by which submit field the body
// carries, so the body is read as raw key/value pairs instead of one struct.
use crate::{
    error::{AppError, AppResult},
    models::class::Class,
    services::{attendance_service, class_service},
    state::AppState,
    templates::{RosterView, TakeAttendancePage, ViewAttendancePage},
    web::class_handlers::FeedbackParams,
};
use askama::Template;
use axum::{
    extract::{Form, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use std::collections::HashMap;
use tower_sessions::Session;

// Session keys for the in-progress selection, kept between the load and
// submit steps so the grid can be reconstructed without re-deriving it.
const SESSION_CLASS_KEY: &str = "attendance_class_id";
const SESSION_DATE_KEY: &str = "attendance_date";

#[derive(Debug, Default)]
struct TakeForm {
    class_id: Option<String>,
    date: Option<String>,
    hidden_class_id: Option<String>,
    hidden_date: Option<String>,
    student_ids: Vec<i64>,
    present: HashMap<i64, bool>,
    submit_select: bool,
    submit_attendance: bool,
}

impl TakeForm {
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "class_id" => form.class_id = Some(value),
                "date" => form.date = Some(value),
                "hidden_class_id" => form.hidden_class_id = Some(value),
                "hidden_date" => form.hidden_date = Some(value),
                "student_ids" => {
                    if let Ok(id) = value.parse::<i64>() {
                        form.student_ids.push(id);
                    }
                }
                "submit_select" => form.submit_select = true,
                "submit_attendance" => form.submit_attendance = true,
                _ => {
                    if let Some(raw_id) = key.strip_prefix("present_") {
                        if let Ok(id) = raw_id.parse::<i64>() {
                            form.present.insert(id, value == "true");
                        }
                    }
                }
            }
        }
        form
    }
}

fn redirect_with_success(message: &str) -> Response {
    Redirect::to(&format!("/attendance/take?success={}", urlencoding::encode(message)))
        .into_response()
}

fn redirect_with_error(message: &str) -> Response {
    Redirect::to(&format!("/attendance/take?error={}", urlencoding::encode(message)))
        .into_response()
}

fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Renders the take-attendance page with the roster grid for one class and
/// date. Used by the selection step and by every path that needs to
/// redisplay the previously loaded grid.
async fn render_roster(
    state: &AppState,
    class: &Class,
    date: NaiveDate,
    warning_message: Option<String>,
) -> AppResult<Response> {
    let classes = class_service::list_classes(&state.db_pool).await?;
    let entries = attendance_service::load_roster(&state.db_pool, class.id, date).await?;
    let date_str = date.format("%Y-%m-%d").to_string();

    // An empty roster is not an error, but the caller should hear about it.
    let warning_message = if entries.is_empty() && warning_message.is_none() {
        Some(format!(
            "No students found in class \"{}\". Please add students to this class.",
            class.name
        ))
    } else {
        warning_message
    };

    let template = TakeAttendancePage {
        classes: &classes,
        default_date: date_str.clone(),
        roster: Some(RosterView {
            class_id: class.id,
            class_name: class.name.clone(),
            date: date_str,
            entries: &entries,
        }),
        success_message: None,
        error_message: None,
        warning_message,
    };
    Ok(Html(template.render()?).into_response())
}

// GET /attendance/take
pub async fn take_attendance_page(
    State(state): State<AppState>,
    Query(params): Query<FeedbackParams>,
) -> AppResult<Response> {
    let classes = class_service::list_classes(&state.db_pool).await?;
    let template = TakeAttendancePage {
        classes: &classes,
        default_date: today(),
        roster: None,
        success_message: params.success,
        error_message: params.error,
        warning_message: None,
    };
    Ok(Html(template.render()?).into_response())
}

// POST /attendance/take
pub async fn handle_take_attendance(
    State(state): State<AppState>,
    session: Session,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let form = TakeForm::from_pairs(pairs);

    if form.submit_select {
        handle_selection(&state, &session, form).await
    } else if form.submit_attendance {
        handle_submission(&state, &session, form).await
    } else {
        handle_unrecognized(&state, &session).await
    }
}

/// Selection step: load the roster for the chosen class and date and stash
/// the pair in the session for the submit round trip.
async fn handle_selection(
    state: &AppState,
    session: &Session,
    form: TakeForm,
) -> AppResult<Response> {
    let (Some(raw_class_id), Some(raw_date)) = (form.class_id.as_deref(), form.date.as_deref())
    else {
        return Ok(redirect_with_error("Please select a class and a date."));
    };

    let Ok(class_id) = raw_class_id.parse::<i64>() else {
        return Ok(redirect_with_error("Invalid class selection."));
    };
    let Ok(date) = attendance_service::parse_date(raw_date) else {
        return Ok(redirect_with_error("Invalid date selection."));
    };
    let Some(class) = class_service::find_class_by_id(&state.db_pool, class_id).await? else {
        return Ok(redirect_with_error("Class not found."));
    };

    tracing::debug!("Attendance selection: class '{}' on {}", class.name, date);

    session
        .insert(SESSION_CLASS_KEY, class.id)
        .await
        .map_err(|e| AppError::SessionError(format!("failed to store selection: {}", e)))?;
    session
        .insert(SESSION_DATE_KEY, raw_date.to_string())
        .await
        .map_err(|e| AppError::SessionError(format!("failed to store selection: {}", e)))?;

    render_roster(state, &class, date, None).await
}

/// Submission step: upsert one record per listed student, all in one
/// transaction. Trusts the posted hidden class/date fields and fails fast
/// when they are missing or malformed.
async fn handle_submission(
    state: &AppState,
    session: &Session,
    form: TakeForm,
) -> AppResult<Response> {
    let (Some(raw_class_id), Some(raw_date)) =
        (form.hidden_class_id.as_deref(), form.hidden_date.as_deref())
    else {
        return Ok(redirect_with_error(
            "Error: Missing class or date information for attendance submission.",
        ));
    };

    let Ok(class_id) = raw_class_id.parse::<i64>() else {
        return Ok(redirect_with_error(
            "Error: Missing class or date information for attendance submission.",
        ));
    };
    let Ok(date) = attendance_service::parse_date(raw_date) else {
        return Ok(redirect_with_error(
            "Error: Invalid date format for attendance submission.",
        ));
    };
    let Some(class) = class_service::find_class_by_id(&state.db_pool, class_id).await? else {
        return Ok(redirect_with_error("Class not found."));
    };

    if form.student_ids.is_empty() {
        // Nothing to write: advisory notice, then redisplay the grid the
        // same way the selection step builds it.
        tracing::warn!("Attendance submission without student data for class {}", class.id);
        return render_roster(
            state,
            &class,
            date,
            Some("No student attendance data received. Please try again.".to_string()),
        )
        .await;
    }

    // Unchecked boxes simply don't appear in the body, so every listed
    // student defaults to absent unless its checkbox was posted.
    let marks: Vec<(i64, bool)> = form
        .student_ids
        .iter()
        .map(|&id| (id, form.present.get(&id).copied().unwrap_or(false)))
        .collect();

    attendance_service::submit_attendance(&state.db_pool, class.id, date, &marks).await?;

    // The round trip is complete; drop the carried-over selection.
    session
        .remove::<i64>(SESSION_CLASS_KEY)
        .await
        .map_err(|e| AppError::SessionError(format!("failed to clear selection: {}", e)))?;
    session
        .remove::<String>(SESSION_DATE_KEY)
        .await
        .map_err(|e| AppError::SessionError(format!("failed to clear selection: {}", e)))?;

    let message = format!(
        "Attendance for {} on {} recorded successfully!",
        class.name,
        date.format("%Y-%m-%d")
    );
    Ok(redirect_with_success(&message))
}

/// Neither submit button was recognized in the POST body. If a selection is
/// still parked in the session, rebuild the grid from it; otherwise start
/// over.
async fn handle_unrecognized(state: &AppState, session: &Session) -> AppResult<Response> {
    let class_id: Option<i64> = session
        .get(SESSION_CLASS_KEY)
        .await
        .map_err(|e| AppError::SessionError(format!("failed to read selection: {}", e)))?;
    let raw_date: Option<String> = session
        .get(SESSION_DATE_KEY)
        .await
        .map_err(|e| AppError::SessionError(format!("failed to read selection: {}", e)))?;

    if let (Some(class_id), Some(raw_date)) = (class_id, raw_date) {
        if let Ok(date) = attendance_service::parse_date(&raw_date) {
            if let Some(class) = class_service::find_class_by_id(&state.db_pool, class_id).await? {
                return render_roster(state, &class, date, None).await;
            }
        }
    }

    Ok(Redirect::to("/attendance/take").into_response())
}

#[derive(Deserialize, Debug)]
pub struct ViewFilterForm {
    // Both filters are optional; the selector posts "" for "all classes"
    // and an empty date input posts "".
    #[serde(default)]
    class_id: String,
    #[serde(default)]
    date: String,
}

// GET /attendance/view
pub async fn view_attendance_page(State(state): State<AppState>) -> AppResult<Response> {
    let classes = class_service::list_classes(&state.db_pool).await?;
    let template = ViewAttendancePage {
        classes: &classes,
        records: &[],
        searched: false,
        filter_class_id: None,
        filter_date: String::new(),
        info_message: None,
    };
    Ok(Html(template.render()?).into_response())
}

// POST /attendance/view
pub async fn handle_view_attendance(
    State(state): State<AppState>,
    Form(form): Form<ViewFilterForm>,
) -> AppResult<Response> {
    let classes = class_service::list_classes(&state.db_pool).await?;

    let render_invalid = |message: &str, classes: &[Class]| -> AppResult<Response> {
        let template = ViewAttendancePage {
            classes,
            records: &[],
            searched: false,
            filter_class_id: None,
            filter_date: String::new(),
            info_message: Some(message.to_string()),
        };
        Ok(Html(template.render()?).into_response())
    };

    let raw_class_id = form.class_id.trim();
    let class_filter = if raw_class_id.is_empty() {
        None
    } else {
        match raw_class_id.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => return render_invalid("Invalid class filter.", &classes),
        }
    };

    let raw_date = form.date.trim();
    let date_filter = if raw_date.is_empty() {
        None
    } else {
        match attendance_service::parse_date(raw_date) {
            Ok(date) => Some(date),
            Err(_) => return render_invalid("Invalid date filter.", &classes),
        }
    };

    let records =
        attendance_service::view_records(&state.db_pool, class_filter, date_filter).await?;

    let template = ViewAttendancePage {
        classes: &classes,
        records: &records,
        searched: true,
        filter_class_id: class_filter,
        filter_date: raw_date.to_string(),
        info_message: None,
    };
    Ok(Html(template.render()?).into_response())
}
