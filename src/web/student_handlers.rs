// src/web/student_handlers.rs
use crate::{
    error::{AppError, AppResult},
    services::{class_service, student_service},
    state::AppState,
    templates::{StudentFormPage, StudentsPage},
    web::class_handlers::FeedbackParams,
};
use askama::Template;
use axum::{
    extract::{Form, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct StudentForm {
    first_name: String,
    last_name: String,
    // The class selector posts "" for "-- Not Assigned --".
    #[serde(default)]
    class_id: String,
}

impl StudentForm {
    fn first_name(&self) -> &str {
        self.first_name.trim()
    }

    fn last_name(&self) -> &str {
        self.last_name.trim()
    }

    fn class_id(&self) -> Result<Option<i64>, String> {
        let raw = self.class_id.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<i64>()
            .map(Some)
            .map_err(|_| "Invalid class selection.".to_string())
    }

    fn validate(&self) -> Result<Option<i64>, String> {
        if self.first_name().is_empty() || self.first_name().chars().count() > 100 {
            return Err("First name must be between 1 and 100 characters.".to_string());
        }
        if self.last_name().is_empty() || self.last_name().chars().count() > 100 {
            return Err("Last name must be between 1 and 100 characters.".to_string());
        }
        self.class_id()
    }
}

fn redirect_with_success(message: &str) -> Redirect {
    Redirect::to(&format!("/students?success={}", urlencoding::encode(message)))
}

fn redirect_with_error(message: &str) -> Redirect {
    Redirect::to(&format!("/students?error={}", urlencoding::encode(message)))
}

// Re-renders the add/edit form with the submitted values and an error notice.
async fn render_form_with_error(
    state: &AppState,
    student_id: Option<i64>,
    form: &StudentForm,
    message: String,
) -> AppResult<Response> {
    let classes = class_service::list_classes(&state.db_pool).await?;
    let template = StudentFormPage {
        student_id,
        first_name: form.first_name().to_string(),
        last_name: form.last_name().to_string(),
        class_id: form.class_id().unwrap_or(None),
        classes: &classes,
        error_message: Some(message),
    };
    Ok(Html(template.render()?).into_response())
}

// GET /students
pub async fn students_page(
    State(state): State<AppState>,
    Query(params): Query<FeedbackParams>,
) -> AppResult<impl IntoResponse> {
    let students = student_service::list_students_with_class(&state.db_pool).await?;
    let template = StudentsPage {
        students,
        success_message: params.success,
        error_message: params.error,
    };
    Ok(Html(template.render()?))
}

// GET /add_student
pub async fn show_add_student_form(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let classes = class_service::list_classes(&state.db_pool).await?;
    let template = StudentFormPage {
        student_id: None,
        first_name: String::new(),
        last_name: String::new(),
        class_id: None,
        classes: &classes,
        error_message: None,
    };
    Ok(Html(template.render()?))
}

// POST /add_student
pub async fn handle_add_student(
    State(state): State<AppState>,
    Form(form): Form<StudentForm>,
) -> AppResult<Response> {
    tracing::info!("POST /add_student: {} {}", form.first_name(), form.last_name());

    let class_id = match form.validate() {
        Ok(class_id) => class_id,
        Err(message) => return render_form_with_error(&state, None, &form, message).await,
    };

    match student_service::create_student(
        &state.db_pool,
        form.first_name(),
        form.last_name(),
        class_id,
    )
    .await
    {
        Ok(_) => {
            let message = format!(
                "Student \"{} {}\" has been added successfully!",
                form.first_name(),
                form.last_name()
            );
            Ok(redirect_with_success(&message).into_response())
        }
        Err(AppError::Validation(message)) => {
            render_form_with_error(&state, None, &form, message).await
        }
        Err(e) => Err(e),
    }
}

// GET /edit_student/{id}
// Load-then-populate: fetch the student, copy its fields into the form page.
pub async fn show_edit_student_form(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
) -> AppResult<Response> {
    let Some(student) = student_service::find_student_by_id(&state.db_pool, student_id).await?
    else {
        tracing::warn!("Attempt to edit missing student {}", student_id);
        return Ok(redirect_with_error("Student not found.").into_response());
    };

    let classes = class_service::list_classes(&state.db_pool).await?;
    let template = StudentFormPage {
        student_id: Some(student.id),
        first_name: student.first_name,
        last_name: student.last_name,
        class_id: student.class_id,
        classes: &classes,
        error_message: None,
    };
    Ok(Html(template.render()?).into_response())
}

// POST /edit_student/{id}
pub async fn handle_edit_student(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
    Form(form): Form<StudentForm>,
) -> AppResult<Response> {
    tracing::info!(
        "POST /edit_student/{}: {} {}",
        student_id,
        form.first_name(),
        form.last_name()
    );

    let class_id = match form.validate() {
        Ok(class_id) => class_id,
        Err(message) => {
            return render_form_with_error(&state, Some(student_id), &form, message).await
        }
    };

    match student_service::update_student(
        &state.db_pool,
        student_id,
        form.first_name(),
        form.last_name(),
        class_id,
    )
    .await
    {
        Ok(()) => {
            let message = format!(
                "Student \"{} {}\" has been updated successfully!",
                form.first_name(),
                form.last_name()
            );
            Ok(redirect_with_success(&message).into_response())
        }
        Err(AppError::Validation(message)) => {
            render_form_with_error(&state, Some(student_id), &form, message).await
        }
        Err(AppError::NotFound(_)) => {
            Ok(redirect_with_error("Student not found.").into_response())
        }
        Err(e) => Err(e),
    }
}

// POST /delete_student/{id}
pub async fn handle_delete_student(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
) -> AppResult<Redirect> {
    tracing::info!("POST /delete_student/{}", student_id);

    match student_service::delete_student(&state.db_pool, student_id).await {
        Ok(student) => {
            let message = format!(
                "Student \"{} {}\" and all associated attendance records have been deleted successfully!",
                student.first_name, student.last_name
            );
            Ok(redirect_with_success(&message))
        }
        Err(AppError::NotFound(_)) => Ok(redirect_with_error("Student not found.")),
        Err(e) => Err(e),
    }
}
