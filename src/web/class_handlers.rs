// src/web/class_handlers.rs
use crate::{
    error::{AppError, AppResult},
    services::class_service,
    state::AppState,
    templates::{ClassFormPage, ClassesPage},
};
use askama::Template;
use axum::{
    extract::{Form, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

// Feedback carried across the Post/Redirect/Get round trip.
#[derive(Deserialize, Debug)]
pub struct FeedbackParams {
    pub success: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ClassForm {
    name: String,
    #[serde(default)]
    teacher_name: String,
}

impl ClassForm {
    fn name(&self) -> &str {
        self.name.trim()
    }

    // An empty teacher field means "no teacher", not an empty name.
    fn teacher_name(&self) -> Option<&str> {
        let trimmed = self.teacher_name.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    fn validate(&self) -> Result<(), String> {
        let name_len = self.name().chars().count();
        if name_len < 2 || name_len > 100 {
            return Err("Class name must be between 2 and 100 characters.".to_string());
        }
        if self.teacher_name.trim().chars().count() > 100 {
            return Err("Teacher name must be at most 100 characters.".to_string());
        }
        Ok(())
    }
}

fn redirect_with_success(message: &str) -> Redirect {
    Redirect::to(&format!("/classes?success={}", urlencoding::encode(message)))
}

fn redirect_with_error(message: &str) -> Redirect {
    Redirect::to(&format!("/classes?error={}", urlencoding::encode(message)))
}

// Re-renders the add/edit form with the submitted values and an error notice.
fn render_form_with_error(
    class_id: Option<i64>,
    form: &ClassForm,
    message: String,
) -> AppResult<Response> {
    let template = ClassFormPage {
        class_id,
        name: form.name().to_string(),
        teacher_name: form.teacher_name.trim().to_string(),
        error_message: Some(message),
    };
    Ok(Html(template.render()?).into_response())
}

// GET /classes
pub async fn classes_page(
    State(state): State<AppState>,
    Query(params): Query<FeedbackParams>,
) -> AppResult<impl IntoResponse> {
    let classes = class_service::list_classes(&state.db_pool).await?;
    let template = ClassesPage {
        classes,
        success_message: params.success,
        error_message: params.error,
    };
    Ok(Html(template.render()?))
}

// GET /add_class
pub async fn show_add_class_form() -> AppResult<impl IntoResponse> {
    let template = ClassFormPage {
        class_id: None,
        name: String::new(),
        teacher_name: String::new(),
        error_message: None,
    };
    Ok(Html(template.render()?))
}

// POST /add_class
pub async fn handle_add_class(
    State(state): State<AppState>,
    Form(form): Form<ClassForm>,
) -> AppResult<Response> {
    tracing::info!("POST /add_class: {}", form.name());

    if let Err(message) = form.validate() {
        return render_form_with_error(None, &form, message);
    }

    match class_service::create_class(&state.db_pool, form.name(), form.teacher_name()).await {
        Ok(_) => {
            let message = format!("Class \"{}\" has been added successfully!", form.name());
            Ok(redirect_with_success(&message).into_response())
        }
        Err(AppError::Conflict(message)) => render_form_with_error(None, &form, message),
        Err(e) => Err(e),
    }
}

// GET /edit_class/{id}
// Load-then-populate: fetch the class, copy its fields into the form page.
pub async fn show_edit_class_form(
    State(state): State<AppState>,
    Path(class_id): Path<i64>,
) -> AppResult<Response> {
    let Some(class) = class_service::find_class_by_id(&state.db_pool, class_id).await? else {
        tracing::warn!("Attempt to edit missing class {}", class_id);
        return Ok(redirect_with_error("Class not found.").into_response());
    };

    let template = ClassFormPage {
        class_id: Some(class.id),
        name: class.name,
        teacher_name: class.teacher_name.unwrap_or_default(),
        error_message: None,
    };
    Ok(Html(template.render()?).into_response())
}

// POST /edit_class/{id}
pub async fn handle_edit_class(
    State(state): State<AppState>,
    Path(class_id): Path<i64>,
    Form(form): Form<ClassForm>,
) -> AppResult<Response> {
    tracing::info!("POST /edit_class/{}: {}", class_id, form.name());

    if let Err(message) = form.validate() {
        return render_form_with_error(Some(class_id), &form, message);
    }

    match class_service::update_class(&state.db_pool, class_id, form.name(), form.teacher_name())
        .await
    {
        Ok(()) => {
            let message = format!("Class \"{}\" has been updated successfully!", form.name());
            Ok(redirect_with_success(&message).into_response())
        }
        Err(AppError::Conflict(message)) => render_form_with_error(Some(class_id), &form, message),
        Err(AppError::NotFound(_)) => Ok(redirect_with_error("Class not found.").into_response()),
        Err(e) => Err(e),
    }
}

// POST /delete_class/{id}
pub async fn handle_delete_class(
    State(state): State<AppState>,
    Path(class_id): Path<i64>,
) -> AppResult<Redirect> {
    tracing::info!("POST /delete_class/{}", class_id);

    match class_service::delete_class(&state.db_pool, class_id).await {
        Ok(class) => {
            let message = format!("Class \"{}\" has been deleted successfully!", class.name);
            Ok(redirect_with_success(&message))
        }
        Err(AppError::InUse(message)) => Ok(redirect_with_error(&message)),
        Err(AppError::NotFound(_)) => Ok(redirect_with_error("Class not found.")),
        Err(e) => Err(e),
    }
}
