// src/web/home_handlers.rs
use crate::{
    error::{AppError, AppResult},
    services::user_service,
    state::AppState,
    templates::HomePage,
    web::{class_handlers::FeedbackParams, mw_auth::CurrentUser},
};
use askama::Template;
use axum::{
    extract::{Extension, Query, State},
    response::{Html, IntoResponse},
};

// GET / and GET /home (behind require_auth)
pub async fn home_page_handler(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(params): Query<FeedbackParams>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user.0;

    let user = user_service::find_user_by_id(&state.db_pool, user_id)
        .await?
        .ok_or_else(|| {
            // The session referenced an account that no longer exists.
            tracing::error!("Authenticated user id {} not found in the database!", user_id);
            AppError::InternalServerError
        })?;

    let template = HomePage {
        username: user.username,
        success_message: params.success,
    };
    Ok(Html(template.render()?))
}
