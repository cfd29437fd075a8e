// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{LoginForm, RegisterForm},
    services::{auth_service, user_service},
    state::AppState,
    templates::{LoginPage, RegisterPage},
    web::mw_auth::{self, SESSION_USER_ID_KEY},
};
use askama::Template;
use axum::{
    extract::{Form, Query, State},
    response::{Html, IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;

#[derive(Deserialize, Debug)]
pub struct LoginQuery {
    pub next: Option<String>,
    pub info: Option<String>,
}

async fn already_logged_in(session: &Session) -> bool {
    session
        .get::<i64>(SESSION_USER_ID_KEY)
        .await
        .ok()
        .flatten()
        .is_some()
}

// Discards a client-supplied next target unless it is a same-origin path.
fn sanitize_next(next: Option<String>) -> Option<String> {
    next.filter(|n| mw_auth::is_safe_next(n))
}

// GET /register
pub async fn show_register_form(session: Session) -> AppResult<impl IntoResponse> {
    if already_logged_in(&session).await {
        return Ok(Redirect::to("/home").into_response());
    }
    let template = RegisterPage {
        error: None,
        username: String::new(),
    };
    Ok(Html(template.render()?).into_response())
}

// POST /register
pub async fn handle_register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> AppResult<impl IntoResponse> {
    if already_logged_in(&session).await {
        return Ok(Redirect::to("/home").into_response());
    }

    let username = form.username.trim().to_string();
    tracing::info!("Registration attempt for username: {}", username);

    let validation_error = if username.len() < 4 || username.len() > 25 {
        Some("Username must be between 4 and 25 characters.".to_string())
    } else if form.password.len() < 6 {
        Some("Password must be at least 6 characters.".to_string())
    } else if form.password != form.confirm_password {
        Some("Passwords must match.".to_string())
    } else {
        None
    };

    if let Some(message) = validation_error {
        tracing::warn!("Registration rejected for '{}': {}", username, message);
        let template = RegisterPage {
            error: Some(message),
            username,
        };
        return Ok(Html(template.render()?).into_response());
    }

    match user_service::create_user(&state.db_pool, &username, &form.password).await {
        Ok(_) => {
            let info = urlencoding::encode(
                "Your account has been created! You are now able to log in.",
            )
            .into_owned();
            Ok(Redirect::to(&format!("/login?info={}", info)).into_response())
        }
        Err(AppError::Conflict(message)) => {
            let template = RegisterPage {
                error: Some(message),
                username,
            };
            Ok(Html(template.render()?).into_response())
        }
        Err(e) => Err(e),
    }
}

// GET /login
pub async fn show_login_form(
    session: Session,
    Query(params): Query<LoginQuery>,
) -> AppResult<impl IntoResponse> {
    if already_logged_in(&session).await {
        tracing::debug!("GET /login: already logged in, redirecting to /home");
        return Ok(Redirect::to("/home").into_response());
    }

    let template = LoginPage {
        error: None,
        info: params.info,
        next: sanitize_next(params.next),
    };
    Ok(Html(template.render()?).into_response())
}

// POST /login
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<impl IntoResponse> {
    tracing::info!("Login attempt for username: {}", form.username);
    let next = sanitize_next(form.next.clone());

    if let Some(user) = user_service::find_user_by_username(&state.db_pool, &form.username).await? {
        if auth_service::verify_password(&form.password, &user.password_hash).await? {
            // A fresh session id on login blocks session fixation.
            session
                .cycle_id()
                .await
                .map_err(|e| AppError::SessionError(format!("failed to cycle session id: {}", e)))?;
            session
                .insert(SESSION_USER_ID_KEY, user.id)
                .await
                .map_err(|e| AppError::SessionError(format!("failed to store login: {}", e)))?;

            tracing::info!("Login successful for: {}", user.username);
            let target = next.unwrap_or_else(|| {
                format!("/home?success={}", urlencoding::encode("Login Successful!"))
            });
            return Ok(Redirect::to(&target).into_response());
        }
    }

    // Deliberately generic: don't reveal whether the username or the
    // password was wrong.
    tracing::warn!("Login failed for username: {}", form.username);
    let template = LoginPage {
        error: Some("Login Unsuccessful. Please check username and password.".to_string()),
        info: None,
        next,
    };
    Ok(Html(template.render()?).into_response())
}

// GET /logout
pub async fn handle_logout(session: Session) -> AppResult<Redirect> {
    let user_id: Option<i64> = session.get(SESSION_USER_ID_KEY).await.ok().flatten();

    session
        .delete()
        .await
        .map_err(|e| AppError::SessionError(format!("failed to delete session: {}", e)))?;

    if let Some(id) = user_id {
        tracing::info!("User {} logged out.", id);
    }

    let info = urlencoding::encode("You have been logged out.").into_owned();
    Ok(Redirect::to(&format!("/login?info={}", info)))
}
