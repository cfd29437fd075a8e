// src/web/mw_auth.rs
use crate::error::AppError;
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

pub const SESSION_USER_ID_KEY: &str = "user_id";

// The authenticated user's id, inserted into request extensions for handlers.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub i64);

/// Gate for everything except /register and /login: without a session the
/// request is redirected to the login page, carrying the originally requested
/// path so login can return the user there.
pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match session.get::<i64>(SESSION_USER_ID_KEY).await {
        Ok(Some(user_id)) => {
            tracing::debug!("Auth MW: user {} authenticated, proceeding.", user_id);
            request.extensions_mut().insert(CurrentUser(user_id));
            Ok(next.run(request).await)
        }
        Ok(None) => {
            let requested = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| "/".to_string());
            tracing::debug!("Auth MW: not authenticated, redirecting to /login (next: {})", requested);
            let login_url = format!("/login?next={}", urlencoding::encode(&requested));
            Ok(Redirect::to(&login_url).into_response())
        }
        Err(e) => {
            tracing::error!("Auth MW: failed to read session: {:?}", e);
            Err(AppError::SessionError(format!("failed to check session: {}", e)))
        }
    }
}

/// Open-redirect protection for the post-login `next` target: only absolute
/// same-origin paths are accepted. "//host" and backslash variants are
/// scheme-relative escapes, not paths.
pub fn is_safe_next(next: &str) -> bool {
    next.starts_with('/') && !next.starts_with("//") && !next.starts_with("/\\")
}

#[cfg(test)]
mod tests {
    use super::is_safe_next;

    #[test]
    fn accepts_same_origin_paths() {
        assert!(is_safe_next("/"));
        assert!(is_safe_next("/classes"));
        assert!(is_safe_next("/attendance/take?class_id=1"));
    }

    #[test]
    fn rejects_external_and_scheme_relative_targets() {
        assert!(!is_safe_next("https://evil.example"));
        assert!(!is_safe_next("//evil.example"));
        assert!(!is_safe_next("/\\evil.example"));
        assert!(!is_safe_next(""));
        assert!(!is_safe_next("evil"));
    }
}
