// src/web/routes.rs
use crate::{
    state::AppState,
    web::{
        attendance_handlers, auth_handlers, class_handlers, home_handlers, mw_auth,
        student_handlers,
    },
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub fn create_router(app_state: AppState) -> Router {
    // --- Public routes ---
    let public_routes = Router::new()
        .route(
            "/register",
            get(auth_handlers::show_register_form).post(auth_handlers::handle_register),
        )
        .route(
            "/login",
            get(auth_handlers::show_login_form).post(auth_handlers::handle_login),
        );

    // --- Attendance workflow ---
    let attendance_routes = Router::new()
        .route(
            "/take",
            get(attendance_handlers::take_attendance_page)
                .post(attendance_handlers::handle_take_attendance),
        )
        .route(
            "/view",
            get(attendance_handlers::view_attendance_page)
                .post(attendance_handlers::handle_view_attendance),
        );

    // --- Authenticated routes ---
    // Everything here requires a logged-in session; require_auth redirects
    // to /login (preserving the requested path) otherwise.
    let authenticated_routes = Router::new()
        .route("/", get(home_handlers::home_page_handler))
        .route("/home", get(home_handlers::home_page_handler))
        .route("/logout", get(auth_handlers::handle_logout))
        .route("/classes", get(class_handlers::classes_page))
        .route(
            "/add_class",
            get(class_handlers::show_add_class_form).post(class_handlers::handle_add_class),
        )
        .route(
            "/edit_class/{id}",
            get(class_handlers::show_edit_class_form).post(class_handlers::handle_edit_class),
        )
        .route("/delete_class/{id}", post(class_handlers::handle_delete_class))
        .route("/students", get(student_handlers::students_page))
        .route(
            "/add_student",
            get(student_handlers::show_add_student_form).post(student_handlers::handle_add_student),
        )
        .route(
            "/edit_student/{id}",
            get(student_handlers::show_edit_student_form)
                .post(student_handlers::handle_edit_student),
        )
        .route(
            "/delete_student/{id}",
            post(student_handlers::handle_delete_student),
        )
        .nest("/attendance", attendance_routes)
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .with_state(app_state)
}
