use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Authenticated Router Module
///
/// Defines the routes shared by several roles, protected by the `AuthUser`
/// extractor middleware on the layer above this module. Which roles may
/// invoke each operation is decided by the per-operation policy inside the
/// handler (STAFF for the student listing, STUDENT_ONLY for /students/me,
/// counselor-centric policies for the session endpoints).
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /students
        // Lists all student records; admin, faculty, and counselor roles.
        .route("/students", get(handlers::get_students))
        // GET /students/me
        // A student's own record, matched by username = student_id.
        .route("/students/me", get(handlers::get_my_record))
        // POST /sessions
        // Opens a counseling session; counselors only.
        .route("/sessions", post(handlers::create_session))
        // GET /sessions/student/{id}
        // Session history for one student; counselors and admins.
        .route(
            "/sessions/student/{id}",
            get(handlers::get_student_sessions),
        )
        // PATCH /sessions/{id}
        // Updates notes and/or closes a session; counselors only.
        .route("/sessions/{id}", patch(handlers::update_session))
}
