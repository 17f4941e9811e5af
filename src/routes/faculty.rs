use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch},
};

/// Faculty Router Module
///
/// Defines the routes for the 'faculty' role: grade maintenance plus
/// read access to owned classes.
///
/// Access Control:
/// The FACULTY_ONLY policy runs in every handler; the roster endpoint adds
/// an ownership predicate (the class's faculty_id must equal the caller's
/// username), so one faculty member cannot read another's roster.
pub fn faculty_routes() -> Router<AppState> {
    Router::new()
        // PATCH /faculty/students/{id}/grade
        // Updates a student's latest grade and recomputes the risk label.
        .route("/students/{id}/grade", patch(handlers::update_grade))
        // GET /faculty/my_classes
        // Classes where the caller is the assigned faculty member.
        .route("/my_classes", get(handlers::get_my_classes))
        // GET /faculty/classes/{id}/students
        // Full student records for one owned class (ownership-checked).
        .route("/classes/{id}/students", get(handlers::get_class_students))
}
