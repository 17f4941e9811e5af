use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Admin Router Module
///
/// Defines the routes exclusively accessible to users with the 'admin'
/// role: account provisioning for every role, directory listings, class
/// management, and the financial-status side of student maintenance.
///
/// Access Control:
/// Each handler resolves the caller via the `AuthUser` extractor and then
/// evaluates the ADMIN_ONLY policy before its body runs.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /admin/create_student
        // Creates the linked account (role=student) and the student record;
        // the initial risk label is computed at creation.
        .route("/create_student", post(handlers::create_student))
        // POST /admin/create_faculty
        // Creates the linked account (role=faculty) and the faculty record.
        .route("/create_faculty", post(handlers::create_faculty))
        // POST /admin/create_counselor
        // Creates the linked account (role=counselor) and the counselor record.
        .route("/create_counselor", post(handlers::create_counselor))
        // GET /admin/faculty
        // Directory listing of all faculty records.
        .route("/faculty", get(handlers::get_all_faculty))
        // GET /admin/counselors
        // Directory listing of all counselor records.
        .route("/counselors", get(handlers::get_all_counselors))
        // GET /admin/classes + POST /admin/classes
        // Class directory and class creation.
        .route(
            "/classes",
            get(handlers::get_all_classes).post(handlers::create_class),
        )
        // POST /admin/classes/{id}/assign_student
        // Idempotent set-add of a student to a class roster.
        .route(
            "/classes/{id}/assign_student",
            post(handlers::assign_student_to_class),
        )
        // PATCH /admin/students/{id}/financials
        // Updates financial status and recomputes the risk label.
        .route(
            "/students/{id}/financials",
            patch(handlers::update_financial_status),
        )
}
