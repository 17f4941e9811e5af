use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// ApiError
///
/// The complete failure taxonomy of the API. Every error is request-local
/// and maps to exactly one synchronous response: there are no retries and no
/// partial-failure recovery paths.
///
/// The JSON body shape is `{"detail": "..."}` for every variant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Bad credentials or a bad/expired/unresolvable token (401).
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Authenticated, but the role allow-list or an ownership predicate
    /// rejected the caller (403).
    #[error("{0}")]
    Forbidden(&'static str),

    /// The addressed entity does not exist (404).
    #[error("{0}")]
    NotFound(&'static str),

    /// A uniqueness constraint (username, student_id, class_id) would be
    /// violated (409). Carries the offending identifier.
    #[error("{0}")]
    Conflict(String),
}

impl ApiError {
    /// Duplicate-username conflict with the identifier in the message.
    pub fn duplicate_username(username: &str) -> Self {
        ApiError::Conflict(format!("User '{username}' already exists"))
    }

    /// Duplicate-student_id conflict with the identifier in the message.
    pub fn duplicate_student_id(student_id: &str) -> Self {
        ApiError::Conflict(format!("Student ID '{student_id}' already exists"))
    }

    /// Duplicate-class_id conflict with the identifier in the message.
    pub fn duplicate_class_id(class_id: &str) -> Self {
        ApiError::Conflict(format!("Class ID '{class_id}' already exists"))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}
