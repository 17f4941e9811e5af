use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::risk::{FinancialStatus, RiskLevel};

// --- Core Application Schemas (Mapped to Database) ---

/// Role
///
/// The RBAC field carried by every account. Serialized lowercase on the wire
/// ("admin", "faculty", ...) and stored the same way in the `accounts` table.
/// A role is immutable after account creation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Faculty,
    Counselor,
    #[default]
    Student,
}

/// UserAccount
///
/// The credential record stored in the `accounts` table. The username is the
/// canonical identity across all roles; for non-admin roles it doubles as the
/// faculty_id / counselor_id / student_id of the linked record.
///
/// Deliberately not `Serialize`: the password hash must never leave the
/// process.
#[derive(Debug, Clone, FromRow)]
pub struct UserAccount {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// Student
///
/// A tracked student record from the `students` table. `risk_status` is
/// derived: it always equals `risk::classify` applied to the other three
/// tracked fields, recomputed on every write that touches one of them.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Student {
    pub student_id: String,
    pub name: String,
    pub attendance_percentage: f64,
    pub latest_grade: f64,
    pub financial_status: FinancialStatus,
    pub risk_status: RiskLevel,
}

/// Faculty
///
/// A faculty record. `faculty_id` is the account username.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Faculty {
    pub faculty_id: String,
    pub name: String,
    pub department: String,
}

/// Counselor
///
/// A counselor record. `counselor_id` is the account username.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Counselor {
    pub counselor_id: String,
    pub name: String,
    pub specialization: String,
}

/// Class
///
/// A class with its assigned faculty member and de-duplicated student
/// roster. The roster is aggregated from the `class_students` join table;
/// membership of a student_id with no matching student record is allowed.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Class {
    pub class_id: String,
    pub class_name: String,
    pub faculty_id: String,
    pub student_ids: Vec<String>,
}

/// SessionStatus
///
/// Lifecycle state of a counseling session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[ts(export)]
pub enum SessionStatus {
    #[default]
    Open,
    Closed,
}

/// CounselingSession
///
/// A record of a counselor-student interaction. `initiator_id` is the
/// username of the counselor who opened the session.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct CounselingSession {
    pub session_id: Uuid,
    pub student_id: String,
    pub initiator_id: String,
    #[ts(type = "string")]
    pub session_date: DateTime<Utc>,
    pub notes: String,
    pub status: SessionStatus,
}

/// --- Request Payloads (Input Schemas) ---

/// LoginRequest
///
/// Input payload for the token endpoint (POST /token).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// TokenResponse
///
/// Output of a successful login: the signed bearer token plus the resolved
/// role, so clients can route to the right surface without decoding the JWT.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user_role: Role,
}

/// CreateStudentRequest
///
/// Input payload for POST /admin/create_student. Creates the linked account
/// (role=student) and the student record in one operation; the initial risk
/// label is computed from the three tracked fields at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateStudentRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    pub student_id: String,
    pub initial_attendance: f64,
    pub initial_grade: f64,
    pub financial_status: FinancialStatus,
}

/// CreateFacultyRequest
///
/// Input payload for POST /admin/create_faculty. The username becomes the
/// faculty_id of the created record.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateFacultyRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    pub department: String,
}

/// CreateCounselorRequest
///
/// Input payload for POST /admin/create_counselor. The username becomes the
/// counselor_id of the created record.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCounselorRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    pub specialization: String,
}

/// CreateClassRequest
///
/// Input payload for POST /admin/classes. The roster starts empty; students
/// are added through the assign_student endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateClassRequest {
    pub class_id: String,
    pub class_name: String,
    pub faculty_id: String,
}

/// AssignStudentRequest
///
/// Input payload for POST /admin/classes/{id}/assign_student.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AssignStudentRequest {
    pub student_id: String,
}

/// UpdateGradeRequest
///
/// Input payload for PATCH /faculty/students/{id}/grade.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateGradeRequest {
    pub latest_grade: f64,
}

/// UpdateFinancialsRequest
///
/// Input payload for PATCH /admin/students/{id}/financials.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateFinancialsRequest {
    pub financial_status: FinancialStatus,
}

/// CreateSessionRequest
///
/// Input payload for POST /sessions. The session is created with status
/// Open and the caller recorded as initiator.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateSessionRequest {
    pub student_id: String,
    #[ts(type = "string")]
    pub session_date: DateTime<Utc>,
    pub notes: String,
}

/// UpdateSessionRequest
///
/// Partial update payload for PATCH /sessions/{id}. Uses `Option<T>` fields
/// so a counselor can update the notes, close the session, or both, without
/// resending the unchanged field.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateSessionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionStatus>,
}

/// MessageResponse
///
/// Plain acknowledgment body returned by the admin creation endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}
