use crate::{
    AppState,
    auth::{self, AuthUser},
    error::ApiError,
    models::{
        AssignStudentRequest, Class, CounselingSession, Counselor, CreateClassRequest,
        CreateCounselorRequest, CreateFacultyRequest, CreateSessionRequest, CreateStudentRequest,
        Faculty, LoginRequest, MessageResponse, Role, SessionStatus, Student, TokenResponse,
        UpdateFinancialsRequest, UpdateGradeRequest, UpdateSessionRequest, UserAccount,
    },
    policy,
    risk::classify,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

// --- Authentication ---

/// login
///
/// [Public Route] Exchanges username+password for a signed bearer token.
/// Unknown usernames and password mismatches collapse into the same 401 so
/// the endpoint does not reveal which usernames exist.
#[utoipa::path(
    post,
    path = "/token",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Incorrect username or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let account = state
        .repo
        .get_account(&payload.username)
        .await
        .ok_or(ApiError::Unauthorized("Incorrect username or password"))?;

    if !auth::verify_password(&payload.password, &account.password_hash) {
        return Err(ApiError::Unauthorized("Incorrect username or password"));
    }

    let access_token =
        auth::create_access_token(&account.username, account.role, &state.config.jwt_secret)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        user_role: account.role,
    }))
}

// --- Admin: User Creation ---

/// create_account_entry
///
/// Shared account-creation step for the three admin creation endpoints:
/// hashes the password and inserts the credential record, surfacing a
/// duplicate username as a 409.
async fn create_account_entry(
    state: &AppState,
    username: &str,
    password: &str,
    role: Role,
) -> Result<(), ApiError> {
    if state.repo.get_account(username).await.is_some() {
        return Err(ApiError::duplicate_username(username));
    }
    let password_hash = auth::hash_password(password)?;
    let inserted = state
        .repo
        .create_account(UserAccount {
            username: username.to_string(),
            password_hash,
            role,
        })
        .await;
    if !inserted {
        // Lost a race with a concurrent insert, or the write failed.
        return Err(ApiError::duplicate_username(username));
    }
    Ok(())
}

/// create_student
///
/// [Admin Route] Creates a linked account (role=student) plus the student
/// record. Both uniqueness constraints (username, student_id) are validated
/// before either insert so a conflict leaves no partial state. The initial
/// risk label is computed here from the three tracked fields.
#[utoipa::path(
    post,
    path = "/admin/create_student",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student created", body = MessageResponse),
        (status = 403, description = "Not an admin"),
        (status = 409, description = "Duplicate username or student ID")
    )
)]
pub async fn create_student(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateStudentRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    policy::ADMIN_ONLY.authorize(&user)?;

    if state.repo.get_student(&payload.student_id).await.is_some() {
        return Err(ApiError::duplicate_student_id(&payload.student_id));
    }
    create_account_entry(&state, &payload.username, &payload.password, Role::Student).await?;

    let risk_status = classify(
        payload.initial_attendance,
        payload.initial_grade,
        payload.financial_status,
    );
    let inserted = state
        .repo
        .create_student(Student {
            student_id: payload.student_id.clone(),
            name: payload.name,
            attendance_percentage: payload.initial_attendance,
            latest_grade: payload.initial_grade,
            financial_status: payload.financial_status,
            risk_status,
        })
        .await;
    if !inserted {
        return Err(ApiError::duplicate_student_id(&payload.student_id));
    }

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Student created successfully".to_string(),
        }),
    ))
}

/// create_faculty
///
/// [Admin Route] Creates a linked account (role=faculty) plus the faculty
/// record; the username becomes the faculty_id.
#[utoipa::path(
    post,
    path = "/admin/create_faculty",
    request_body = CreateFacultyRequest,
    responses(
        (status = 201, description = "Faculty created", body = MessageResponse),
        (status = 403, description = "Not an admin"),
        (status = 409, description = "Duplicate username")
    )
)]
pub async fn create_faculty(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateFacultyRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    policy::ADMIN_ONLY.authorize(&user)?;

    create_account_entry(&state, &payload.username, &payload.password, Role::Faculty).await?;
    state
        .repo
        .create_faculty(Faculty {
            faculty_id: payload.username,
            name: payload.name,
            department: payload.department,
        })
        .await;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Faculty created successfully".to_string(),
        }),
    ))
}

/// create_counselor
///
/// [Admin Route] Creates a linked account (role=counselor) plus the
/// counselor record; the username becomes the counselor_id.
#[utoipa::path(
    post,
    path = "/admin/create_counselor",
    request_body = CreateCounselorRequest,
    responses(
        (status = 201, description = "Counselor created", body = MessageResponse),
        (status = 403, description = "Not an admin"),
        (status = 409, description = "Duplicate username")
    )
)]
pub async fn create_counselor(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCounselorRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    policy::ADMIN_ONLY.authorize(&user)?;

    create_account_entry(&state, &payload.username, &payload.password, Role::Counselor).await?;
    state
        .repo
        .create_counselor(Counselor {
            counselor_id: payload.username,
            name: payload.name,
            specialization: payload.specialization,
        })
        .await;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Counselor created successfully".to_string(),
        }),
    ))
}

// --- Admin: Data Retrieval & Student Maintenance ---

/// get_all_faculty
///
/// [Admin Route] Lists all faculty records.
#[utoipa::path(
    get,
    path = "/admin/faculty",
    responses((status = 200, description = "All faculty", body = [Faculty]))
)]
pub async fn get_all_faculty(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Faculty>>, ApiError> {
    policy::ADMIN_ONLY.authorize(&user)?;
    Ok(Json(state.repo.get_faculty().await))
}

/// get_all_counselors
///
/// [Admin Route] Lists all counselor records.
#[utoipa::path(
    get,
    path = "/admin/counselors",
    responses((status = 200, description = "All counselors", body = [Counselor]))
)]
pub async fn get_all_counselors(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Counselor>>, ApiError> {
    policy::ADMIN_ONLY.authorize(&user)?;
    Ok(Json(state.repo.get_counselors().await))
}

/// get_all_classes
///
/// [Admin Route] Lists all classes with their aggregated rosters.
#[utoipa::path(
    get,
    path = "/admin/classes",
    responses((status = 200, description = "All classes", body = [Class]))
)]
pub async fn get_all_classes(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Class>>, ApiError> {
    policy::ADMIN_ONLY.authorize(&user)?;
    Ok(Json(state.repo.get_classes().await))
}

/// update_financial_status
///
/// [Admin Route] Updates a student's financial status and recomputes the
/// risk label from the stored attendance/grade plus the new status, so the
/// derived-field invariant holds after the write.
#[utoipa::path(
    patch,
    path = "/admin/students/{id}/financials",
    request_body = UpdateFinancialsRequest,
    responses(
        (status = 200, description = "Updated student", body = Student),
        (status = 404, description = "Student not found")
    )
)]
pub async fn update_financial_status(
    user: AuthUser,
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Json(payload): Json<UpdateFinancialsRequest>,
) -> Result<Json<Student>, ApiError> {
    policy::ADMIN_ONLY.authorize(&user)?;

    let student = state
        .repo
        .get_student(&student_id)
        .await
        .ok_or(ApiError::NotFound("Student not found"))?;

    let risk = classify(
        student.attendance_percentage,
        student.latest_grade,
        payload.financial_status,
    );
    state
        .repo
        .set_student_financials(&student_id, payload.financial_status, risk)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("Student not found"))
}

/// create_class
///
/// [Admin Route] Creates a class with an empty roster.
#[utoipa::path(
    post,
    path = "/admin/classes",
    request_body = CreateClassRequest,
    responses(
        (status = 201, description = "Class created", body = Class),
        (status = 409, description = "Duplicate class ID")
    )
)]
pub async fn create_class(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateClassRequest>,
) -> Result<(StatusCode, Json<Class>), ApiError> {
    policy::ADMIN_ONLY.authorize(&user)?;

    let class = Class {
        class_id: payload.class_id,
        class_name: payload.class_name,
        faculty_id: payload.faculty_id,
        student_ids: vec![],
    };
    if !state.repo.create_class(class.clone()).await {
        return Err(ApiError::duplicate_class_id(&class.class_id));
    }
    Ok((StatusCode::CREATED, Json(class)))
}

/// assign_student_to_class
///
/// [Admin Route] Idempotent set-add of a student to a class roster.
/// Assigning the same student twice leaves exactly one entry and still
/// succeeds. The student_id is not checked for existence (the roster may
/// reference ids with no student record); the class must exist.
#[utoipa::path(
    post,
    path = "/admin/classes/{id}/assign_student",
    request_body = AssignStudentRequest,
    responses(
        (status = 200, description = "Updated class", body = Class),
        (status = 404, description = "Class not found")
    )
)]
pub async fn assign_student_to_class(
    user: AuthUser,
    State(state): State<AppState>,
    Path(class_id): Path<String>,
    Json(payload): Json<AssignStudentRequest>,
) -> Result<Json<Class>, ApiError> {
    policy::ADMIN_ONLY.authorize(&user)?;

    if state.repo.get_class(&class_id).await.is_none() {
        return Err(ApiError::NotFound("Class not found"));
    }
    // The result is deliberately ignored: an already-present membership row
    // is success, not an error.
    state.repo.assign_student(&class_id, &payload.student_id).await;

    state
        .repo
        .get_class(&class_id)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("Class not found"))
}

// --- Faculty ---

/// update_grade
///
/// [Faculty Route] Updates a student's latest grade and recomputes the risk
/// label from the stored attendance/financial status plus the new grade.
#[utoipa::path(
    patch,
    path = "/faculty/students/{id}/grade",
    request_body = UpdateGradeRequest,
    responses(
        (status = 200, description = "Updated student", body = Student),
        (status = 404, description = "Student not found")
    )
)]
pub async fn update_grade(
    user: AuthUser,
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Json(payload): Json<UpdateGradeRequest>,
) -> Result<Json<Student>, ApiError> {
    policy::FACULTY_ONLY.authorize(&user)?;

    let student = state
        .repo
        .get_student(&student_id)
        .await
        .ok_or(ApiError::NotFound("Student not found"))?;

    let risk = classify(
        student.attendance_percentage,
        payload.latest_grade,
        student.financial_status,
    );
    state
        .repo
        .set_student_grade(&student_id, payload.latest_grade, risk)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("Student not found"))
}

/// get_my_classes
///
/// [Faculty Route] Lists the classes where the caller is the assigned
/// faculty member. Ownership is implicit in the query: the caller's
/// username IS the faculty_id filter.
#[utoipa::path(
    get,
    path = "/faculty/my_classes",
    responses((status = 200, description = "Owned classes", body = [Class]))
)]
pub async fn get_my_classes(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Class>>, ApiError> {
    policy::FACULTY_ONLY.authorize(&user)?;
    Ok(Json(state.repo.get_classes_by_faculty(&user.username).await))
}

/// get_class_students
///
/// [Faculty Route] Resolves one owned class's roster to full student
/// records. A faculty member requesting another faculty's class is rejected
/// with 403 by the ownership predicate.
#[utoipa::path(
    get,
    path = "/faculty/classes/{id}/students",
    responses(
        (status = 200, description = "Roster", body = [Student]),
        (status = 403, description = "Not the assigned faculty member"),
        (status = 404, description = "Class not found")
    )
)]
pub async fn get_class_students(
    user: AuthUser,
    State(state): State<AppState>,
    Path(class_id): Path<String>,
) -> Result<Json<Vec<Student>>, ApiError> {
    policy::FACULTY_ONLY.authorize(&user)?;

    let class = state
        .repo
        .get_class(&class_id)
        .await
        .ok_or(ApiError::NotFound("Class not found"))?;
    policy::require_ownership(class.faculty_id == user.username)?;

    Ok(Json(state.repo.get_students_in_class(&class_id).await))
}

// --- Students ---

/// get_students
///
/// [Staff Route] Lists all student records, risk labels included. Open to
/// admin, faculty, and counselor roles; students use /students/me instead.
#[utoipa::path(
    get,
    path = "/students",
    responses((status = 200, description = "All students", body = [Student]))
)]
pub async fn get_students(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Student>>, ApiError> {
    policy::STAFF.authorize(&user)?;
    Ok(Json(state.repo.get_students().await))
}

/// get_my_record
///
/// [Student Route] A student's view of its own record, matched by
/// username = student_id. 404 when the account has no student record.
#[utoipa::path(
    get,
    path = "/students/me",
    responses(
        (status = 200, description = "Own record", body = Student),
        (status = 404, description = "No student record for this account")
    )
)]
pub async fn get_my_record(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Student>, ApiError> {
    policy::STUDENT_ONLY.authorize(&user)?;

    state
        .repo
        .get_student(&user.username)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("Student data not found for this user"))
}

// --- Counseling Sessions ---

/// create_session
///
/// [Counselor Route] Opens a counseling session for a student. The caller
/// is recorded as initiator and the session starts in status Open.
#[utoipa::path(
    post,
    path = "/sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session opened", body = CounselingSession),
        (status = 404, description = "Student not found")
    )
)]
pub async fn create_session(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<CounselingSession>), ApiError> {
    policy::COUNSELOR_ONLY.authorize(&user)?;

    if state.repo.get_student(&payload.student_id).await.is_none() {
        return Err(ApiError::NotFound("Student not found"));
    }

    let session = CounselingSession {
        session_id: Uuid::new_v4(),
        student_id: payload.student_id,
        initiator_id: user.username,
        session_date: payload.session_date,
        notes: payload.notes,
        status: SessionStatus::Open,
    };
    state.repo.create_session(session.clone()).await;

    Ok((StatusCode::CREATED, Json(session)))
}

/// get_student_sessions
///
/// [Counselor/Admin Route] Lists the counseling sessions recorded for a
/// student, newest first.
#[utoipa::path(
    get,
    path = "/sessions/student/{id}",
    responses((status = 200, description = "Sessions", body = [CounselingSession]))
)]
pub async fn get_student_sessions(
    user: AuthUser,
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<CounselingSession>>, ApiError> {
    policy::SESSION_READERS.authorize(&user)?;
    Ok(Json(state.repo.get_sessions_for_student(&student_id).await))
}

/// update_session
///
/// [Counselor Route] Partial update of a session: new notes, a status
/// change (Open -> Closed or back), or both.
#[utoipa::path(
    patch,
    path = "/sessions/{id}",
    request_body = UpdateSessionRequest,
    responses(
        (status = 200, description = "Updated session", body = CounselingSession),
        (status = 404, description = "Session not found")
    )
)]
pub async fn update_session(
    user: AuthUser,
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<UpdateSessionRequest>,
) -> Result<Json<CounselingSession>, ApiError> {
    policy::COUNSELOR_ONLY.authorize(&user)?;

    state
        .repo
        .update_session(session_id, payload)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("Session not found"))
}
