use crate::models::{
    Class, CounselingSession, Counselor, Faculty, Student, UpdateSessionRequest, UserAccount,
};
use crate::risk::{FinancialStatus, RiskLevel};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, allowing
/// handlers to interact with the data layer without knowing the concrete
/// implementation (Postgres, in-memory mock, etc.).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's asynchronous task
/// boundaries.
///
/// Creation methods return `false` when the row was not inserted (duplicate
/// key or database failure); update methods return the updated row, or
/// `None` when the addressed entity does not exist.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Accounts ---
    async fn get_account(&self, username: &str) -> Option<UserAccount>;
    async fn create_account(&self, account: UserAccount) -> bool;

    // --- Students ---
    async fn create_student(&self, student: Student) -> bool;
    async fn get_students(&self) -> Vec<Student>;
    async fn get_student(&self, student_id: &str) -> Option<Student>;
    // Risk is computed by the caller from the full record so the stored
    // label always matches the stored inputs.
    async fn set_student_grade(
        &self,
        student_id: &str,
        grade: f64,
        risk: RiskLevel,
    ) -> Option<Student>;
    async fn set_student_financials(
        &self,
        student_id: &str,
        status: FinancialStatus,
        risk: RiskLevel,
    ) -> Option<Student>;

    // --- Faculty & Counselors ---
    async fn create_faculty(&self, faculty: Faculty) -> bool;
    async fn get_faculty(&self) -> Vec<Faculty>;
    async fn create_counselor(&self, counselor: Counselor) -> bool;
    async fn get_counselors(&self) -> Vec<Counselor>;

    // --- Classes ---
    async fn create_class(&self, class: Class) -> bool;
    async fn get_classes(&self) -> Vec<Class>;
    async fn get_class(&self, class_id: &str) -> Option<Class>;
    async fn get_classes_by_faculty(&self, faculty_id: &str) -> Vec<Class>;
    // Idempotent set-add: returns true only if a new membership row was
    // inserted; an already-present pair is not an error.
    async fn assign_student(&self, class_id: &str, student_id: &str) -> bool;
    async fn get_students_in_class(&self, class_id: &str) -> Vec<Student>;

    // --- Counseling Sessions ---
    async fn create_session(&self, session: CounselingSession) -> bool;
    async fn get_sessions_for_student(&self, student_id: &str) -> Vec<CounselingSession>;
    async fn update_session(
        &self,
        session_id: Uuid,
        req: UpdateSessionRequest,
    ) -> Option<CounselingSession>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the
/// PostgreSQL database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Shared projection for class rows: the roster is aggregated from the join
// table into a de-duplicated (composite-PK) text array.
const CLASS_SELECT: &str = r#"
    SELECT c.class_id, c.class_name, c.faculty_id,
           COALESCE(
               array_agg(cs.student_id ORDER BY cs.student_id)
                   FILTER (WHERE cs.student_id IS NOT NULL),
               ARRAY[]::TEXT[]
           ) AS student_ids
    FROM classes c
    LEFT JOIN class_students cs ON cs.class_id = c.class_id
"#;

#[async_trait]
impl Repository for PostgresRepository {
    /// get_account
    ///
    /// Retrieves the credential record needed for authentication and for
    /// resolving the caller's current role.
    async fn get_account(&self, username: &str) -> Option<UserAccount> {
        sqlx::query_as::<_, UserAccount>(
            "SELECT username, password_hash, role FROM accounts WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_account error: {:?}", e);
            None
        })
    }

    /// create_account
    ///
    /// Inserts a credential record. Uses `ON CONFLICT DO NOTHING` so a
    /// duplicate username shows up as `rows_affected == 0` rather than a
    /// database error.
    async fn create_account(&self, account: UserAccount) -> bool {
        let result = sqlx::query(
            "INSERT INTO accounts (username, password_hash, role) VALUES ($1, $2, $3)
             ON CONFLICT DO NOTHING",
        )
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(account.role)
        .execute(&self.pool)
        .await;

        match result {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("create_account error: {:?}", e);
                false
            }
        }
    }

    /// create_student
    ///
    /// Inserts a student record, risk label included. The caller has already
    /// run the classifier over the initial field values.
    async fn create_student(&self, student: Student) -> bool {
        let result = sqlx::query(
            "INSERT INTO students
                 (student_id, name, attendance_percentage, latest_grade, financial_status, risk_status)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT DO NOTHING",
        )
        .bind(&student.student_id)
        .bind(&student.name)
        .bind(student.attendance_percentage)
        .bind(student.latest_grade)
        .bind(student.financial_status)
        .bind(student.risk_status)
        .execute(&self.pool)
        .await;

        match result {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("create_student error: {:?}", e);
                false
            }
        }
    }

    async fn get_students(&self) -> Vec<Student> {
        match sqlx::query_as::<_, Student>(
            "SELECT student_id, name, attendance_percentage, latest_grade, financial_status, risk_status
             FROM students ORDER BY student_id",
        )
        .fetch_all(&self.pool)
        .await
        {
            Ok(s) => s,
            Err(e) => {
                tracing::error!("get_students error: {:?}", e);
                vec![]
            }
        }
    }

    async fn get_student(&self, student_id: &str) -> Option<Student> {
        sqlx::query_as::<_, Student>(
            "SELECT student_id, name, attendance_percentage, latest_grade, financial_status, risk_status
             FROM students WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_student error: {:?}", e);
            None
        })
    }

    /// set_student_grade
    ///
    /// Persists a new grade together with the recomputed risk label in a
    /// single write, keeping the derived-field invariant intact.
    async fn set_student_grade(
        &self,
        student_id: &str,
        grade: f64,
        risk: RiskLevel,
    ) -> Option<Student> {
        sqlx::query_as::<_, Student>(
            "UPDATE students SET latest_grade = $2, risk_status = $3
             WHERE student_id = $1
             RETURNING student_id, name, attendance_percentage, latest_grade, financial_status, risk_status",
        )
        .bind(student_id)
        .bind(grade)
        .bind(risk)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("set_student_grade error: {:?}", e);
            None
        })
    }

    /// set_student_financials
    ///
    /// Persists a new financial status together with the recomputed risk
    /// label in a single write.
    async fn set_student_financials(
        &self,
        student_id: &str,
        status: FinancialStatus,
        risk: RiskLevel,
    ) -> Option<Student> {
        sqlx::query_as::<_, Student>(
            "UPDATE students SET financial_status = $2, risk_status = $3
             WHERE student_id = $1
             RETURNING student_id, name, attendance_percentage, latest_grade, financial_status, risk_status",
        )
        .bind(student_id)
        .bind(status)
        .bind(risk)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("set_student_financials error: {:?}", e);
            None
        })
    }

    async fn create_faculty(&self, faculty: Faculty) -> bool {
        let result = sqlx::query(
            "INSERT INTO faculty (faculty_id, name, department) VALUES ($1, $2, $3)
             ON CONFLICT DO NOTHING",
        )
        .bind(&faculty.faculty_id)
        .bind(&faculty.name)
        .bind(&faculty.department)
        .execute(&self.pool)
        .await;

        match result {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("create_faculty error: {:?}", e);
                false
            }
        }
    }

    async fn get_faculty(&self) -> Vec<Faculty> {
        match sqlx::query_as::<_, Faculty>(
            "SELECT faculty_id, name, department FROM faculty ORDER BY faculty_id",
        )
        .fetch_all(&self.pool)
        .await
        {
            Ok(f) => f,
            Err(e) => {
                tracing::error!("get_faculty error: {:?}", e);
                vec![]
            }
        }
    }

    async fn create_counselor(&self, counselor: Counselor) -> bool {
        let result = sqlx::query(
            "INSERT INTO counselors (counselor_id, name, specialization) VALUES ($1, $2, $3)
             ON CONFLICT DO NOTHING",
        )
        .bind(&counselor.counselor_id)
        .bind(&counselor.name)
        .bind(&counselor.specialization)
        .execute(&self.pool)
        .await;

        match result {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("create_counselor error: {:?}", e);
                false
            }
        }
    }

    async fn get_counselors(&self) -> Vec<Counselor> {
        match sqlx::query_as::<_, Counselor>(
            "SELECT counselor_id, name, specialization FROM counselors ORDER BY counselor_id",
        )
        .fetch_all(&self.pool)
        .await
        {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("get_counselors error: {:?}", e);
                vec![]
            }
        }
    }

    /// create_class
    ///
    /// Inserts the class row itself; the roster starts empty and is only
    /// ever modified through `assign_student`.
    async fn create_class(&self, class: Class) -> bool {
        let result = sqlx::query(
            "INSERT INTO classes (class_id, class_name, faculty_id) VALUES ($1, $2, $3)
             ON CONFLICT DO NOTHING",
        )
        .bind(&class.class_id)
        .bind(&class.class_name)
        .bind(&class.faculty_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("create_class error: {:?}", e);
                false
            }
        }
    }

    async fn get_classes(&self) -> Vec<Class> {
        let query = format!("{CLASS_SELECT} GROUP BY c.class_id, c.class_name, c.faculty_id ORDER BY c.class_id");
        match sqlx::query_as::<_, Class>(&query).fetch_all(&self.pool).await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("get_classes error: {:?}", e);
                vec![]
            }
        }
    }

    async fn get_class(&self, class_id: &str) -> Option<Class> {
        let query = format!(
            "{CLASS_SELECT} WHERE c.class_id = $1 GROUP BY c.class_id, c.class_name, c.faculty_id"
        );
        sqlx::query_as::<_, Class>(&query)
            .bind(class_id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_class error: {:?}", e);
                None
            })
    }

    async fn get_classes_by_faculty(&self, faculty_id: &str) -> Vec<Class> {
        let query = format!(
            "{CLASS_SELECT} WHERE c.faculty_id = $1 GROUP BY c.class_id, c.class_name, c.faculty_id ORDER BY c.class_id"
        );
        match sqlx::query_as::<_, Class>(&query)
            .bind(faculty_id)
            .fetch_all(&self.pool)
            .await
        {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("get_classes_by_faculty error: {:?}", e);
                vec![]
            }
        }
    }

    /// assign_student
    ///
    /// Adds a membership row. Uses `ON CONFLICT DO NOTHING` against the
    /// composite primary key, so assigning the same student twice leaves
    /// exactly one entry and is not an error. No existence check on the
    /// student_id: membership of an unknown id is allowed.
    async fn assign_student(&self, class_id: &str, student_id: &str) -> bool {
        let result = sqlx::query(
            "INSERT INTO class_students (class_id, student_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(class_id)
        .bind(student_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("assign_student error: {:?}", e);
                false
            }
        }
    }

    /// get_students_in_class
    ///
    /// Resolves the roster to full student records. Assigned ids with no
    /// matching student record are silently absent from the result.
    async fn get_students_in_class(&self, class_id: &str) -> Vec<Student> {
        match sqlx::query_as::<_, Student>(
            "SELECT s.student_id, s.name, s.attendance_percentage, s.latest_grade, s.financial_status, s.risk_status
             FROM students s
             JOIN class_students cs ON cs.student_id = s.student_id
             WHERE cs.class_id = $1
             ORDER BY s.student_id",
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await
        {
            Ok(s) => s,
            Err(e) => {
                tracing::error!("get_students_in_class error: {:?}", e);
                vec![]
            }
        }
    }

    async fn create_session(&self, session: CounselingSession) -> bool {
        let result = sqlx::query(
            "INSERT INTO counseling_sessions
                 (session_id, student_id, initiator_id, session_date, notes, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT DO NOTHING",
        )
        .bind(session.session_id)
        .bind(&session.student_id)
        .bind(&session.initiator_id)
        .bind(session.session_date)
        .bind(&session.notes)
        .bind(session.status)
        .execute(&self.pool)
        .await;

        match result {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("create_session error: {:?}", e);
                false
            }
        }
    }

    async fn get_sessions_for_student(&self, student_id: &str) -> Vec<CounselingSession> {
        match sqlx::query_as::<_, CounselingSession>(
            "SELECT session_id, student_id, initiator_id, session_date, notes, status
             FROM counseling_sessions
             WHERE student_id = $1
             ORDER BY session_date DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        {
            Ok(s) => s,
            Err(e) => {
                tracing::error!("get_sessions_for_student error: {:?}", e);
                vec![]
            }
        }
    }

    /// update_session
    ///
    /// Partial update via `COALESCE`: only the fields present in the request
    /// change. Returns the updated row, or None when the session does not
    /// exist.
    async fn update_session(
        &self,
        session_id: Uuid,
        req: UpdateSessionRequest,
    ) -> Option<CounselingSession> {
        sqlx::query_as::<_, CounselingSession>(
            "UPDATE counseling_sessions
             SET notes = COALESCE($2, notes),
                 status = COALESCE($3, status)
             WHERE session_id = $1
             RETURNING session_id, student_id, initiator_id, session_date, notes, status",
        )
        .bind(session_id)
        .bind(req.notes)
        .bind(req.status)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("update_session error: {:?}", e);
            None
        })
    }
}
