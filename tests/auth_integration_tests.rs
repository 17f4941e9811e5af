use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use risk_portal::{
    AppState,
    auth::{self, AuthUser, Claims, TOKEN_TTL_MINUTES},
    config::{AppConfig, Env},
    models::{
        Class, CounselingSession, Counselor, Faculty, Role, Student, UpdateSessionRequest,
        UserAccount,
    },
    repository::Repository,
    risk::{FinancialStatus, RiskLevel},
};
use std::sync::Arc;
use uuid::Uuid;

// --- Mock Repository for Auth Logic ---

#[derive(Default)]
struct MockAuthRepo {
    account_to_return: Option<UserAccount>,
}

#[async_trait]
impl Repository for MockAuthRepo {
    async fn get_account(&self, _username: &str) -> Option<UserAccount> {
        self.account_to_return.clone()
    }

    // Placeholder implementations for the trait methods the extractor never
    // touches (ensuring they compile).
    async fn create_account(&self, _account: UserAccount) -> bool {
        false
    }
    async fn create_student(&self, _student: Student) -> bool {
        false
    }
    async fn get_students(&self) -> Vec<Student> {
        vec![]
    }
    async fn get_student(&self, _student_id: &str) -> Option<Student> {
        None
    }
    async fn set_student_grade(
        &self,
        _student_id: &str,
        _grade: f64,
        _risk: RiskLevel,
    ) -> Option<Student> {
        None
    }
    async fn set_student_financials(
        &self,
        _student_id: &str,
        _status: FinancialStatus,
        _risk: RiskLevel,
    ) -> Option<Student> {
        None
    }
    async fn create_faculty(&self, _faculty: Faculty) -> bool {
        false
    }
    async fn get_faculty(&self) -> Vec<Faculty> {
        vec![]
    }
    async fn create_counselor(&self, _counselor: Counselor) -> bool {
        false
    }
    async fn get_counselors(&self) -> Vec<Counselor> {
        vec![]
    }
    async fn create_class(&self, _class: Class) -> bool {
        false
    }
    async fn get_classes(&self) -> Vec<Class> {
        vec![]
    }
    async fn get_class(&self, _class_id: &str) -> Option<Class> {
        None
    }
    async fn get_classes_by_faculty(&self, _faculty_id: &str) -> Vec<Class> {
        vec![]
    }
    async fn assign_student(&self, _class_id: &str, _student_id: &str) -> bool {
        false
    }
    async fn get_students_in_class(&self, _class_id: &str) -> Vec<Student> {
        vec![]
    }
    async fn create_session(&self, _session: CounselingSession) -> bool {
        false
    }
    async fn get_sessions_for_student(&self, _student_id: &str) -> Vec<CounselingSession> {
        vec![]
    }
    async fn update_session(
        &self,
        _session_id: Uuid,
        _req: UpdateSessionRequest,
    ) -> Option<CounselingSession> {
        None
    }
}

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USERNAME: &str = "student01";

fn test_account(role: Role) -> UserAccount {
    UserAccount {
        username: TEST_USERNAME.to_string(),
        password_hash: "unused".to_string(),
        role,
    }
}

/// Signs a token whose expiry sits `exp_offset` seconds from now (negative
/// offsets produce an already-expired token).
fn create_token(username: &str, secret: &str, exp_offset: i64) -> String {
    let now = Utc::now().timestamp();

    let claims = Claims {
        sub: username.to_string(),
        role: Role::Student,
        iat: now as usize,
        exp: (now + exp_offset) as usize,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn create_app_state(env: Env, repo: MockAuthRepo, jwt_secret: String) -> AppState {
    let mut config = AppConfig::default();
    config.env = env;
    config.jwt_secret = jwt_secret;

    AppState {
        repo: Arc::new(repo),
        config,
    }
}

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn bearer_parts(token: &str) -> Parts {
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    parts
}

// --- Password Hashing Tests ---

#[test]
fn test_password_hash_roundtrip() {
    let hash = auth::hash_password("hunter2!").unwrap();
    // PHC format, not the plaintext
    assert!(hash.starts_with("$argon2"));
    assert!(auth::verify_password("hunter2!", &hash));
    assert!(!auth::verify_password("hunter3!", &hash));
}

#[test]
fn test_verify_password_rejects_garbage_hash() {
    assert!(!auth::verify_password("whatever", "not-a-phc-hash"));
}

// --- Token Issuance Tests ---

#[test]
fn test_issued_token_carries_fixed_ttl() {
    let token = auth::create_access_token("counselor01", Role::Counselor, TEST_JWT_SECRET).unwrap();

    let key = jsonwebtoken::DecodingKey::from_secret(TEST_JWT_SECRET.as_bytes());
    let data =
        jsonwebtoken::decode::<Claims>(&token, &key, &jsonwebtoken::Validation::default()).unwrap();

    assert_eq!(data.claims.sub, "counselor01");
    assert_eq!(data.claims.role, Role::Counselor);
    assert_eq!(
        data.claims.exp - data.claims.iat,
        (TOKEN_TTL_MINUTES * 60) as usize
    );
}

// --- Extractor Tests ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let token = create_token(TEST_USERNAME, TEST_JWT_SECRET, 3600);

    let mock_repo = MockAuthRepo {
        account_to_return: Some(test_account(Role::Student)),
    };
    let app_state = create_app_state(Env::Production, mock_repo, TEST_JWT_SECRET.to_string());

    let mut parts = bearer_parts(&token);
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_ok());
    let user = auth_user.unwrap();
    assert_eq!(user.username, TEST_USERNAME);
    assert_eq!(user.role, Role::Student);
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let app_state = create_app_state(
        Env::Production,
        MockAuthRepo::default(),
        TEST_JWT_SECRET.to_string(),
    );

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
    assert_eq!(
        auth_user.unwrap_err().status_code(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_auth_failure_with_expired_jwt() {
    // Expired well past the decoder's default leeway.
    let token = create_token(TEST_USERNAME, TEST_JWT_SECRET, -1800);

    let mock_repo = MockAuthRepo {
        account_to_return: Some(test_account(Role::Student)),
    };
    let app_state = create_app_state(Env::Production, mock_repo, TEST_JWT_SECRET.to_string());

    let mut parts = bearer_parts(&token);
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
    assert_eq!(
        auth_user.unwrap_err().status_code(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_auth_failure_with_wrong_signing_secret() {
    let token = create_token(TEST_USERNAME, "some-other-secret-entirely", 3600);

    let mock_repo = MockAuthRepo {
        account_to_return: Some(test_account(Role::Student)),
    };
    let app_state = create_app_state(Env::Production, mock_repo, TEST_JWT_SECRET.to_string());

    let mut parts = bearer_parts(&token);
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
}

#[tokio::test]
async fn test_auth_failure_when_subject_no_longer_exists() {
    // A structurally valid token whose subject was deleted after issuance.
    let token = create_token(TEST_USERNAME, TEST_JWT_SECRET, 3600);

    let app_state = create_app_state(
        Env::Production,
        MockAuthRepo::default(), // no account to return
        TEST_JWT_SECRET.to_string(),
    );

    let mut parts = bearer_parts(&token);
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
    assert_eq!(
        auth_user.unwrap_err().status_code(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_local_bypass_success() {
    let mock_repo = MockAuthRepo {
        account_to_return: Some(UserAccount {
            username: "dev-admin".to_string(),
            password_hash: "unused".to_string(),
            role: Role::Admin,
        }),
    };
    let app_state = create_app_state(Env::Local, mock_repo, TEST_JWT_SECRET.to_string());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static("x-username"),
        header::HeaderValue::from_static("dev-admin"),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_ok());
    let user = auth_user.unwrap();
    assert_eq!(user.username, "dev-admin");
    assert_eq!(user.role, Role::Admin);
}

#[tokio::test]
async fn test_local_bypass_disabled_in_prod() {
    let mock_repo = MockAuthRepo {
        account_to_return: Some(test_account(Role::Admin)),
    };
    let app_state = create_app_state(Env::Production, mock_repo, TEST_JWT_SECRET.to_string());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    // Provide ONLY the local bypass header
    parts.headers.insert(
        header::HeaderName::from_static("x-username"),
        header::HeaderValue::from_static(TEST_USERNAME),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
    assert_eq!(
        auth_user.unwrap_err().status_code(),
        StatusCode::UNAUTHORIZED
    );
}
