use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod repository;
pub mod risk;

// Module for routing segregation (Public, Authenticated, Admin, Faculty).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, faculty, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the application entry point.
pub use config::AppConfig;
pub use error::ApiError;
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the
/// application by aggregating every `#[utoipa::path]` handler and every
/// `ToSchema` model. The resulting JSON is served at
/// `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login,
        handlers::create_student, handlers::create_faculty, handlers::create_counselor,
        handlers::get_all_faculty, handlers::get_all_counselors, handlers::get_all_classes,
        handlers::update_financial_status, handlers::create_class,
        handlers::assign_student_to_class,
        handlers::update_grade, handlers::get_my_classes, handlers::get_class_students,
        handlers::get_students, handlers::get_my_record,
        handlers::create_session, handlers::get_student_sessions, handlers::update_session,
    ),
    components(
        schemas(
            models::Role, models::Student, models::Faculty, models::Counselor, models::Class,
            models::SessionStatus, models::CounselingSession,
            models::LoginRequest, models::TokenResponse,
            models::CreateStudentRequest, models::CreateFacultyRequest,
            models::CreateCounselorRequest, models::CreateClassRequest,
            models::AssignStudentRequest, models::UpdateGradeRequest,
            models::UpdateFinancialsRequest, models::CreateSessionRequest,
            models::UpdateSessionRequest, models::MessageResponse,
            risk::FinancialStatus, risk::RiskLevel,
        )
    ),
    tags(
        (name = "risk-portal", description = "Student Drop-out Risk Tracking API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding all application
/// services and configuration, shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: abstracts database access via the PgPool connection.
    pub repo: RepositoryState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These implementations allow extractors (notably AuthUser) to selectively
// pull components from the shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces authentication for the routers it is layered on. It attempts to
/// extract `AuthUser` from the request; if authentication (JWT validation,
/// account lookup) fails, the extractor rejects the request with 401 before
/// the handler runs. Role checks remain per-operation policies inside the
/// handlers.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and
/// scoped middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no middleware applied.
        .merge(public::public_routes())
        // Shared authenticated routes (students, sessions): protected by
        // the auth middleware; per-operation role policies run inside the
        // handlers.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Admin routes: nested under '/admin'. The ADMIN_ONLY policy is
        // evaluated inside each handler after authentication.
        .nest("/admin", admin::admin_routes())
        // Faculty routes: nested under '/faculty'; FACULTY_ONLY policy plus
        // per-class ownership checks inside the handlers.
        .nest("/faculty", faculty::faculty_routes())
        // Apply the unified state to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID generation: a unique UUID per incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request tracing: wraps the request/response lifecycle
                // in a span correlated by the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID propagation: returns the x-request-id
                // header to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS layer.
        .layer(cors)
}

/// trace_span_logger
///
/// Helper used by `TraceLayer` to customize span creation: extracts the
/// `x-request-id` header (if present) and includes it in the structured
/// logging metadata alongside the HTTP method and URI, so every log line
/// for a single request is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
