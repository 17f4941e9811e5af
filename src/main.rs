use risk_portal::{
    AppState, auth,
    config::{AppConfig, Env},
    create_router,
    models::{Role, UserAccount},
    repository::{PostgresRepository, RepositoryState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// ensure_admin_account
///
/// Seeds the bootstrap admin account on startup if no account with the
/// configured admin username exists yet. Without this there would be no way
/// to invoke any of the /admin creation endpoints on a fresh database.
async fn ensure_admin_account(repo: &RepositoryState, config: &AppConfig) {
    if repo.get_account(&config.admin_username).await.is_some() {
        return;
    }

    let password_hash = auth::hash_password(&config.admin_password)
        .expect("FATAL: failed to hash bootstrap admin password");
    let created = repo
        .create_account(UserAccount {
            username: config.admin_username.clone(),
            password_hash,
            role: Role::Admin,
        })
        .await;

    if created {
        tracing::info!("Bootstrap admin account '{}' created", config.admin_username);
    }
}

/// main
///
/// The asynchronous entry point for the application, responsible for
/// initializing all core components: Configuration, Logging, Database, and
/// the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    // Loads .env file settings before configuration can be read.
    dotenv::dotenv().ok();
    // AppConfig::load() panics on missing Production secrets.
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // Prioritizes the RUST_LOG environment variable, falling back to
    // sensible defaults for local development.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "risk_portal=debug,tower_http=info,axum=trace".into());

    // 3. Initialize Logging based on Environment
    // Pretty output for local debugging; JSON for centralized aggregation
    // in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Database Initialization (Postgres)
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    // Provision the schema before anything touches the tables.
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("FATAL: database migration failed");

    // Instantiate the Repository, wrapped in an Arc for thread-safe sharing.
    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // 5. Bootstrap Admin
    ensure_admin_account(&repo, &config).await;

    // 6. Unified State Assembly
    let app_state = AppState { repo, config };

    // 7. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind("0.0.0.0:3000").await.unwrap();

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on 0.0.0.0:3000");
    tracing::info!("API Documentation (Swagger UI) available at: http://localhost:3000/swagger-ui");

    axum::serve(listener, app).await.unwrap();
}
