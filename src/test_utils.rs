use crate::config::{Settings, build_app_state};
use crate::router::create_router;
use crate::schemas::AppState;
use axum::Router;
use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum_test::TestServer;
use migration::{Migrator, MigratorTrait};
use office::seed::bootstrap;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Password of every account the helpers create.
pub const TEST_PASSWORD: &str = "123456";

/// Create an in-memory SQLite database for testing, migrated and seeded
/// with the `admin` and `emp` accounts.
pub async fn setup_test_db(settings: &Settings) -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    db.execute_unprepared("PRAGMA foreign_keys = ON")
        .await
        .expect("Failed to enable foreign keys");

    // Run migrations
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    bootstrap(&db, &settings.bootstrap_options())
        .await
        .expect("Failed to seed bootstrap accounts");

    db
}

/// Create AppState for testing
pub async fn setup_test_app_state() -> AppState {
    let settings = Settings {
        database_url: "sqlite::memory:".to_string(),
        ..Default::default()
    };
    let db = setup_test_db(&settings).await;
    build_app_state(db, settings)
}

/// Initialize tracing for tests with output to STDERR.
///
/// The log level is determined by the RUST_LOG environment variable,
/// defaulting to WARN if not set.
pub fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| match level.to_uppercase().as_str() {
            "ERROR" => Some(Level::ERROR),
            "WARN" => Some(Level::WARN),
            "INFO" => Some(Level::INFO),
            "DEBUG" => Some(Level::DEBUG),
            "TRACE" => Some(Level::TRACE),
            _ => None,
        })
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// Create axum app for testing
pub async fn setup_test_app() -> Router {
    let state = setup_test_app_state().await;
    create_router(state)
}

/// Test server around a fresh app
pub async fn setup_test_server() -> TestServer {
    TestServer::new(setup_test_app().await).unwrap()
}

/// A `Cookie` header carrying a logged-in session.
pub struct SessionCookie(pub HeaderValue);

impl SessionCookie {
    pub fn header(&self) -> (HeaderName, HeaderValue) {
        (header::COOKIE, self.0.clone())
    }
}

/// Logs in through the API and returns the session cookie.
pub async fn login(server: &TestServer, username: &str, password: &str) -> SessionCookie {
    let response = server
        .post("/api/auth/login")
        .json(&serde_json::json!({ "username": username, "password": password }))
        .await;
    response.assert_status(StatusCode::OK);

    let set_cookie = response.header(header::SET_COOKIE);
    let pair = set_cookie
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();
    SessionCookie(HeaderValue::from_str(&pair).unwrap())
}

pub async fn login_admin(server: &TestServer) -> SessionCookie {
    login(server, "admin", TEST_PASSWORD).await
}

/// Creates an employee through the admin API and returns its id.
pub async fn create_employee(
    server: &TestServer,
    admin: &SessionCookie,
    username: &str,
    manager_id: Option<i32>,
) -> i32 {
    let (name, value) = admin.header();
    let response = server
        .post("/api/admin/users")
        .add_header(name, value)
        .json(&serde_json::json!({
            "username": username,
            "password": TEST_PASSWORD,
            "realName": format!("{} Example", username),
            "managerId": manager_id,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    body["data"]["id"].as_i64().unwrap() as i32
}
