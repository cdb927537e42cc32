use crate::auth::{ADMIN_ROLES, EMPLOYEE_ROLES, fallback, require_roles, require_session};
use crate::handlers::{
    announcements::{list_announcements, publish_announcement},
    attendance::{check_in, check_out, my_attendance},
    auth::{login, logout, me},
    health::health_check,
    leaves::{
        admin_approve_leave, admin_reject_leave, all_pending_leaves, approve_leave,
        leaves_to_approve, my_leaves, reject_leave, submit_leave,
    },
    profile::{get_profile, update_profile},
    users::{all_managers, create_user, delete_user, enabled_managers, get_user, get_users, update_user},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// CORS for the configured browser origin, with cookies allowed.
fn cors_layer(allowed_origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true);
    match allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            warn!("Ignoring invalid CORS origin '{}': {}", allowed_origin, e);
            layer
        }
    }
}

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Any logged-in user
    let authenticated = Router::new()
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .route(
            "/api/employee/profile/:username",
            get(get_profile).put(update_profile),
        );

    // ROLE_ADMIN or ROLE_EMP
    let employee = Router::new()
        .route("/api/employee/leave", post(submit_leave))
        .route("/api/employee/leave/my", get(my_leaves))
        .route("/api/employee/leave/to-approve", get(leaves_to_approve))
        .route("/api/employee/leave/:request_id/approve", post(approve_leave))
        .route("/api/employee/leave/:request_id/reject", post(reject_leave))
        .route("/api/employee/attendance/check-in", post(check_in))
        .route("/api/employee/attendance/check-out", post(check_out))
        .route("/api/employee/attendance/my", get(my_attendance))
        .route("/api/employee/announcement", get(list_announcements))
        .route_layer(middleware::from_fn(require_roles(EMPLOYEE_ROLES)));

    // ROLE_ADMIN
    let admin = Router::new()
        .route("/api/admin/announcement", post(publish_announcement))
        .route("/api/admin/leaves/pending", get(all_pending_leaves))
        .route("/api/admin/leaves/:request_id/approve", post(admin_approve_leave))
        .route("/api/admin/leaves/:request_id/reject", post(admin_reject_leave))
        .route("/api/admin/users", get(get_users).post(create_user))
        .route("/api/admin/users/managers", get(enabled_managers))
        .route(
            "/api/admin/users/:user_id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/api/admin/meta/managers", get(all_managers))
        .route_layer(middleware::from_fn(require_roles(ADMIN_ROLES)));

    let protected = authenticated
        .merge(employee)
        .merge(admin)
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    let router = Router::new()
        // Health check
        .route("/health", get(health_check))
        .route("/api/auth/login", post(login))
        .merge(protected)
        .fallback(fallback)
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // Prometheus metrics, kept out of tests because the recorder is process-global
    #[cfg(not(test))]
    let router = {
        let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();
        router
            .route("/metrics", get(move || async move { metric_handle.render() }))
            .layer(prometheus_layer)
    };

    router
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(cors_layer(&state.settings.cors.allowed_origin)),
        )
        .with_state(state)
}
