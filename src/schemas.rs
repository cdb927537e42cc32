use std::sync::Arc;

use common::{
    CreateUserRequest, ErrorResponse, LoginRequest, PublishAnnouncementRequest, SessionInfo,
    SubmitLeaveRequest, UpdateProfileRequest, UpdateUserRequest,
};
use office::Office;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::config::Settings;
use crate::handlers::{
    announcements::AnnouncementResponse,
    attendance::{AttendanceQuery, AttendanceResponse},
    leaves::LeaveResponse,
    users::{ManagerOption, UserResponse},
};
use crate::session::SessionStore;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Domain services
    pub office: Arc<Office>,
    /// Logged-in sessions
    pub sessions: SessionStore,
    /// Effective configuration
    pub settings: Arc<Settings>,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::login,
        crate::handlers::auth::logout,
        crate::handlers::auth::me,
        crate::handlers::profile::get_profile,
        crate::handlers::profile::update_profile,
        crate::handlers::leaves::submit_leave,
        crate::handlers::leaves::my_leaves,
        crate::handlers::leaves::leaves_to_approve,
        crate::handlers::leaves::approve_leave,
        crate::handlers::leaves::reject_leave,
        crate::handlers::leaves::all_pending_leaves,
        crate::handlers::leaves::admin_approve_leave,
        crate::handlers::leaves::admin_reject_leave,
        crate::handlers::attendance::check_in,
        crate::handlers::attendance::check_out,
        crate::handlers::attendance::my_attendance,
        crate::handlers::announcements::list_announcements,
        crate::handlers::announcements::publish_announcement,
        crate::handlers::users::get_users,
        crate::handlers::users::create_user,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::users::enabled_managers,
        crate::handlers::users::all_managers,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            LoginRequest,
            SessionInfo,
            UpdateProfileRequest,
            SubmitLeaveRequest,
            LeaveResponse,
            AttendanceQuery,
            AttendanceResponse,
            PublishAnnouncementRequest,
            AnnouncementResponse,
            CreateUserRequest,
            UpdateUserRequest,
            UserResponse,
            ManagerOption,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Login, logout and current identity"),
        (name = "profile", description = "Own profile and contact details"),
        (name = "leave", description = "Leave requests and approvals"),
        (name = "attendance", description = "Daily check-in and check-out"),
        (name = "announcements", description = "Company announcements"),
        (name = "users", description = "Employee account administration"),
    ),
    info(
        title = "OA Backend API",
        description = "Office automation backend - employee accounts, leave approval, attendance and announcements",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
