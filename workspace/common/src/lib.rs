//! Common transport-layer types shared between the HTTP handlers and their tests.
//! Request bodies live here together with the response envelopes so both sides
//! agree on field names without duplicating shapes.

mod date_range;

pub use date_range::DateRange;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Generic API response wrapper used for every successful response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success flag
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Stable machine-readable error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

// ===================== Authentication =====================

/// Credentials posted to the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

/// Identity of the logged-in user as returned by login and "who am I".
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SessionInfo {
    pub username: String,
    /// Role names, e.g. `ROLE_ADMIN`
    pub roles: Vec<String>,
}

// ===================== Users =====================

/// Request body for creating an employee account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Login name (must be unique)
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    /// Initial password
    #[validate(length(min = 1))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub real_name: String,
    pub gender: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub level: Option<String>,
    #[schema(value_type = Option<String>)]
    pub base_salary: Option<Decimal>,
    pub status: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    /// Direct manager, used as the default leave approver
    pub manager_id: Option<i32>,
    /// Role names to grant; defaults to `ROLE_EMP`
    pub roles: Option<Vec<String>>,
}

/// Request body for the administrative profile update. Absent fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub real_name: Option<String>,
    pub gender: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub level: Option<String>,
    #[schema(value_type = Option<String>)]
    pub base_salary: Option<Decimal>,
    pub status: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    pub enabled: Option<bool>,
    /// New direct manager
    pub manager_id: Option<i32>,
    /// Remove the current manager; takes precedence over `managerId`
    #[serde(default)]
    pub clear_manager: bool,
    /// Replacement role set
    pub roles: Option<Vec<String>>,
    /// New password
    #[validate(length(min = 1))]
    pub password: Option<String>,
}

/// Contact details a user may change on their own profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
}

// ===================== Leave =====================

/// Request body for submitting a leave request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitLeaveRequest {
    /// Leave type, e.g. SICK or ANNUAL
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50))]
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

// ===================== Announcements =====================

/// Request body for publishing an announcement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct PublishAnnouncementRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub content: Option<String>,
}
