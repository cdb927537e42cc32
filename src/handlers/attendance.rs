use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::{Local, NaiveDate, NaiveTime};
use common::ApiResponse;
use model::entities::attendance_record;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::schemas::AppState;

/// Query parameters for the attendance history
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceQuery {
    /// First day (YYYY-MM-DD), defaults to 30 days ago
    pub from: Option<NaiveDate>,
    /// Last day (YYYY-MM-DD), defaults to today
    pub to: Option<NaiveDate>,
}

/// One day of attendance
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceResponse {
    pub id: i32,
    pub date: NaiveDate,
    #[schema(value_type = Option<String>, example = "08:55:00")]
    pub check_in_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "18:02:10")]
    pub check_out_time: Option<NaiveTime>,
    /// NORMAL, LATE, ABSENT or ABNORMAL
    pub status: String,
    pub remark: Option<String>,
}

impl From<attendance_record::Model> for AttendanceResponse {
    fn from(model: attendance_record::Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            check_in_time: model.check_in_time,
            check_out_time: model.check_out_time,
            status: model.status.as_str().to_string(),
            remark: model.remark,
        }
    }
}

/// Check in for today
#[utoipa::path(
    post,
    path = "/api/employee/attendance/check-in",
    tag = "attendance",
    responses(
        (status = 200, description = "Checked in", body = AttendanceResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 409, description = "Already checked in today", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.0.user_id))]
pub async fn check_in(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ApiResponse<AttendanceResponse>>> {
    let now = Local::now().naive_local();
    let record = state
        .office
        .attendance
        .check_in(&state.db, &user.0, now)
        .await?;
    Ok(Json(ApiResponse::ok(
        AttendanceResponse::from(record),
        "Checked in successfully",
    )))
}

/// Check out for today
#[utoipa::path(
    post,
    path = "/api/employee/attendance/check-out",
    tag = "attendance",
    responses(
        (status = 200, description = "Checked out", body = AttendanceResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 409, description = "Already checked out today", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.0.user_id))]
pub async fn check_out(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ApiResponse<AttendanceResponse>>> {
    let now = Local::now().naive_local();
    let record = state
        .office
        .attendance
        .check_out(&state.db, &user.0, now)
        .await?;
    Ok(Json(ApiResponse::ok(
        AttendanceResponse::from(record),
        "Checked out successfully",
    )))
}

/// Own attendance history, newest day first
#[utoipa::path(
    get,
    path = "/api/employee/attendance/my",
    tag = "attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Attendance records", body = [AttendanceResponse]),
        (status = 400, description = "from is after to", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.0.user_id))]
pub async fn my_attendance(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<AttendanceQuery>,
) -> ApiResult<Json<ApiResponse<Vec<AttendanceResponse>>>> {
    debug!("Attendance history query: {:?}", query);
    let today = Local::now().date_naive();
    let records = state
        .office
        .attendance
        .history(&state.db, &user.0, query.from, query.to, today)
        .await?;
    Ok(Json(ApiResponse::ok(
        records.into_iter().map(AttendanceResponse::from).collect(),
        "Attendance records retrieved successfully",
    )))
}
