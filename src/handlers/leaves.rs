use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use common::{ApiResponse, SubmitLeaveRequest};
use office::Authority;
use office::leave::{LeaveView, NewLeave};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::schemas::AppState;

/// Leave request as shown to requesters and approvers
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveResponse {
    pub id: i32,
    pub employee_id: i32,
    pub employee_username: Option<String>,
    pub employee_name: Option<String>,
    /// Unset when the requester had no manager at submission time
    pub approver_id: Option<i32>,
    pub approver_username: Option<String>,
    pub approver_name: Option<String>,
    #[serde(rename = "type")]
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    /// PENDING, APPROVED or REJECTED
    pub status: String,
}

impl From<LeaveView> for LeaveResponse {
    fn from(view: LeaveView) -> Self {
        let LeaveView {
            request,
            requester,
            approver,
        } = view;
        Self {
            id: request.id,
            employee_id: request.employee_id,
            employee_username: requester.as_ref().map(|p| p.username.clone()),
            employee_name: requester.and_then(|p| p.real_name),
            approver_id: request.approver_id,
            approver_username: approver.as_ref().map(|p| p.username.clone()),
            approver_name: approver.and_then(|p| p.real_name),
            leave_type: request.leave_type,
            start_date: request.start_date,
            end_date: request.end_date,
            reason: request.reason,
            status: request.status.as_str().to_string(),
        }
    }
}

impl From<model::entities::leave_request::Model> for LeaveResponse {
    fn from(request: model::entities::leave_request::Model) -> Self {
        LeaveResponse::from(LeaveView {
            request,
            requester: None,
            approver: None,
        })
    }
}

fn to_responses(views: Vec<LeaveView>) -> Vec<LeaveResponse> {
    views.into_iter().map(LeaveResponse::from).collect()
}

/// Submit a leave request
#[utoipa::path(
    post,
    path = "/api/employee/leave",
    tag = "leave",
    request_body = SubmitLeaveRequest,
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveResponse),
        (status = 400, description = "Invalid request, e.g. start after end", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user, request), fields(user_id = user.0.user_id))]
pub async fn submit_leave(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<SubmitLeaveRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<LeaveResponse>>)> {
    request.validate()?;
    let saved = state
        .office
        .leave
        .submit(&state.db, &user.0, NewLeave::from(request))
        .await?;
    info!("Leave request {} submitted", saved.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            LeaveResponse::from(saved),
            "Leave request submitted",
        )),
    ))
}

/// The caller's own leave requests, latest start date first
#[utoipa::path(
    get,
    path = "/api/employee/leave/my",
    tag = "leave",
    responses(
        (status = 200, description = "Own leave requests", body = [LeaveResponse]),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.0.user_id))]
pub async fn my_leaves(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<LeaveResponse>>>> {
    let views = state.office.leave.list_mine(&state.db, &user.0).await?;
    Ok(Json(ApiResponse::ok(
        to_responses(views),
        "Leave requests retrieved successfully",
    )))
}

/// Pending leave requests waiting for the caller's decision
#[utoipa::path(
    get,
    path = "/api/employee/leave/to-approve",
    tag = "leave",
    responses(
        (status = 200, description = "Pending requests assigned to the caller", body = [LeaveResponse]),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.0.user_id))]
pub async fn leaves_to_approve(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<LeaveResponse>>>> {
    let views = state
        .office
        .leave
        .list_pending_for_approver(&state.db, &user.0)
        .await?;
    debug!("{} requests waiting for user {}", views.len(), user.0.user_id);
    Ok(Json(ApiResponse::ok(
        to_responses(views),
        "Pending leave requests retrieved successfully",
    )))
}

async fn decide(
    state: &AppState,
    user: &CurrentUser,
    request_id: i32,
    approve: bool,
    authority: Authority,
) -> ApiResult<Json<ApiResponse<LeaveResponse>>> {
    let workflow = &state.office.leave;
    let (decided, message) = if approve {
        (
            workflow.approve(&state.db, request_id, &user.0, authority).await?,
            "Leave request approved",
        )
    } else {
        (
            workflow.reject(&state.db, request_id, &user.0, authority).await?,
            "Leave request rejected",
        )
    };
    Ok(Json(ApiResponse::ok(LeaveResponse::from(decided), message)))
}

/// Approve a leave request assigned to the caller
#[utoipa::path(
    post,
    path = "/api/employee/leave/{request_id}/approve",
    tag = "leave",
    params(
        ("request_id" = i32, Path, description = "Leave request ID"),
    ),
    responses(
        (status = 200, description = "Leave request approved", body = LeaveResponse),
        (status = 403, description = "Caller is not the assigned approver", body = ErrorResponse),
        (status = 404, description = "Leave request not found", body = ErrorResponse),
        (status = 409, description = "Leave request already decided", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.0.user_id))]
pub async fn approve_leave(
    Path(request_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ApiResponse<LeaveResponse>>> {
    decide(&state, &user, request_id, true, Authority::Approver).await
}

/// Reject a leave request assigned to the caller
#[utoipa::path(
    post,
    path = "/api/employee/leave/{request_id}/reject",
    tag = "leave",
    params(
        ("request_id" = i32, Path, description = "Leave request ID"),
    ),
    responses(
        (status = 200, description = "Leave request rejected", body = LeaveResponse),
        (status = 403, description = "Caller is not the assigned approver", body = ErrorResponse),
        (status = 404, description = "Leave request not found", body = ErrorResponse),
        (status = 409, description = "Leave request already decided", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.0.user_id))]
pub async fn reject_leave(
    Path(request_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ApiResponse<LeaveResponse>>> {
    decide(&state, &user, request_id, false, Authority::Approver).await
}

/// All pending leave requests
#[utoipa::path(
    get,
    path = "/api/admin/leaves/pending",
    tag = "leave",
    responses(
        (status = 200, description = "All pending requests", body = [LeaveResponse]),
        (status = 403, description = "Administrator role required", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn all_pending_leaves(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<LeaveResponse>>>> {
    let views = state.office.leave.list_all_pending(&state.db).await?;
    Ok(Json(ApiResponse::ok(
        to_responses(views),
        "Pending leave requests retrieved successfully",
    )))
}

/// Approve any pending leave request as administrator
#[utoipa::path(
    post,
    path = "/api/admin/leaves/{request_id}/approve",
    tag = "leave",
    params(
        ("request_id" = i32, Path, description = "Leave request ID"),
    ),
    responses(
        (status = 200, description = "Leave request approved", body = LeaveResponse),
        (status = 404, description = "Leave request not found", body = ErrorResponse),
        (status = 409, description = "Leave request already decided", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.0.user_id))]
pub async fn admin_approve_leave(
    Path(request_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ApiResponse<LeaveResponse>>> {
    decide(&state, &user, request_id, true, Authority::AdminOverride).await
}

/// Reject any pending leave request as administrator
#[utoipa::path(
    post,
    path = "/api/admin/leaves/{request_id}/reject",
    tag = "leave",
    params(
        ("request_id" = i32, Path, description = "Leave request ID"),
    ),
    responses(
        (status = 200, description = "Leave request rejected", body = LeaveResponse),
        (status = 404, description = "Leave request not found", body = ErrorResponse),
        (status = 409, description = "Leave request already decided", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.0.user_id))]
pub async fn admin_reject_leave(
    Path(request_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ApiResponse<LeaveResponse>>> {
    decide(&state, &user, request_id, false, Authority::AdminOverride).await
}
