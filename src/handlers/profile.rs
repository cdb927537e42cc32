use axum::{
    extract::{Path, State},
    response::Json,
};
use common::{ApiResponse, UpdateProfileRequest};
use office::Caller;
use office::directory::ContactChanges;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::users::{UserResponse, load_record};
use crate::schemas::AppState;

/// Profiles are visible and editable by their owner and by administrators.
fn ensure_own_profile(caller: &Caller, username: &str) -> ApiResult<()> {
    if caller.username == username || caller.is_admin() {
        Ok(())
    } else {
        warn!("User {} tried to access profile of {}", caller.username, username);
        Err(ApiError::forbidden("You can only access your own profile"))
    }
}

async fn find_profile_user(state: &AppState, username: &str) -> ApiResult<model::entities::user::Model> {
    state
        .office
        .directory
        .find_by_username(&state.db, username)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User '{}' not found", username)))
}

/// Get a profile by username
#[utoipa::path(
    get,
    path = "/api/employee/profile/{username}",
    tag = "profile",
    params(
        ("username" = String, Path, description = "Username"),
    ),
    responses(
        (status = 200, description = "Profile retrieved successfully", body = UserResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not your profile", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn get_profile(
    Path(username): Path<String>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    ensure_own_profile(&user.0, &username)?;
    let profile = find_profile_user(&state, &username).await?;
    debug!("Loaded profile of user {}", profile.id);

    let record = load_record(&state, profile).await?;
    Ok(Json(ApiResponse::ok(
        UserResponse::from(record),
        "Profile retrieved successfully",
    )))
}

/// Update contact details of a profile
#[utoipa::path(
    put,
    path = "/api/employee/profile/{username}",
    tag = "profile",
    params(
        ("username" = String, Path, description = "Username"),
    ),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated successfully", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Not your profile", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user, request))]
pub async fn update_profile(
    Path(username): Path<String>,
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    ensure_own_profile(&user.0, &username)?;
    request.validate()?;
    let profile = find_profile_user(&state, &username).await?;

    let updated = state
        .office
        .directory
        .update_contact(&state.db, profile.id, ContactChanges::from(request))
        .await?;
    info!("Profile of {} updated by {}", username, user.0.username);

    let record = load_record(&state, updated).await?;
    Ok(Json(ApiResponse::ok(
        UserResponse::from(record),
        "Profile updated successfully",
    )))
}
