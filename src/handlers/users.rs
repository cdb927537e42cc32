use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use common::{ApiResponse, CreateUserRequest, UpdateUserRequest};
use model::entities::user;
use office::directory::{NewUser, UserChanges, UserRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::ApiResult;
use crate::schemas::AppState;

/// User response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub real_name: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub level: Option<String>,
    #[schema(value_type = Option<String>)]
    pub base_salary: Option<Decimal>,
    pub status: Option<String>,
    pub address: Option<String>,
    pub enabled: bool,
    pub manager_id: Option<i32>,
    pub manager_username: Option<String>,
    pub manager_name: Option<String>,
    /// Role names, e.g. `ROLE_EMP`
    pub roles: Vec<String>,
}

impl From<UserRecord> for UserResponse {
    fn from(record: UserRecord) -> Self {
        let UserRecord {
            user,
            manager,
            roles,
        } = record;
        Self {
            id: user.id,
            username: user.username,
            real_name: user.real_name,
            gender: user.gender,
            phone: user.phone,
            email: user.email,
            department: user.department,
            position: user.position,
            hire_date: user.hire_date,
            level: user.level,
            base_salary: user.base_salary,
            status: user.status,
            address: user.address,
            enabled: user.enabled,
            manager_id: user.manager_id,
            manager_username: manager.as_ref().map(|m| m.username.clone()),
            manager_name: manager.and_then(|m| m.real_name),
            roles: roles.iter().map(|r| r.as_str().to_string()).collect(),
        }
    }
}

/// A user that can be picked as manager
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagerOption {
    pub id: i32,
    pub username: String,
    pub real_name: Option<String>,
}

impl From<user::Model> for ManagerOption {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            real_name: model.real_name,
        }
    }
}

/// Loads a user with manager and roles resolved.
pub(crate) async fn load_record(state: &AppState, user: user::Model) -> ApiResult<UserRecord> {
    let directory = &state.office.directory;
    let manager = match user.manager_id {
        Some(manager_id) => directory.find_by_id(&state.db, manager_id).await?,
        None => None,
    };
    let roles = directory.roles_of(&state.db, user.id).await?;
    Ok(UserRecord {
        user,
        manager,
        roles,
    })
}

/// Get all users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "users",
    responses(
        (status = 200, description = "Users retrieved successfully", body = [UserResponse]),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_users(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<UserResponse>>>> {
    trace!("Entering get_users function");
    let records = state.office.directory.list_users(&state.db).await?;
    let user_count = records.len();
    let users: Vec<UserResponse> = records.into_iter().map(UserResponse::from).collect();

    info!("Successfully retrieved {} users", user_count);
    Ok(Json(ApiResponse::ok(users, "Users retrieved successfully")))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/admin/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Username already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    debug!("Creating user with username: {}", request.username);
    request.validate()?;

    let new_user = NewUser::try_from(request)?;
    let created = state.office.directory.create_user(&state.db, new_user).await?;
    info!(
        "User created successfully with ID: {}, username: {}",
        created.id, created.username
    );

    let record = load_record(&state, created).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            UserResponse::from(record),
            "User created successfully",
        )),
    ))
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/api/admin/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    debug!("Fetching user with ID: {}", user_id);
    let user = state.office.directory.get(&state.db, user_id).await?;
    let record = load_record(&state, user).await?;
    Ok(Json(ApiResponse::ok(
        UserResponse::from(record),
        "User retrieved successfully",
    )))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/api/admin/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = UserResponse),
        (status = 400, description = "Invalid request or manager cycle", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    trace!("Entering update_user function for user_id: {}", user_id);
    request.validate()?;

    let changes = UserChanges::try_from(request)?;
    let updated = state
        .office
        .directory
        .update_user(&state.db, user_id, changes)
        .await?;
    let record = load_record(&state, updated).await?;
    Ok(Json(ApiResponse::ok(
        UserResponse::from(record),
        "User updated successfully",
    )))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/admin/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 204, description = "User deleted successfully"),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "User has leave or attendance history", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> ApiResult<StatusCode> {
    debug!("Deleting user with ID: {}", user_id);
    state.office.directory.delete_user(&state.db, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Enabled users that can be assigned as manager
#[utoipa::path(
    get,
    path = "/api/admin/users/managers",
    tag = "users",
    responses(
        (status = 200, description = "Manager options", body = [ManagerOption]),
        (status = 403, description = "Administrator role required", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn enabled_managers(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<ManagerOption>>>> {
    let managers = state.office.directory.manager_options(&state.db, true).await?;
    debug!("Found {} enabled manager options", managers.len());
    Ok(Json(ApiResponse::ok(
        managers.into_iter().map(ManagerOption::from).collect(),
        "Managers retrieved successfully",
    )))
}

/// All users as manager options, including disabled accounts
#[utoipa::path(
    get,
    path = "/api/admin/meta/managers",
    tag = "users",
    responses(
        (status = 200, description = "Manager options", body = [ManagerOption]),
        (status = 403, description = "Administrator role required", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn all_managers(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<ManagerOption>>>> {
    let managers = state.office.directory.manager_options(&state.db, false).await?;
    Ok(Json(ApiResponse::ok(
        managers.into_iter().map(ManagerOption::from).collect(),
        "Managers retrieved successfully",
    )))
}
