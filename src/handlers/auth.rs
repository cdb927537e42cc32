use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Json},
};
use common::{ApiResponse, LoginRequest, SessionInfo};
use office::Caller;
use tracing::{debug, info, instrument, trace};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::schemas::AppState;
use crate::session::{clear_session_cookie, session_cookie, session_id_from_headers};

fn session_info(caller: &Caller) -> SessionInfo {
    SessionInfo {
        username: caller.username.clone(),
        roles: caller.role_names(),
    }
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = SessionInfo),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Bad credentials", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    trace!("Login attempt for user {}", request.username);
    request.validate()?;

    let caller = state
        .office
        .directory
        .authenticate(&state.db, &request.username, &request.password)
        .await?;
    let session_id = state.sessions.create(&caller).await;

    info!("User '{}' logged in", caller.username);
    let response = ApiResponse::ok(session_info(&caller), "Login successful");
    Ok((
        [(header::SET_COOKIE, session_cookie(&session_id))],
        Json(response),
    ))
}

/// Log out and drop the session
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 204, description = "Logged out, session cookie cleared"),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user, headers), fields(user_id = user.0.user_id))]
pub async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(session_id) = session_id_from_headers(&headers) {
        state.sessions.remove(&session_id).await;
    }
    info!("User '{}' logged out", user.0.username);
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_session_cookie())],
    )
}

/// Who am I
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current identity", body = SessionInfo),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    )
)]
#[instrument(skip(user))]
pub async fn me(user: CurrentUser) -> Json<ApiResponse<SessionInfo>> {
    debug!("Identity requested by user {}", user.0.user_id);
    Json(ApiResponse::ok(session_info(&user.0), "Current user"))
}
