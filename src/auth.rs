//! Session gateway: resolves the session cookie to a [`Caller`] and enforces
//! the role requirements of each route tier.

use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{Method, Uri, request::Parts},
    middleware::Next,
    response::Response,
};
use office::{Caller, OfficeError, RoleName};
use tracing::{debug, trace, warn};

use crate::error::ApiError;
use crate::schemas::AppState;
use crate::session::session_id_from_headers;

/// Roles allowed on `/api/employee/**`.
pub const EMPLOYEE_ROLES: &[RoleName] = &[RoleName::Admin, RoleName::Emp];
/// Roles allowed on `/api/admin/**`.
pub const ADMIN_ROLES: &[RoleName] = &[RoleName::Admin];

/// The authenticated caller of the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Caller);

/// Looks the session up and reloads the caller from the directory.
///
/// Sessions whose user was deleted or disabled since login are dropped.
async fn caller_from_session(state: &AppState, headers: &axum::http::HeaderMap) -> Result<Caller, ApiError> {
    let Some(session_id) = session_id_from_headers(headers) else {
        trace!("Request without session cookie");
        return Err(ApiError::unauthenticated());
    };
    let Some(session) = state.sessions.get(&session_id).await else {
        debug!("Unknown or expired session");
        return Err(ApiError::unauthenticated());
    };

    match state.office.directory.resolve_caller(&state.db, session.user_id).await {
        Ok(caller) => Ok(caller),
        Err(OfficeError::Authentication(reason)) => {
            warn!("Dropping session of user {}: {}", session.user_id, reason);
            state.sessions.remove(&session_id).await;
            Err(ApiError::unauthenticated())
        }
        Err(e) => Err(e.into()),
    }
}

/// Requires a valid session and stores the [`CurrentUser`] in the request extensions.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let caller = caller_from_session(&state, req.headers()).await?;
    trace!("Request by user {} to {}", caller.user_id, req.uri().path());
    req.extensions_mut().insert(CurrentUser(caller));
    Ok(next.run(req).await)
}

/// Requires the caller to hold at least one of `roles`.
///
/// Must run inside [`require_session`].
pub fn require_roles(
    roles: &'static [RoleName],
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Result<Response, ApiError>> + Send>> + Clone
{
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or_else(ApiError::unauthenticated)?;

            if !user.0.has_any_role(roles) {
                warn!(
                    "User {} lacks any of {:?} for {}",
                    user.0.username,
                    roles,
                    req.uri().path()
                );
                return Err(ApiError::forbidden("Access denied"));
            }

            Ok(next.run(req).await)
        })
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let caller = caller_from_session(state, &parts.headers).await?;
        let user = CurrentUser(caller);
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// Roles a path prefix demands, for routes that do not exist.
fn roles_for_path(path: &str) -> Option<&'static [RoleName]> {
    if path.starts_with("/api/admin/") {
        Some(ADMIN_ROLES)
    } else if path.starts_with("/api/employee/profile/") {
        None
    } else if path.starts_with("/api/employee/") {
        Some(EMPLOYEE_ROLES)
    } else {
        None
    }
}

/// Unknown paths: 401 without a session, 403 for a tier the caller may not
/// enter, 404 otherwise.
pub async fn fallback(CurrentUser(caller): CurrentUser, uri: Uri) -> ApiError {
    if let Some(roles) = roles_for_path(uri.path()) {
        if !caller.has_any_role(roles) {
            return ApiError::forbidden("Access denied");
        }
    }
    ApiError::not_found(format!("No route for {}", uri.path()))
}
