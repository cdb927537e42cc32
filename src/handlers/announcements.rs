use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{Local, NaiveDateTime};
use common::{ApiResponse, PublishAnnouncementRequest};
use model::entities::announcement;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::schemas::AppState;

/// Announcement response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementResponse {
    pub id: i32,
    pub title: String,
    pub content: Option<String>,
    pub creator_id: Option<i32>,
    pub create_time: NaiveDateTime,
}

impl From<announcement::Model> for AnnouncementResponse {
    fn from(model: announcement::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            creator_id: model.creator_id,
            create_time: model.create_time,
        }
    }
}

/// List announcements, newest first
#[utoipa::path(
    get,
    path = "/api/employee/announcement",
    tag = "announcements",
    responses(
        (status = 200, description = "Announcements", body = [AnnouncementResponse]),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_announcements(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<AnnouncementResponse>>>> {
    let announcements = state.office.announcements.list(&state.db).await?;
    debug!("Returning {} announcements", announcements.len());
    Ok(Json(ApiResponse::ok(
        announcements
            .into_iter()
            .map(AnnouncementResponse::from)
            .collect(),
        "Announcements retrieved successfully",
    )))
}

/// Publish an announcement
#[utoipa::path(
    post,
    path = "/api/admin/announcement",
    tag = "announcements",
    request_body = PublishAnnouncementRequest,
    responses(
        (status = 201, description = "Announcement published", body = AnnouncementResponse),
        (status = 400, description = "Blank or too long title", body = ErrorResponse),
        (status = 403, description = "Administrator role required", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user, request), fields(user_id = user.0.user_id))]
pub async fn publish_announcement(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<PublishAnnouncementRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AnnouncementResponse>>)> {
    request.validate()?;
    let saved = state
        .office
        .announcements
        .publish(
            &state.db,
            &user.0,
            &request.title,
            request.content,
            Local::now().naive_local(),
        )
        .await?;
    info!("Announcement '{}' published", saved.title);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            AnnouncementResponse::from(saved),
            "Announcement published",
        )),
    ))
}
