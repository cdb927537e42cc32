use chrono::NaiveDateTime;
use model::entities::announcement;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use tracing::{debug, info, instrument};

use crate::error::{OfficeError, Result};
use crate::identity::Caller;

const MAX_TITLE_LEN: usize = 200;

/// Company notices. Published once, never edited.
#[derive(Debug, Default)]
pub struct AnnouncementBoard;

impl AnnouncementBoard {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, db, caller, content), fields(user_id = caller.user_id))]
    pub async fn publish(
        &self,
        db: &DatabaseConnection,
        caller: &Caller,
        title: &str,
        content: Option<String>,
        now: NaiveDateTime,
    ) -> Result<announcement::Model> {
        let title = title.trim();
        if title.is_empty() {
            return Err(OfficeError::validation("Title must not be blank"));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(OfficeError::validation(format!(
                "Title must be at most {} characters",
                MAX_TITLE_LEN
            )));
        }

        let saved = announcement::ActiveModel {
            title: Set(title.to_string()),
            content: Set(content),
            creator_id: Set(Some(caller.user_id)),
            create_time: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!("Announcement {} published by user {}", saved.id, caller.user_id);
        Ok(saved)
    }

    /// All announcements, newest first.
    pub async fn list(&self, db: &DatabaseConnection) -> Result<Vec<announcement::Model>> {
        let announcements = announcement::Entity::find()
            .order_by_desc(announcement::Column::CreateTime)
            .order_by_desc(announcement::Column::Id)
            .all(db)
            .await?;
        debug!("Found {} announcements", announcements.len());
        Ok(announcements)
    }
}
