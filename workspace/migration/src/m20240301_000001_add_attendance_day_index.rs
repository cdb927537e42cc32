use sea_orm_migration::prelude::*;

/// At most one attendance row per user and calendar day. Concurrent check-ins
/// for the same day rely on this index to reject the losing insert.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_records_user_date")
                    .table(Alias::new("attendance_records"))
                    .col(Alias::new("user_id"))
                    .col(Alias::new("date"))
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_attendance_records_user_date")
                    .table(Alias::new("attendance_records"))
                    .to_owned(),
            )
            .await
    }
}
