pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_table;
mod m20240201_000001_add_announcements;
mod m20240301_000001_add_attendance_day_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_table::Migration),
            Box::new(m20240201_000001_add_announcements::Migration),
            Box::new(m20240301_000001_add_attendance_day_index::Migration),
        ]
    }
}
