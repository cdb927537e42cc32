use chrono::{NaiveDate, NaiveTime};
use sea_orm::entity::prelude::*;

use super::user;

/// Derived status of a day's attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum AttendanceStatus {
    /// Checked in at or before the start of the working day.
    #[sea_orm(string_value = "NORMAL")]
    Normal,
    /// Checked in after the start of the working day.
    #[sea_orm(string_value = "LATE")]
    Late,
    #[sea_orm(string_value = "ABSENT")]
    Absent,
    /// Checked out without having checked in.
    #[sea_orm(string_value = "ABNORMAL")]
    Abnormal,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Normal => "NORMAL",
            AttendanceStatus::Late => "LATE",
            AttendanceStatus::Absent => "ABSENT",
            AttendanceStatus::Abnormal => "ABNORMAL",
        }
    }
}

/// One row per (user, calendar date); the pair carries a unique index.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub date: NaiveDate,
    pub check_in_time: Option<NaiveTime>,
    pub check_out_time: Option<NaiveTime>,
    pub status: AttendanceStatus,
    pub remark: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::UserId",
        to = "user::Column::Id"
    )]
    User,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
