use chrono::NaiveDate;
use sea_orm::entity::prelude::*;

use super::user;

/// Lifecycle of a leave request. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum LeaveStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "PENDING",
            LeaveStatus::Approved => "APPROVED",
            LeaveStatus::Rejected => "REJECTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

/// One leave application.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "leave_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// The requester.
    pub employee_id: i32,
    /// Resolved from the requester's manager at submission time and never
    /// changed afterwards. `None` leaves the request unassigned.
    pub approver_id: Option<i32>,
    /// Free-form leave type, e.g. "SICK" or "ANNUAL".
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub status: LeaveStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::EmployeeId",
        to = "user::Column::Id"
    )]
    Employee,
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::ApproverId",
        to = "user::Column::Id"
    )]
    Approver,
}

impl ActiveModelBehavior for ActiveModel {}
