use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::{role, user_role};

/// An employee account.
///
/// `manager_id` is a plain reference to another row of this table. It is only
/// ever looked up, never followed for ownership, so deleting a manager merely
/// clears the reference on the subordinates.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Login name, unique across the table.
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2id hash in PHC string format.
    pub password_hash: String,
    pub real_name: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
    /// Grade label such as "P1" or "Senior".
    pub level: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub base_salary: Option<Decimal>,
    /// Employment status such as "ACTIVE" or "LEFT".
    pub status: Option<String>,
    pub address: Option<String>,
    /// Disabled accounts cannot log in.
    pub enabled: bool,
    /// Direct manager, the default approver of this user's leave requests.
    pub manager_id: Option<i32>,
}

impl Model {
    /// Name shown to other users: the real name when set, the username otherwise.
    pub fn display_name(&self) -> &str {
        self.real_name.as_deref().unwrap_or(&self.username)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A user reports to at most one manager.
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ManagerId",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    Manager,
    #[sea_orm(has_many = "super::user_role::Entity")]
    UserRole,
}

impl Related<user_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRole.def()
    }
}

impl Related<role::Entity> for Entity {
    fn to() -> RelationDef {
        user_role::Relation::Role.def()
    }
    fn via() -> Option<RelationDef> {
        Some(user_role::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
