use sea_orm::entity::prelude::*;

use super::{user, user_role};

/// A coarse permission label, e.g. `ROLE_ADMIN` or `ROLE_EMP`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_role::Entity")]
    UserRole,
}

impl Related<user_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRole.def()
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        user_role::Relation::User.def()
    }
    fn via() -> Option<RelationDef> {
        Some(user_role::Relation::Role.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
