use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use common::{CreateUserRequest, UpdateProfileRequest, UpdateUserRequest};
use model::entities::{attendance_record, leave_request, role, user, user_role};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};

use crate::error::{OfficeError, Result, is_unique_violation};
use crate::identity::{Caller, RoleName};
use crate::password::{hash_password, verify_password};

const BAD_CREDENTIALS: &str = "Bad credentials";

/// Everything needed to create an account.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub real_name: String,
    pub gender: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub level: Option<String>,
    pub base_salary: Option<Decimal>,
    pub status: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub manager_id: Option<i32>,
    /// Granted roles; an empty list means `ROLE_EMP`.
    pub roles: Vec<RoleName>,
}

impl TryFrom<CreateUserRequest> for NewUser {
    type Error = OfficeError;

    fn try_from(request: CreateUserRequest) -> Result<Self> {
        Ok(Self {
            username: request.username,
            password: request.password,
            real_name: request.real_name,
            gender: request.gender,
            department: request.department,
            position: request.position,
            hire_date: request.hire_date,
            level: request.level,
            base_salary: request.base_salary,
            status: request.status,
            phone: request.phone,
            email: request.email,
            address: request.address,
            manager_id: request.manager_id,
            roles: parse_roles(request.roles.unwrap_or_default())?,
        })
    }
}

/// What to do with a user's manager reference on update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManagerChange {
    #[default]
    Keep,
    Clear,
    Set(i32),
}

/// Administrative profile update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub real_name: Option<String>,
    pub gender: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub level: Option<String>,
    pub base_salary: Option<Decimal>,
    pub status: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub enabled: Option<bool>,
    pub manager: ManagerChange,
    pub roles: Option<Vec<RoleName>>,
    pub password: Option<String>,
}

impl TryFrom<UpdateUserRequest> for UserChanges {
    type Error = OfficeError;

    fn try_from(request: UpdateUserRequest) -> Result<Self> {
        let manager = if request.clear_manager {
            ManagerChange::Clear
        } else {
            request.manager_id.map_or(ManagerChange::Keep, ManagerChange::Set)
        };
        Ok(Self {
            real_name: request.real_name,
            gender: request.gender,
            department: request.department,
            position: request.position,
            hire_date: request.hire_date,
            level: request.level,
            base_salary: request.base_salary,
            status: request.status,
            phone: request.phone,
            email: request.email,
            address: request.address,
            enabled: request.enabled,
            manager,
            roles: request.roles.map(parse_roles).transpose()?,
            password: request.password,
        })
    }
}

/// Self-service contact update. Values replace the stored ones, `None` clears.
#[derive(Debug, Clone, Default)]
pub struct ContactChanges {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl From<UpdateProfileRequest> for ContactChanges {
    fn from(request: UpdateProfileRequest) -> Self {
        Self {
            phone: request.phone,
            email: request.email,
            address: request.address,
        }
    }
}

/// A user together with the resolved manager row and role set.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user: user::Model,
    pub manager: Option<user::Model>,
    pub roles: Vec<RoleName>,
}

fn parse_roles(names: Vec<String>) -> Result<Vec<RoleName>> {
    let mut roles: Vec<RoleName> = names
        .iter()
        .map(|name| name.parse())
        .collect::<Result<_>>()?;
    roles.sort();
    roles.dedup();
    Ok(roles)
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Lookup and administration of user accounts, roles and the reporting line.
#[derive(Debug, Default)]
pub struct UserDirectory;

impl UserDirectory {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_username<C: ConnectionTrait>(
        &self,
        db: &C,
        username: &str,
    ) -> Result<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(db)
            .await?)
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        &self,
        db: &C,
        id: i32,
    ) -> Result<Option<user::Model>> {
        Ok(user::Entity::find_by_id(id).one(db).await?)
    }

    /// Like [`find_by_id`](Self::find_by_id) but a missing user is an error.
    pub async fn get<C: ConnectionTrait>(&self, db: &C, id: i32) -> Result<user::Model> {
        self.find_by_id(db, id)
            .await?
            .ok_or_else(|| OfficeError::not_found(format!("User with ID {} not found", id)))
    }

    /// The direct manager of `user_id`, if one is assigned.
    pub async fn manager_of<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: i32,
    ) -> Result<Option<user::Model>> {
        let user = self.get(db, user_id).await?;
        match user.manager_id {
            Some(manager_id) => self.find_by_id(db, manager_id).await,
            None => Ok(None),
        }
    }

    pub async fn roles_of<C: ConnectionTrait>(&self, db: &C, user_id: i32) -> Result<Vec<RoleName>> {
        let rows = role::Entity::find()
            .inner_join(user_role::Entity)
            .filter(user_role::Column::UserId.eq(user_id))
            .order_by_asc(role::Column::Name)
            .all(db)
            .await?;

        let mut roles = Vec::with_capacity(rows.len());
        for row in rows {
            match row.name.parse::<RoleName>() {
                Ok(name) => roles.push(name),
                Err(_) => warn!("Ignoring unknown role '{}' on user {}", row.name, user_id),
            }
        }
        Ok(roles)
    }

    /// All users ordered by id, with their manager and roles resolved.
    #[instrument(skip(self, db))]
    pub async fn list_users(&self, db: &DatabaseConnection) -> Result<Vec<UserRecord>> {
        let users = user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(db)
            .await?;
        let by_id: HashMap<i32, user::Model> = users.iter().map(|u| (u.id, u.clone())).collect();

        let role_names: HashMap<i32, String> = role::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|r| (r.id, r.name))
            .collect();
        let mut roles_by_user: HashMap<i32, Vec<RoleName>> = HashMap::new();
        for link in user_role::Entity::find().all(db).await? {
            if let Some(Ok(name)) = role_names.get(&link.role_id).map(|n| n.parse::<RoleName>()) {
                roles_by_user.entry(link.user_id).or_default().push(name);
            }
        }

        debug!("Loaded {} users", users.len());
        Ok(users
            .into_iter()
            .map(|user| {
                let manager = user.manager_id.and_then(|id| by_id.get(&id).cloned());
                let mut roles = roles_by_user.remove(&user.id).unwrap_or_default();
                roles.sort();
                UserRecord { user, manager, roles }
            })
            .collect())
    }

    /// Users that can be picked as someone's manager.
    pub async fn manager_options(
        &self,
        db: &DatabaseConnection,
        enabled_only: bool,
    ) -> Result<Vec<user::Model>> {
        let mut query = user::Entity::find().order_by_asc(user::Column::Id);
        if enabled_only {
            query = query.filter(user::Column::Enabled.eq(true));
        }
        Ok(query.all(db).await?)
    }

    /// Creates an account with a hashed password and its role links.
    #[instrument(skip(self, db, new_user), fields(username = %new_user.username))]
    pub async fn create_user(&self, db: &DatabaseConnection, new_user: NewUser) -> Result<user::Model> {
        if is_blank(&new_user.username) {
            return Err(OfficeError::validation("Username must not be blank"));
        }
        if is_blank(&new_user.password) {
            return Err(OfficeError::validation("Password must not be blank"));
        }
        if is_blank(&new_user.real_name) {
            return Err(OfficeError::validation("Real name must not be blank"));
        }

        let username = new_user.username.trim().to_string();
        if self.find_by_username(db, &username).await?.is_some() {
            warn!("Username '{}' already exists", username);
            return Err(OfficeError::conflict(format!("Username '{}' already exists", username)));
        }

        if let Some(manager_id) = new_user.manager_id {
            if self.find_by_id(db, manager_id).await?.is_none() {
                return Err(OfficeError::validation(format!(
                    "Manager with ID {} does not exist",
                    manager_id
                )));
            }
        }

        let password_hash = hash_password(&new_user.password)?;
        let roles = if new_user.roles.is_empty() {
            vec![RoleName::Emp]
        } else {
            new_user.roles
        };

        let txn = db.begin().await?;
        let inserted = user::ActiveModel {
            username: Set(username.clone()),
            password_hash: Set(password_hash),
            real_name: Set(Some(new_user.real_name.trim().to_string())),
            gender: Set(new_user.gender),
            phone: Set(new_user.phone),
            email: Set(new_user.email),
            department: Set(new_user.department),
            position: Set(new_user.position),
            hire_date: Set(new_user.hire_date),
            level: Set(new_user.level),
            base_salary: Set(new_user.base_salary),
            status: Set(new_user.status),
            address: Set(new_user.address),
            enabled: Set(true),
            manager_id: Set(new_user.manager_id),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                OfficeError::conflict(format!("Username '{}' already exists", username))
            } else {
                OfficeError::from(e)
            }
        })?;

        replace_roles(&txn, inserted.id, &roles).await?;
        txn.commit().await?;

        info!("Created user {} with ID {}", inserted.username, inserted.id);
        Ok(inserted)
    }

    /// Administrative update of any profile field, the manager, roles, password or enabled flag.
    #[instrument(skip(self, db, changes))]
    pub async fn update_user(
        &self,
        db: &DatabaseConnection,
        id: i32,
        changes: UserChanges,
    ) -> Result<user::Model> {
        let existing = self.get(db, id).await?;

        if let Some(real_name) = &changes.real_name {
            if is_blank(real_name) {
                return Err(OfficeError::validation("Real name must not be blank"));
            }
        }
        if changes.roles.as_ref().is_some_and(|roles| roles.is_empty()) {
            return Err(OfficeError::validation("A user needs at least one role"));
        }
        if let ManagerChange::Set(manager_id) = changes.manager {
            self.check_manager_assignment(db, id, manager_id).await?;
        }
        let password_hash = match &changes.password {
            Some(password) if is_blank(password) => {
                return Err(OfficeError::validation("Password must not be blank"));
            }
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let mut active: user::ActiveModel = existing.into();
        let mut updated_fields = Vec::new();

        if let Some(real_name) = changes.real_name {
            active.real_name = Set(Some(real_name.trim().to_string()));
            updated_fields.push("real_name");
        }
        if let Some(gender) = changes.gender {
            active.gender = Set(Some(gender));
            updated_fields.push("gender");
        }
        if let Some(department) = changes.department {
            active.department = Set(Some(department));
            updated_fields.push("department");
        }
        if let Some(position) = changes.position {
            active.position = Set(Some(position));
            updated_fields.push("position");
        }
        if let Some(hire_date) = changes.hire_date {
            active.hire_date = Set(Some(hire_date));
            updated_fields.push("hire_date");
        }
        if let Some(level) = changes.level {
            active.level = Set(Some(level));
            updated_fields.push("level");
        }
        if let Some(base_salary) = changes.base_salary {
            active.base_salary = Set(Some(base_salary));
            updated_fields.push("base_salary");
        }
        if let Some(status) = changes.status {
            active.status = Set(Some(status));
            updated_fields.push("status");
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(Some(phone));
            updated_fields.push("phone");
        }
        if let Some(email) = changes.email {
            active.email = Set(Some(email));
            updated_fields.push("email");
        }
        if let Some(address) = changes.address {
            active.address = Set(Some(address));
            updated_fields.push("address");
        }
        if let Some(enabled) = changes.enabled {
            active.enabled = Set(enabled);
            updated_fields.push("enabled");
        }
        match changes.manager {
            ManagerChange::Keep => {}
            ManagerChange::Clear => {
                active.manager_id = Set(None);
                updated_fields.push("manager_id");
            }
            ManagerChange::Set(manager_id) => {
                active.manager_id = Set(Some(manager_id));
                updated_fields.push("manager_id");
            }
        }
        if let Some(hash) = password_hash {
            active.password_hash = Set(hash);
            updated_fields.push("password");
        }

        let txn = db.begin().await?;
        let updated = active.update(&txn).await?;
        if let Some(roles) = changes.roles {
            replace_roles(&txn, id, &roles).await?;
            updated_fields.push("roles");
        }
        txn.commit().await?;

        if updated_fields.is_empty() {
            debug!("No fields to update for user ID: {}", id);
        } else {
            info!("User {} updated. Updated fields: {}", id, updated_fields.join(", "));
        }
        Ok(updated)
    }

    /// Self-service update, limited to phone, email and address.
    #[instrument(skip(self, db, changes))]
    pub async fn update_contact(
        &self,
        db: &DatabaseConnection,
        id: i32,
        changes: ContactChanges,
    ) -> Result<user::Model> {
        let existing = self.get(db, id).await?;
        let mut active: user::ActiveModel = existing.into();
        active.phone = Set(changes.phone);
        active.email = Set(changes.email);
        active.address = Set(changes.address);
        let updated = active.update(db).await?;
        info!("Contact details of user {} updated", id);
        Ok(updated)
    }

    /// Removes an account that has no leave or attendance history.
    ///
    /// Subordinates lose their manager reference. Deleting an account with
    /// history is refused with a conflict; such accounts should be disabled
    /// instead, since leave requests and attendance rows are kept forever.
    #[instrument(skip(self, db))]
    pub async fn delete_user(&self, db: &DatabaseConnection, id: i32) -> Result<()> {
        self.get(db, id).await?;

        let leave_refs = leave_request::Entity::find()
            .filter(
                leave_request::Column::EmployeeId
                    .eq(id)
                    .or(leave_request::Column::ApproverId.eq(id)),
            )
            .count(db)
            .await?;
        let attendance_refs = attendance_record::Entity::find()
            .filter(attendance_record::Column::UserId.eq(id))
            .count(db)
            .await?;
        if leave_refs > 0 || attendance_refs > 0 {
            warn!(
                "User {} is referenced by {} leave requests and {} attendance records",
                id, leave_refs, attendance_refs
            );
            return Err(OfficeError::conflict(format!(
                "User {} has leave or attendance history; disable the account instead",
                id
            )));
        }

        let txn = db.begin().await?;
        user::Entity::update_many()
            .col_expr(user::Column::ManagerId, Expr::value(Option::<i32>::None))
            .filter(user::Column::ManagerId.eq(id))
            .exec(&txn)
            .await?;
        user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        let result = user::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        debug!("Delete operation completed. Rows affected: {}", result.rows_affected);
        info!("User with ID {} deleted", id);
        Ok(())
    }

    /// Checks a username/password pair and returns the caller identity.
    ///
    /// Unknown users, wrong passwords and disabled accounts all fail with the
    /// same message.
    #[instrument(skip(self, db, password))]
    pub async fn authenticate(
        &self,
        db: &DatabaseConnection,
        username: &str,
        password: &str,
    ) -> Result<Caller> {
        let Some(user) = self.find_by_username(db, username).await? else {
            debug!("Login attempt for unknown user '{}'", username);
            return Err(OfficeError::Authentication(BAD_CREDENTIALS.to_string()));
        };

        let matches = match verify_password(password, &user.password_hash) {
            Ok(matches) => matches,
            Err(e) => {
                warn!("Stored password hash of user {} is unusable: {}", user.id, e);
                false
            }
        };
        if !matches {
            debug!("Wrong password for user '{}'", username);
            return Err(OfficeError::Authentication(BAD_CREDENTIALS.to_string()));
        }
        if !user.enabled {
            debug!("Login attempt for disabled user '{}'", username);
            return Err(OfficeError::Authentication(BAD_CREDENTIALS.to_string()));
        }

        let roles = self.roles_of(db, user.id).await?;
        info!("User '{}' authenticated", username);
        Ok(Caller::new(user.id, user.username, roles))
    }

    /// Rebuilds the caller identity for an established session.
    pub async fn resolve_caller<C: ConnectionTrait>(&self, db: &C, user_id: i32) -> Result<Caller> {
        trace!("Resolving caller for user {}", user_id);
        match self.find_by_id(db, user_id).await? {
            Some(user) if user.enabled => {
                let roles = self.roles_of(db, user.id).await?;
                Ok(Caller::new(user.id, user.username, roles))
            }
            Some(_) => Err(OfficeError::Authentication("Account is disabled".to_string())),
            None => Err(OfficeError::Authentication("Account no longer exists".to_string())),
        }
    }

    /// Rejects a manager assignment that points at a missing user, at the user
    /// itself, or that would close a loop in the reporting line.
    pub async fn check_manager_assignment<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: i32,
        manager_id: i32,
    ) -> Result<()> {
        if manager_id == user_id {
            return Err(OfficeError::validation("A user cannot be their own manager"));
        }
        let Some(manager) = self.find_by_id(db, manager_id).await? else {
            return Err(OfficeError::validation(format!(
                "Manager with ID {} does not exist",
                manager_id
            )));
        };

        // Walk upwards from the candidate; meeting the user means a cycle.
        let mut visited = HashSet::from([manager.id]);
        let mut next = manager.manager_id;
        while let Some(current) = next {
            if current == user_id {
                warn!("Assigning manager {} to user {} would create a cycle", manager_id, user_id);
                return Err(OfficeError::validation(format!(
                    "Assigning manager {} to user {} would create a reporting cycle",
                    manager_id, user_id
                )));
            }
            if !visited.insert(current) {
                // An existing loop above the candidate that does not involve this user.
                break;
            }
            next = self.find_by_id(db, current).await?.and_then(|u| u.manager_id);
        }
        Ok(())
    }
}

/// Looks a role row up by name, creating it when missing.
pub async fn find_or_create_role<C: ConnectionTrait>(db: &C, name: RoleName) -> Result<role::Model> {
    if let Some(existing) = role::Entity::find()
        .filter(role::Column::Name.eq(name.as_str()))
        .one(db)
        .await?
    {
        return Ok(existing);
    }
    let created = role::ActiveModel {
        name: Set(name.as_str().to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Created role {}", created.name);
    Ok(created)
}

async fn replace_roles<C: ConnectionTrait>(db: &C, user_id: i32, roles: &[RoleName]) -> Result<()> {
    user_role::Entity::delete_many()
        .filter(user_role::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    for name in roles {
        let role = find_or_create_role(db, *name).await?;
        user_role::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(role.id),
        }
        .insert(db)
        .await?;
    }
    Ok(())
}
