use model::entities::user;
use sea_orm::DatabaseConnection;
use tracing::{debug, info, instrument};

use crate::directory::{NewUser, UserDirectory, find_or_create_role};
use crate::error::Result;
use crate::identity::RoleName;

/// Accounts created on first start.
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    pub admin_username: String,
    pub admin_password: String,
    pub employee_username: String,
    pub employee_password: String,
    /// Also create the demo employee account.
    pub demo_employee: bool,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            admin_username: "admin".to_string(),
            admin_password: "123456".to_string(),
            employee_username: "emp".to_string(),
            employee_password: "123456".to_string(),
            demo_employee: true,
        }
    }
}

/// Creates `ROLE_ADMIN` and `ROLE_EMP` if they are missing.
pub async fn ensure_roles(db: &DatabaseConnection) -> Result<()> {
    for name in RoleName::ALL {
        find_or_create_role(db, name).await?;
    }
    Ok(())
}

/// Creates the account unless the username is already taken.
///
/// Returns `None` when the user already existed.
pub async fn ensure_user(
    db: &DatabaseConnection,
    username: &str,
    real_name: &str,
    password: &str,
    role: RoleName,
) -> Result<Option<user::Model>> {
    let directory = UserDirectory::new();
    if directory.find_by_username(db, username).await?.is_some() {
        debug!("User '{}' already present, skipping", username);
        return Ok(None);
    }

    let created = directory
        .create_user(
            db,
            NewUser {
                username: username.to_string(),
                password: password.to_string(),
                real_name: real_name.to_string(),
                roles: vec![role],
                ..Default::default()
            },
        )
        .await?;
    Ok(Some(created))
}

/// Seeds roles plus the admin and optional demo employee. Safe to run on every start.
#[instrument(skip(db, options))]
pub async fn bootstrap(db: &DatabaseConnection, options: &BootstrapOptions) -> Result<()> {
    ensure_roles(db).await?;

    if ensure_user(
        db,
        &options.admin_username,
        "Administrator",
        &options.admin_password,
        RoleName::Admin,
    )
    .await?
    .is_some()
    {
        info!("Seeded admin account '{}'", options.admin_username);
    }

    if options.demo_employee
        && ensure_user(
            db,
            &options.employee_username,
            "Demo Employee",
            &options.employee_password,
            RoleName::Emp,
        )
        .await?
        .is_some()
    {
        info!("Seeded demo employee '{}'", options.employee_username);
    }

    Ok(())
}
