use anyhow::{Result, bail};
use office::RoleName;
use office::directory::{NewUser, UserDirectory};
use tracing::{error, info};

use crate::config::{Settings, prepare_database};

/// Creates an administrator account from the command line.
pub async fn create_admin(
    settings: &Settings,
    username: &str,
    password: &str,
    real_name: Option<&str>,
) -> Result<()> {
    let db = prepare_database(settings).await?;
    let directory = UserDirectory::new();

    if directory.find_by_username(&db, username).await?.is_some() {
        error!("User '{}' already exists", username);
        bail!("User '{}' already exists", username);
    }

    let created = directory
        .create_user(
            &db,
            NewUser {
                username: username.to_string(),
                password: password.to_string(),
                real_name: real_name.unwrap_or(username).to_string(),
                roles: vec![RoleName::Admin, RoleName::Emp],
                ..Default::default()
            },
        )
        .await?;

    info!("Created administrator '{}' with ID {}", created.username, created.id);
    Ok(())
}
