use anyhow::Result;
use tracing::{error, info, trace};

use crate::config::{Settings, prepare_database};

pub async fn init_database(settings: &Settings) -> Result<()> {
    trace!("Entering init_database function");
    info!("Initializing database");

    match prepare_database(settings).await {
        Ok(_) => {
            info!("Database migrations and seeding completed successfully");
        }
        Err(e) => {
            error!("Database initialization failed: {:#}", e);
            return Err(e);
        }
    }

    info!("Database initialization completed successfully!");
    Ok(())
}
