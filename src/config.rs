use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::NaiveTime;
use config::{Config, Environment, File};
use migration::{Migrator, MigratorTrait};
use office::seed::{BootstrapOptions, bootstrap};
use office::{AttendanceTracker, Office};
use sea_orm::{Database, DatabaseConnection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::schemas::AppState;
use crate::session::SessionStore;

/// Application settings, layered from defaults, `oa.toml` and `OA_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    pub session: SessionSettings,
    pub cors: CorsSettings,
    pub attendance: AttendanceSettings,
    pub bootstrap: BootstrapSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Minutes of inactivity after which a session expires
    pub idle_minutes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsSettings {
    /// Browser origin allowed to call the API with credentials
    pub allowed_origin: String,
}

/// Accepted range for `attendance.history_days`.
const HISTORY_DAYS_RANGE: std::ops::RangeInclusive<i64> = 1..=3650;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceSettings {
    /// Check-ins after this time are late
    pub work_start: NaiveTime,
    /// Default length of the attendance history window
    pub history_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapSettings {
    pub admin_username: String,
    pub admin_password: String,
    pub employee_username: String,
    pub employee_password: String,
    pub demo_employee: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://oa.db?mode=rwc".to_string(),
            bind_address: "0.0.0.0:3000".to_string(),
            session: SessionSettings { idle_minutes: 30 },
            cors: CorsSettings {
                allowed_origin: "http://localhost:5173".to_string(),
            },
            attendance: AttendanceSettings {
                work_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
                history_days: 30,
            },
            bootstrap: BootstrapSettings {
                admin_username: "admin".to_string(),
                admin_password: "123456".to_string(),
                employee_username: "emp".to_string(),
                employee_password: "123456".to_string(),
                demo_employee: true,
            },
        }
    }
}

impl Settings {
    /// Loads settings from the built-in defaults, the optional config file and the environment.
    pub fn load(config_file: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name(config_file).required(false))
            .add_source(
                Environment::with_prefix("OA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize::<Settings>()
            .context("Invalid configuration")?;
        settings.validate()?;
        debug!("Configuration loaded: {:?}", settings.redacted());
        Ok(settings)
    }

    /// Rejects values the services cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !HISTORY_DAYS_RANGE.contains(&self.attendance.history_days) {
            bail!(
                "attendance.history_days must be between {} and {}, got {}",
                HISTORY_DAYS_RANGE.start(),
                HISTORY_DAYS_RANGE.end(),
                self.attendance.history_days
            );
        }
        Ok(())
    }

    /// Copy safe to log, with passwords masked.
    pub fn redacted(&self) -> Settings {
        let mut copy = self.clone();
        copy.bootstrap.admin_password = "***".to_string();
        copy.bootstrap.employee_password = "***".to_string();
        copy
    }

    pub fn bootstrap_options(&self) -> BootstrapOptions {
        BootstrapOptions {
            admin_username: self.bootstrap.admin_username.clone(),
            admin_password: self.bootstrap.admin_password.clone(),
            employee_username: self.bootstrap.employee_username.clone(),
            employee_password: self.bootstrap.employee_password.clone(),
            demo_employee: self.bootstrap.demo_employee,
        }
    }

    pub fn attendance_tracker(&self) -> AttendanceTracker {
        AttendanceTracker::new(self.attendance.work_start, self.attendance.history_days)
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session.idle_minutes.saturating_mul(60))
    }
}

/// Connects to the database, applies pending migrations and seeds the bootstrap accounts.
pub async fn prepare_database(settings: &Settings) -> Result<DatabaseConnection> {
    info!("Connecting to database: {}", settings.database_url);
    let db = Database::connect(&settings.database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", settings.database_url))?;

    info!("Running database migrations");
    Migrator::up(&db, None)
        .await
        .context("Failed to run database migrations")?;

    bootstrap(&db, &settings.bootstrap_options())
        .await
        .context("Failed to seed bootstrap accounts")?;
    Ok(db)
}

/// Builds the shared handler state around an open connection.
pub fn build_app_state(db: DatabaseConnection, settings: Settings) -> AppState {
    AppState {
        db,
        office: Arc::new(Office::new(settings.attendance_tracker())),
        sessions: SessionStore::new(settings.session_idle_timeout()),
        settings: Arc::new(settings),
    }
}

/// Initialize application state: database ready, sessions empty.
pub async fn initialize_app_state(settings: Settings) -> Result<AppState> {
    let db = prepare_database(&settings).await?;
    Ok(build_app_state(db, settings))
}
