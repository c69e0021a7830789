//! Serve command implementation
//!
//! Loads the configuration, connects the store and notifier, and runs the
//! HTTP server until SIGINT or SIGTERM.

use crate::adapters::database::{create_store, ClinicStore};
use crate::adapters::notify::create_notifier;
use crate::config::load_config;
use crate::config::schema::DatabaseTarget;
use crate::core::Accounts;
use crate::domain::{NewDoctor, NewPatient, NewTimeSlot, Result};
use crate::logging::init_logging;
use crate::web::{self, AppState};
use chrono::{Days, Local, NaiveTime};
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override server.bind_address
    #[arg(long)]
    pub bind: Option<String>,

    /// Seed a demo doctor, time slots and a `demo` account (memory store only)
    #[arg(long)]
    pub demo: bool,

    /// Password for the demo account
    #[arg(long, env = "CLINIC_DEMO_PASSWORD", default_value = "demo-password")]
    pub demo_password: String,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(
        &self,
        config_path: &str,
        log_level: Option<&str>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(2);
            }
        };
        if let Some(bind) = &self.bind {
            config.server.bind_address = bind.clone();
            if let Err(e) = config.validate() {
                eprintln!("❌ Invalid --bind: {e}");
                return Ok(2);
            }
        }

        let level = log_level.unwrap_or(&config.application.log_level).to_string();
        let _guard = match init_logging(&level, &config.logging) {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("Failed to initialize logging: {e}");
                return Ok(5);
            }
        };

        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            environment = ?config.application.environment,
            "Starting clinic server"
        );

        if self.demo && config.database_target != DatabaseTarget::Memory {
            eprintln!("❌ --demo requires database_target = \"memory\"");
            return Ok(2);
        }

        let store = match create_store(&config).await {
            Ok(store) => store,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create store");
                eprintln!("❌ Failed to connect to database: {e}");
                return Ok(4);
            }
        };
        if let Err(e) = store.test_connection().await {
            tracing::error!(error = %e, "Store connection test failed");
            eprintln!("❌ Failed to connect to database: {e}");
            return Ok(4);
        }
        if let Err(e) = store.ensure_schema().await {
            tracing::error!(error = %e, "Schema migration failed");
            eprintln!("❌ Failed to apply schema: {e}");
            return Ok(5);
        }

        let notifier = match create_notifier(&config.notification) {
            Ok(notifier) => notifier,
            Err(e) => {
                eprintln!("❌ Invalid notification settings: {e}");
                return Ok(2);
            }
        };

        if self.demo {
            seed_demo(store.clone(), &self.demo_password).await?;
            println!("🧪 Demo data loaded; log in as 'demo'");
        }

        let state = AppState::new(store, notifier, &config.server, &config.notification);
        println!("🏥 Clinic listening on http://{}", config.server.bind_address);

        match web::serve(state, &config.server.bind_address, shutdown_signal).await {
            Ok(()) => {
                tracing::info!("Server stopped");
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, "Server failed");
                eprintln!("❌ Server error: {e}");
                Ok(5)
            }
        }
    }
}

/// Fill an empty store with one doctor, a week of slots and a patient login
pub async fn seed_demo(store: Arc<dyn ClinicStore + Send + Sync>, password: &str) -> Result<()> {
    let specialty = store.insert_specialty("General Practice").await?;
    let doctor = store
        .insert_doctor(
            NewDoctor::named("Ana Ruiz")
                .with_specialty(specialty.id)
                .with_bio("Family medicine and preventive care."),
        )
        .await?;

    let today = Local::now().date_naive();
    for offset in 0..7u64 {
        let Some(date) = today.checked_add_days(Days::new(offset)) else {
            continue;
        };
        for hour in [9, 10, 11] {
            let (Some(start), Some(end)) = (
                NaiveTime::from_hms_opt(hour, 0, 0),
                NaiveTime::from_hms_opt(hour, 30, 0),
            ) else {
                continue;
            };
            let slot = NewTimeSlot::builder()
                .doctor(doctor.id)
                .date(date)
                .window(start, end)
                .capacity(2)
                .build()
                .map_err(crate::domain::ClinicError::Validation)?;
            store.insert_timeslot(slot).await?;
        }
    }

    let accounts = Accounts::new(store);
    let user = accounts.register_user("demo", password, false).await?;
    accounts
        .link_patient(
            &user,
            NewPatient::named("Demo Patient").with_email("demo@example.com"),
        )
        .await?;

    tracing::info!(doctor_id = %doctor.id, user_id = %user.id, "Seeded demo data");
    Ok(())
}
