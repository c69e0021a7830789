//! Migrate command implementation
//!
//! Creates the clinic tables and indexes. Safe to run repeatedly.

use crate::adapters::database::create_store;
use crate::config::load_config;
use clap::Args;

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {}

impl MigrateArgs {
    /// Execute the migrate command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        println!("🗄️  Applying schema");

        let store = match create_store(&config).await {
            Ok(store) => store,
            Err(e) => {
                eprintln!("❌ Failed to connect to database: {e}");
                return Ok(4);
            }
        };

        match store.ensure_schema().await {
            Ok(()) => {
                tracing::info!(store = store.backend_name(), "Schema applied");
                println!("✅ Schema is up to date ({})", store.backend_name());
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, "Schema migration failed");
                eprintln!("❌ Migration failed: {e}");
                Ok(5)
            }
        }
    }
}
