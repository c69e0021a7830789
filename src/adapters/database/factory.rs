//! Store factory
//!
//! Builds the store selected by `database_target` in the configuration.

use crate::adapters::database::traits::ClinicStore;
use crate::adapters::memory::MemoryStore;
use crate::adapters::postgresql::adapter::PostgreSQLAdapter;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::config::schema::{ClinicConfig, DatabaseTarget};
use crate::domain::{ClinicError, Result};
use std::sync::Arc;

/// Create a clinic store based on the configuration
///
/// # Errors
///
/// Returns an error if the PostgreSQL section is missing or the pool
/// cannot be created.
pub async fn create_store(config: &ClinicConfig) -> Result<Arc<dyn ClinicStore + Send + Sync>> {
    match config.database_target {
        DatabaseTarget::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                ClinicError::Configuration(
                    "postgresql configuration is required when database_target = 'postgresql'"
                        .to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL store");
            let client = PostgreSQLClient::new(pg_config.clone()).await?;
            Ok(Arc::new(PostgreSQLAdapter::new(client)) as Arc<dyn ClinicStore + Send + Sync>)
        }
        DatabaseTarget::Memory => {
            tracing::warn!("Using in-memory store; data is lost on exit");
            Ok(Arc::new(MemoryStore::new()) as Arc<dyn ClinicStore + Send + Sync>)
        }
    }
}
