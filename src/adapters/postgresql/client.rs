//! PostgreSQL client implementation
//!
//! Wraps a `deadpool-postgres` pool. TLS is negotiated with `native-tls`
//! when `ssl_mode` is `require`, `verify-ca` or `verify-full`.

use crate::config::schema::PostgreSQLConfig;
use crate::domain::{ClinicError, ConflictKind, Result};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use postgres_native_tls::MakeTlsConnector;
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::config::SslMode;
use tokio_postgres::error::SqlState;
use tokio_postgres::{NoTls, Row};

/// Schema applied by [`PostgreSQLClient::ensure_schema`]
pub const INITIAL_SCHEMA: &str = include_str!("../../../migrations/001_initial_schema.sql");

/// PostgreSQL client for the clinic store
///
/// Provides connection pooling, the schema migration and thin query helpers
/// that apply the configured statement timeout.
pub struct PostgreSQLClient {
    pool: Pool,
    config: PostgreSQLConfig,
}

impl PostgreSQLClient {
    /// Create a new PostgreSQL client
    ///
    /// The pool connects lazily; call [`test_connection`](Self::test_connection)
    /// to verify the server is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string cannot be parsed, the TLS
    /// connector cannot be built, or the pool cannot be created.
    pub async fn new(config: PostgreSQLConfig) -> Result<Self> {
        let mut pg_config: tokio_postgres::Config = config
            .connection_string
            .expose_secret()
            .as_str()
            .parse()
            .map_err(|e| {
                ClinicError::Configuration(format!("Invalid PostgreSQL connection string: {}", e))
            })?;

        pg_config.connect_timeout(Duration::from_secs(config.connection_timeout_seconds));

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = if config.requires_tls() {
            pg_config.ssl_mode(SslMode::Require);
            let connector = build_tls_connector(&config.ssl_mode)?;
            Manager::from_config(pg_config, connector, manager_config)
        } else {
            if config.ssl_mode == "disable" {
                pg_config.ssl_mode(SslMode::Disable);
            }
            Manager::from_config(pg_config, NoTls, manager_config)
        };

        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .wait_timeout(Some(Duration::from_secs(config.connection_timeout_seconds)))
            .create_timeout(Some(Duration::from_secs(config.connection_timeout_seconds)))
            .recycle_timeout(Some(Duration::from_secs(config.connection_timeout_seconds)))
            .runtime(deadpool_postgres::Runtime::Tokio1)
            .build()
            .map_err(|e| {
                ClinicError::Database(format!("Failed to create connection pool: {}", e))
            })?;

        Ok(Self { pool, config })
    }

    /// Test the connection to PostgreSQL
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.get_connection().await?;

        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| ClinicError::Database(format!("Connection test failed: {}", e)))?;

        tracing::info!(
            target_db = %self.connection_string_safe(),
            "PostgreSQL connection test successful"
        );
        Ok(())
    }

    /// Run the schema migration
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.get_connection().await?;

        client
            .batch_execute(INITIAL_SCHEMA)
            .await
            .map_err(|e| ClinicError::Database(format!("Failed to execute migration: {}", e)))?;

        tracing::info!("PostgreSQL schema initialized successfully");
        Ok(())
    }

    /// Get a connection from the pool with the statement timeout applied
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be obtained.
    pub async fn get_connection(&self) -> Result<deadpool_postgres::Object> {
        let client = self.pool.get().await.map_err(|e| {
            ClinicError::Database(format!("Failed to get connection from pool: {}", e))
        })?;

        let timeout_query = format!(
            "SET statement_timeout = {}",
            self.config.statement_timeout_seconds * 1000
        );
        client.batch_execute(&timeout_query).await.map_err(|e| {
            ClinicError::Database(format!("Failed to set statement timeout: {}", e))
        })?;

        Ok(client)
    }

    /// Execute a query and return rows
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn query(
        &self,
        query: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<Vec<Row>> {
        let client = self.get_connection().await?;
        client.query(query, params).await.map_err(map_db_error)
    }

    /// Execute a query expected to return at most one row
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or yields more than one row.
    pub async fn query_opt(
        &self,
        query: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<Option<Row>> {
        let client = self.get_connection().await?;
        client.query_opt(query, params).await.map_err(map_db_error)
    }

    /// Execute a query that must return exactly one row
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails. Uniqueness violations are
    /// reported as [`ClinicError::Conflict`].
    pub async fn query_one(
        &self,
        query: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<Row> {
        let client = self.get_connection().await?;
        client.query_one(query, params).await.map_err(map_db_error)
    }

    /// Get the connection string (without password)
    pub fn connection_string_safe(&self) -> String {
        redact_connection_string(self.config.connection_string.expose_secret().as_str())
    }

    /// Get the pool statistics
    pub fn pool_status(&self) -> deadpool_postgres::Status {
        self.pool.status()
    }
}

fn build_tls_connector(ssl_mode: &str) -> Result<MakeTlsConnector> {
    let mut builder = native_tls::TlsConnector::builder();
    match ssl_mode {
        // libpq semantics: `require` encrypts without verifying the server
        "require" => {
            builder.danger_accept_invalid_certs(true);
        }
        "verify-ca" => {
            builder.danger_accept_invalid_hostnames(true);
        }
        _ => {}
    }
    let connector = builder
        .build()
        .map_err(|e| ClinicError::Configuration(format!("Failed to build TLS connector: {e}")))?;
    Ok(MakeTlsConnector::new(connector))
}

/// Replaces credentials in a connection string with `***`
pub fn redact_connection_string(connection_string: &str) -> String {
    connection_string
        .rsplit_once('@')
        .map(|(_, host)| format!("postgresql://***@{}", host))
        .unwrap_or_else(|| "postgresql://***".to_string())
}

/// Maps a driver error to a clinic error
///
/// Uniqueness violations become [`ClinicError::Conflict`], keyed by the
/// constraint names in the migration.
pub fn map_db_error(err: tokio_postgres::Error) -> ClinicError {
    if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        let constraint = err
            .as_db_error()
            .and_then(|db| db.constraint())
            .unwrap_or_default();
        if let Some(kind) = conflict_for_constraint(constraint) {
            return ClinicError::Conflict(kind);
        }
    }
    if err.code() == Some(&SqlState::CHECK_VIOLATION) {
        return ClinicError::Validation(err.to_string());
    }
    if err.code() == Some(&SqlState::FOREIGN_KEY_VIOLATION) {
        let detail = err
            .as_db_error()
            .and_then(|db| db.detail())
            .unwrap_or("referenced record does not exist");
        return ClinicError::NotFound(detail.to_string());
    }
    ClinicError::Database(err.to_string())
}

fn conflict_for_constraint(constraint: &str) -> Option<ConflictKind> {
    match constraint {
        "appointments_patient_timeslot_key" => Some(ConflictKind::DuplicateBooking),
        "prescriptions_appointment_id_key" => Some(ConflictKind::DuplicatePrescription),
        "specialties_name_key" => Some(ConflictKind::DuplicateSpecialty),
        "time_slots_doctor_date_start_key" => Some(ConflictKind::DuplicateTimeSlot),
        "users_username_key" => Some(ConflictKind::DuplicateUsername),
        "doctors_user_id_key" | "patients_user_id_key" => Some(ConflictKind::UserAlreadyLinked),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_string_safe() {
        let safe = redact_connection_string("postgresql://user:p@ss@localhost:5432/clinic");
        assert!(!safe.contains("p@ss"));
        assert_eq!(safe, "postgresql://***@localhost:5432/clinic");
    }

    #[test]
    fn test_connection_string_without_credentials() {
        assert_eq!(
            redact_connection_string("host=localhost dbname=clinic"),
            "postgresql://***"
        );
    }

    #[test]
    fn test_constraint_mapping_covers_migration() {
        for (name, kind) in [
            (
                "appointments_patient_timeslot_key",
                ConflictKind::DuplicateBooking,
            ),
            (
                "prescriptions_appointment_id_key",
                ConflictKind::DuplicatePrescription,
            ),
            ("specialties_name_key", ConflictKind::DuplicateSpecialty),
            (
                "time_slots_doctor_date_start_key",
                ConflictKind::DuplicateTimeSlot,
            ),
            ("users_username_key", ConflictKind::DuplicateUsername),
            ("patients_user_id_key", ConflictKind::UserAlreadyLinked),
        ] {
            assert_eq!(conflict_for_constraint(name), Some(kind));
            assert!(INITIAL_SCHEMA.contains(name), "{name} missing from schema");
        }
        assert_eq!(conflict_for_constraint("something_else"), None);
    }

    #[test]
    fn test_tls_connector_builds_for_each_mode() {
        for mode in ["require", "verify-ca", "verify-full"] {
            assert!(build_tls_connector(mode).is_ok());
        }
    }

    #[tokio::test]
    async fn test_new_rejects_malformed_connection_string() {
        let config = PostgreSQLConfig {
            connection_string: crate::config::secret_string(
                "postgresql://user@localhost:notaport/clinic".to_string(),
            ),
            max_connections: 4,
            connection_timeout_seconds: 1,
            statement_timeout_seconds: 1,
            ssl_mode: "prefer".to_string(),
        };
        let err = PostgreSQLClient::new(config).await.err().unwrap();
        assert!(matches!(err, ClinicError::Configuration(_)));
    }
}
