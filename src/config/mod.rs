//! Configuration management for the clinic service.
//!
//! # Overview
//!
//! The clinic reads a single TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CLINIC_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use clinic::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("clinic.toml")?;
//! println!("Listening on {}", config.server.bind_address);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and environment
//! - [`PostgreSQLConfig`] - Connection pool settings
//! - [`ServerConfig`] - Bind address, media root, upload limit, sessions
//! - [`NotificationConfig`] - Booking confirmation delivery
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! database_target = "postgresql"
//!
//! [application]
//! log_level = "info"
//! environment = "production"
//!
//! [postgresql]
//! connection_string = "${CLINIC_DATABASE_URL}"
//! ssl_mode = "require"
//!
//! [server]
//! bind_address = "0.0.0.0:8000"
//! media_root = "/srv/clinic/media"
//! secure_cookies = true
//!
//! [notification]
//! backend = "http"
//! relay_url = "https://mail-relay.internal/send"
//! relay_token = "${CLINIC_RELAY_TOKEN}"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_str};
pub use schema::{
    ApplicationConfig, ClinicConfig, DatabaseTarget, Environment, LoggingConfig,
    NotificationBackend, NotificationConfig, PostgreSQLConfig, ServerConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
