//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "clinic.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing clinic configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Set database_target to 'postgresql' or 'memory'");
                println!("  3. Put secrets in a .env file:");
                println!("     - CLINIC_DATABASE_URL (PostgreSQL connection string)");
                println!("     - CLINIC_RELAY_TOKEN (if notification.backend = 'http')");
                println!("  4. Validate configuration: clinic validate-config");
                println!("  5. Create the schema: clinic migrate");
                println!("  6. Create an account: clinic create-user --username frontdesk --staff");
                println!("  7. Start the server: clinic serve");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Clinic Configuration File

# Storage backend (postgresql or memory)
database_target = "postgresql"

[application]
log_level = "info"
environment = "development"

[postgresql]
connection_string = "${CLINIC_DATABASE_URL}"
max_connections = 10
ssl_mode = "prefer"

[server]
bind_address = "127.0.0.1:8000"
media_root = "./media"
max_upload_mb = 10

[notification]
backend = "log"
from_address = "clinic@example.com"

[logging]
local_enabled = false
local_path = "/var/log/clinic"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Clinic Configuration File
#
# Values of the form ${VAR} are read from the environment (or a .env file).
# Any key can also be overridden with CLINIC_<SECTION>_<KEY>, for example
# CLINIC_SERVER_BIND_ADDRESS=0.0.0.0:8000.

# ============================================================================
# Storage Backend
# ============================================================================
# postgresql: persistent storage (required in production)
# memory: in-process tables, lost on restart; for demos and development
database_target = "postgresql"

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
log_level = "info"

# Runtime environment (development, staging, production)
# production requires database_target = "postgresql" and secure_cookies = true
environment = "development"

# ============================================================================
# PostgreSQL
# ============================================================================
[postgresql]
# Connection string format: postgresql://[user[:password]@][host][:port][/dbname]
connection_string = "${CLINIC_DATABASE_URL}"

# Connection pool settings
max_connections = 10                # Maximum connections in pool (1-100)
connection_timeout_seconds = 30     # Timeout for establishing a connection
statement_timeout_seconds = 60      # Timeout for SQL statement execution

# SSL/TLS mode: disable | allow | prefer | require | verify-ca | verify-full
ssl_mode = "prefer"

# ============================================================================
# HTTP Server
# ============================================================================
[server]
# Socket address to listen on
bind_address = "127.0.0.1:8000"

# Uploaded files (prescriptions, test results) are stored here
# and served back under /media/
media_root = "./media"

# Largest accepted upload in megabytes (1-100)
max_upload_mb = 10

# Login session lifetime in minutes
session_ttl_minutes = 480

# Mark the session cookie Secure; must be true in production
secure_cookies = false

# ============================================================================
# Booking Confirmations
# ============================================================================
[notification]
# log: write messages to the log instead of sending them
# http: POST {from, to, subject, body} as JSON to relay_url
# disabled: send nothing
backend = "log"

# Sender address
from_address = "clinic@example.com"

# Mail relay endpoint and bearer token (http backend only)
# relay_url = "https://mail-relay.example.com/send"
# relay_token = "${CLINIC_RELAY_TOKEN}"

# Relay request timeout in seconds
timeout_seconds = 10

# ============================================================================
# Logging
# ============================================================================
[logging]
# Write JSON logs to local_path/clinic.log
local_enabled = true

# Local log directory
local_path = "/var/log/clinic"

# Log rotation (daily or hourly)
local_rotation = "daily"

# Emit console logs as JSON
json_console = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_str;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "clinic.toml".to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "clinic.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_generated_configs_parse() {
        std::env::set_var("CLINIC_DATABASE_URL", "postgresql://clinic@localhost/clinic");
        for content in [
            InitArgs::generate_minimal_config(),
            InitArgs::generate_config_with_examples(),
        ] {
            let config = load_config_str(&content).unwrap();
            assert!(config.validate().is_ok());
        }
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("clinic.toml");
        std::fs::write(&path, "existing").unwrap();

        let args = InitArgs {
            output: path.to_string_lossy().to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing");
    }
}
