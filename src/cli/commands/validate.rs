//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the clinic configuration file.

use crate::adapters::postgresql::client::redact_connection_string;
use crate::config::load_config;
use crate::config::schema::{DatabaseTarget, NotificationBackend};
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading also validates
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.application.environment);
        println!("  Log Level: {}", config.application.log_level);

        match config.database_target {
            DatabaseTarget::PostgreSQL => {
                if let Some(ref pg_config) = config.postgresql {
                    println!("  Database Target: PostgreSQL");
                    println!(
                        "  PostgreSQL Connection: {}",
                        redact_connection_string(pg_config.connection_string.expose_secret().as_str())
                    );
                    println!("  Max Connections: {}", pg_config.max_connections);
                    println!("  SSL Mode: {}", pg_config.ssl_mode);
                }
            }
            DatabaseTarget::Memory => {
                println!("  Database Target: in-memory (data is lost on restart)");
            }
        }

        println!("  Bind Address: {}", config.server.bind_address);
        println!("  Media Root: {}", config.server.media_root);
        println!("  Max Upload: {} MB", config.server.max_upload_mb);
        println!("  Session TTL: {} minutes", config.server.session_ttl_minutes);
        println!("  Secure Cookies: {}", config.server.secure_cookies);

        match config.notification.backend {
            NotificationBackend::Log => println!("  Notifications: log"),
            NotificationBackend::Disabled => println!("  Notifications: disabled"),
            NotificationBackend::Http => println!(
                "  Notifications: http relay {}",
                config.notification.relay_url.as_deref().unwrap_or("-")
            ),
        }
        println!("  From Address: {}", config.notification.from_address);

        if config.logging.local_enabled {
            println!(
                "  File Logging: {} ({})",
                config.logging.local_path, config.logging.local_rotation
            );
        } else {
            println!("  File Logging: disabled");
        }
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let args = ValidateArgs {};
        let code = args.execute("/nonexistent/clinic.toml").await.unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_valid_memory_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("clinic.toml");
        std::fs::write(
            &path,
            "database_target = \"memory\"\n[logging]\nlocal_enabled = false\n",
        )
        .unwrap();

        let code = ValidateArgs {}
            .execute(&path.to_string_lossy())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }
}
