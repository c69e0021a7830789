//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{ClinicConfig, DatabaseTarget, Environment, NotificationBackend};
use super::secret::secret_string;
use crate::domain::errors::ClinicError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ClinicConfig
/// 4. Applies environment variable overrides (CLINIC_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use clinic::config::loader::load_config;
///
/// let config = load_config("clinic.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ClinicConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ClinicError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ClinicError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_str(&contents)
}

/// Parses, overrides and validates configuration from TOML text
///
/// # Errors
///
/// Same as [`load_config`], minus file access.
pub fn load_config_str(contents: &str) -> Result<ClinicConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: ClinicConfig = toml::from_str(&contents)
        .map_err(|e| ClinicError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        ClinicError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

fn env_var_pattern() -> Result<Regex> {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ClinicError::Configuration(format!("Invalid substitution pattern: {e}")))
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern()?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ClinicError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        ClinicError::Configuration(format!("Invalid value for {name}: '{value}'"))
    })
}

/// Applies environment variable overrides using the CLINIC_* prefix
///
/// Environment variables follow the pattern: CLINIC_<SECTION>_<KEY>
/// For example: CLINIC_SERVER_BIND_ADDRESS, CLINIC_POSTGRESQL_CONNECTION_STRING
fn apply_env_overrides(config: &mut ClinicConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("CLINIC_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("CLINIC_APPLICATION_ENVIRONMENT") {
        config.application.environment = match val.to_lowercase().as_str() {
            "development" => Environment::Development,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            other => {
                return Err(ClinicError::Configuration(format!(
                    "Invalid value for CLINIC_APPLICATION_ENVIRONMENT: '{other}'"
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("CLINIC_DATABASE_TARGET") {
        config.database_target = match val.to_lowercase().as_str() {
            "postgresql" => DatabaseTarget::PostgreSQL,
            "memory" => DatabaseTarget::Memory,
            other => {
                return Err(ClinicError::Configuration(format!(
                    "Invalid value for CLINIC_DATABASE_TARGET: '{other}'"
                )))
            }
        };
    }

    // PostgreSQL overrides (only if PostgreSQL is configured)
    if let Some(ref mut pg) = config.postgresql {
        if let Ok(val) = std::env::var("CLINIC_POSTGRESQL_CONNECTION_STRING") {
            pg.connection_string = secret_string(val);
        }
        if let Ok(val) = std::env::var("CLINIC_POSTGRESQL_MAX_CONNECTIONS") {
            pg.max_connections = parse_override("CLINIC_POSTGRESQL_MAX_CONNECTIONS", &val)?;
        }
        if let Ok(val) = std::env::var("CLINIC_POSTGRESQL_SSL_MODE") {
            pg.ssl_mode = val;
        }
    }

    // Server overrides
    if let Ok(val) = std::env::var("CLINIC_SERVER_BIND_ADDRESS") {
        config.server.bind_address = val;
    }
    if let Ok(val) = std::env::var("CLINIC_SERVER_MEDIA_ROOT") {
        config.server.media_root = val;
    }
    if let Ok(val) = std::env::var("CLINIC_SERVER_MAX_UPLOAD_MB") {
        config.server.max_upload_mb = parse_override("CLINIC_SERVER_MAX_UPLOAD_MB", &val)?;
    }
    if let Ok(val) = std::env::var("CLINIC_SERVER_SESSION_TTL_MINUTES") {
        config.server.session_ttl_minutes =
            parse_override("CLINIC_SERVER_SESSION_TTL_MINUTES", &val)?;
    }
    if let Ok(val) = std::env::var("CLINIC_SERVER_SECURE_COOKIES") {
        config.server.secure_cookies = parse_override("CLINIC_SERVER_SECURE_COOKIES", &val)?;
    }

    // Notification overrides
    if let Ok(val) = std::env::var("CLINIC_NOTIFICATION_BACKEND") {
        config.notification.backend = match val.to_lowercase().as_str() {
            "log" => NotificationBackend::Log,
            "http" => NotificationBackend::Http,
            "disabled" => NotificationBackend::Disabled,
            other => {
                return Err(ClinicError::Configuration(format!(
                    "Invalid value for CLINIC_NOTIFICATION_BACKEND: '{other}'"
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("CLINIC_NOTIFICATION_FROM_ADDRESS") {
        config.notification.from_address = val;
    }
    if let Ok(val) = std::env::var("CLINIC_NOTIFICATION_RELAY_URL") {
        config.notification.relay_url = Some(val);
    }
    if let Ok(val) = std::env::var("CLINIC_NOTIFICATION_RELAY_TOKEN") {
        config.notification.relay_token = Some(secret_string(val));
    }

    // Logging overrides
    if let Ok(val) = std::env::var("CLINIC_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("CLINIC_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("CLINIC_LOGGING_JSON_CONSOLE") {
        config.logging.json_console = val.parse().unwrap_or(false);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("CLINIC_LOADER_TEST_VAR", "test_value");
        let input = "password = \"${CLINIC_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result.trim_end(), "password = \"test_value\"");
        std::env::remove_var("CLINIC_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("CLINIC_LOADER_MISSING_VAR");
        let input = "password = \"${CLINIC_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("CLINIC_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        let input = "# token = \"${CLINIC_LOADER_NEVER_SET}\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${CLINIC_LOADER_NEVER_SET}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
database_target = "memory"

[application]
log_level = "debug"

[server]
bind_address = "0.0.0.0:9000"
media_root = "/srv/clinic/media"
max_upload_mb = 20

[notification]
backend = "disabled"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.database_target, DatabaseTarget::Memory);
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.server.bind_address, "0.0.0.0:9000");
        assert_eq!(config.server.max_upload_mb, 20);
        assert_eq!(config.notification.backend, NotificationBackend::Disabled);
        assert_eq!(config.server.session_ttl_minutes, 480);
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let toml_content = r#"
database_target = "memory"

[server]
max_upload_mb = 0
"#;
        let err = load_config_str(toml_content).unwrap_err();
        assert!(err.to_string().contains("max_upload_mb"));
    }

    #[test]
    fn test_parse_override() {
        let n: usize = parse_override("X", " 12 ").unwrap();
        assert_eq!(n, 12);
        assert!(parse_override::<usize>("X", "twelve").is_err());
    }
}
