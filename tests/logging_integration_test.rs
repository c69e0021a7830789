//! Integration tests for logging functionality
//!
//! The global subscriber can be installed once per process, so everything
//! that needs it lives in a single test.

use clinic::config::LoggingConfig;
use clinic::domain::ids::{AppointmentId, DoctorId, SlotId, UserId};
use clinic::logging::init_logging;
use clinic::{log_booking_attempt, log_booking_rejected, log_notification_outcome};
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
    assert!(!config.json_console);
}

#[test]
fn test_invalid_level_is_rejected_before_install() {
    let result = init_logging("verbose", &LoggingConfig::console_only());
    assert!(result.is_err());
}

#[test]
fn test_file_logging_writes_json_lines() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "daily".to_string(),
        json_console: false,
    };

    // The macros expand in this crate, outside the default `clinic=` filter
    std::env::set_var("RUST_LOG", "info");
    let guard = init_logging("info", &config).expect("logging should initialize");
    assert!(log_path.is_dir());

    log_booking_attempt!(UserId::new(1), DoctorId::new(2), SlotId::new(3));
    log_booking_rejected!(UserId::new(1), SlotId::new(3), "slot_full");
    log_notification_outcome!(AppointmentId::new(9), "skipped", "patient has no email address");

    // Dropping the guard flushes the background writer
    drop(guard);

    let contents: String = std::fs::read_dir(&log_path)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("clinic.log"))
        .map(|entry| std::fs::read_to_string(entry.path()).unwrap())
        .collect();

    assert!(contents.contains("\"Booking attempt\""));
    assert!(contents.contains("\"reason\":\"slot_full\""));
    assert!(contents.contains("\"outcome\":\"skipped\""));

    // A second install in the same process is refused
    assert!(init_logging("info", &LoggingConfig::console_only()).is_err());
}
