//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the clinic using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Clinic - appointment booking and records service
#[derive(Parser, Debug)]
#[command(name = "clinic")]
#[command(version, about, long_about = None)]
#[command(author = "Clinic Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "clinic.toml", env = "CLINIC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CLINIC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the web application
    Serve(commands::serve::ServeArgs),

    /// Create database tables and indexes
    Migrate(commands::migrate::MigrateArgs),

    /// Write the daily appointments CSV
    Report(commands::report::ReportArgs),

    /// Create a login account, optionally with a patient profile
    CreateUser(commands::create_user::CreateUserArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
