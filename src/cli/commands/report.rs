//! Report command implementation
//!
//! Writes the daily appointments CSV for one date to stdout or a file.

use crate::adapters::database::create_store;
use crate::config::load_config;
use crate::core::DailyReport;
use chrono::{Local, NaiveDate};
use clap::Args;
use std::io::Write;

/// Arguments for the report command
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Report date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Output file; `-` or omitted writes to stdout
    #[arg(short, long)]
    pub output: Option<String>,
}

impl ReportArgs {
    /// Execute the report command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let store = match create_store(&config).await {
            Ok(store) => store,
            Err(e) => {
                eprintln!("❌ Failed to connect to database: {e}");
                return Ok(4);
            }
        };

        let date = self.date.unwrap_or_else(|| Local::now().date_naive());
        let report = match DailyReport::build(store.as_ref(), date).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(error = %e, %date, "Failed to build daily report");
                eprintln!("❌ Failed to build report: {e}");
                return Ok(5);
            }
        };
        let csv = report.to_csv();

        match self.output.as_deref() {
            None | Some("-") => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(csv.as_bytes())?;
                stdout.flush()?;
            }
            Some(path) => {
                if let Err(e) = std::fs::write(path, &csv) {
                    eprintln!("❌ Failed to write {path}: {e}");
                    return Ok(5);
                }
                eprintln!("✅ Wrote {} appointments to {path}", report.rows.len());
            }
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_report_to_file_from_empty_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("clinic.toml");
        std::fs::write(
            &config_path,
            "database_target = \"memory\"\n[logging]\nlocal_enabled = false\n",
        )
        .unwrap();
        let out = dir.path().join("report.csv");

        let args = ReportArgs {
            date: NaiveDate::from_ymd_opt(2026, 3, 2),
            output: Some(out.to_string_lossy().to_string()),
        };
        assert_eq!(args.execute(&config_path.to_string_lossy()).await.unwrap(), 0);

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written, "patient,doctor,date,start,status\r\n");
    }
}
