//! Daily appointment report
//!
//! Lists every appointment whose time slot falls on one day, whatever its
//! status, and renders it as CSV for download or the `report` command.

use crate::adapters::database::ClinicStore;
use crate::domain::{AppointmentStatus, DailyAppointment, Result};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

/// CSV column names, in order
pub const CSV_HEADER: [&str; 5] = ["patient", "doctor", "date", "start", "status"];

/// One line of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub patient: String,
    pub doctor: String,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub status: AppointmentStatus,
}

impl From<DailyAppointment> for ReportRow {
    fn from(a: DailyAppointment) -> Self {
        Self {
            patient: a.patient_name,
            doctor: a.doctor_name,
            date: a.date,
            start: a.start,
            status: a.status,
        }
    }
}

impl ReportRow {
    fn csv_fields(&self) -> [String; 5] {
        [
            self.patient.clone(),
            self.doctor.clone(),
            self.date.format("%Y-%m-%d").to_string(),
            self.start.format("%H:%M:%S").to_string(),
            self.status.as_str().to_string(),
        ]
    }
}

/// Appointments on a single day, ordered by start time then patient name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub rows: Vec<ReportRow>,
}

impl DailyReport {
    /// Collect the report for `date`
    ///
    /// # Errors
    ///
    /// Returns store errors.
    pub async fn build(store: &dyn ClinicStore, date: NaiveDate) -> Result<Self> {
        let rows: Vec<ReportRow> = store
            .appointments_on(date)
            .await?
            .into_iter()
            .map(ReportRow::from)
            .collect();

        tracing::debug!(date = %date, rows = rows.len(), "Built daily report");

        Ok(Self { date, rows })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows with the given status
    pub fn count(&self, status: AppointmentStatus) -> usize {
        self.rows.iter().filter(|r| r.status == status).count()
    }

    /// Render as CSV with a header line and `\r\n` line endings
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        write_record(&mut out, CSV_HEADER.iter().copied());
        for row in &self.rows {
            let fields = row.csv_fields();
            write_record(&mut out, fields.iter().map(String::as_str));
        }
        out
    }

    /// `appointments_<YYYY-MM-DD>.csv`
    pub fn csv_filename(&self) -> String {
        format!("appointments_{}.csv", self.date.format("%Y-%m-%d"))
    }
}

fn write_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&quote_field(field));
    }
    out.push_str("\r\n");
}

/// Quote a field if it contains a comma, quote or line break
pub fn quote_field(field: &str) -> std::borrow::Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        std::borrow::Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        std::borrow::Cow::Borrowed(field)
    }
}
