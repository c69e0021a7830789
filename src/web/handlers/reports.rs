use super::today;
use crate::core::report::DailyReport;
use crate::web::auth::Authenticated;
use crate::web::error::WebError;
use crate::web::pages;
use crate::web::state::AppState;
use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub date: Option<String>,
    pub format: Option<String>,
}

impl ReportQuery {
    /// The requested day, defaulting to today
    pub fn day(&self) -> Result<NaiveDate, WebError> {
        match self.date.as_deref().map(str::trim) {
            None | Some("") => Ok(today()),
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| WebError::BadRequest(format!("Invalid date '{raw}', expected YYYY-MM-DD"))),
        }
    }

    pub fn wants_csv(&self) -> bool {
        self.format.as_deref() == Some("csv")
    }
}

/// `GET /reports/daily/`
pub async fn daily_report(
    State(state): State<AppState>,
    auth: Authenticated,
    Query(query): Query<ReportQuery>,
) -> Result<Response, WebError> {
    let date = query.day()?;
    let report = DailyReport::build(state.store.as_ref(), date).await?;

    if query.wants_csv() {
        tracing::info!(date = %date, rows = report.rows.len(), user_id = %auth.caller.user_id, "Daily report exported");
        let disposition = format!("attachment; filename=\"{}\"", report.csv_filename());
        return Ok((
            [
                (CONTENT_TYPE, "text/csv".to_string()),
                (CONTENT_DISPOSITION, disposition),
            ],
            report.to_csv(),
        )
            .into_response());
    }

    Ok(pages::respond(
        StatusCode::OK,
        &auth.viewer,
        state.secure_cookies,
        &format!("Appointments on {}", date.format("%Y-%m-%d")),
        &pages::daily_report(&report),
    ))
}
