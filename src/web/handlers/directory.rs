use super::today;
use crate::domain::DoctorId;
use crate::web::auth::Viewer;
use crate::web::error::WebError;
use crate::web::pages;
use crate::web::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;

/// `GET /`
pub async fn doctor_list(
    State(state): State<AppState>,
    viewer: Viewer,
) -> Result<Response, WebError> {
    let doctors = state.directory.list_doctors().await?;
    Ok(pages::respond(
        StatusCode::OK,
        &viewer,
        state.secure_cookies,
        "Doctors",
        &pages::doctor_list(&doctors),
    ))
}

/// `GET /doctor/:id/`
pub async fn doctor_detail(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<DoctorId>,
) -> Result<Response, WebError> {
    let calendar = state.directory.doctor_detail(id, today()).await?;
    Ok(pages::respond(
        StatusCode::OK,
        &viewer,
        state.secure_cookies,
        &format!("Dr. {}", calendar.doctor.full_name),
        &pages::doctor_detail(&calendar),
    ))
}
