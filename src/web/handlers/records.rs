//! Appointment detail, prescriptions and test result uploads

use super::{redirect_with_flash, MultipartForm};
use crate::core::intake::{PrescriptionForm, TestResultForm};
use crate::domain::{AppointmentId, ClinicError};
use crate::web::auth::Authenticated;
use crate::web::error::WebError;
use crate::web::pages;
use crate::web::session::Flash;
use crate::web::state::AppState;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Response;

const PRESCRIPTION_SAVED: &str = "Prescription saved";
const TEST_RESULT_UPLOADED: &str = "Test result uploaded";

/// `GET /appointment/:id/`
pub async fn appointment_detail(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<AppointmentId>,
) -> Result<Response, WebError> {
    let detail = state.directory.appointment_detail(id).await?;
    Ok(pages::respond(
        StatusCode::OK,
        &auth.viewer,
        state.secure_cookies,
        "Appointment",
        &pages::appointment_detail(&detail),
    ))
}

/// `GET /appointment/:id/prescription/`
pub async fn prescription_page(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<AppointmentId>,
) -> Result<Response, WebError> {
    let detail = state.directory.appointment_detail(id).await?;
    Ok(pages::respond(
        StatusCode::OK,
        &auth.viewer,
        state.secure_cookies,
        "New prescription",
        &pages::prescription_form(&detail, "", None),
    ))
}

/// `POST /appointment/:id/prescription/`
pub async fn create_prescription(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<AppointmentId>,
    multipart: Multipart,
) -> Result<Response, WebError> {
    let mut parts = MultipartForm::read(multipart).await?;
    let form = PrescriptionForm {
        content: parts.text("content"),
        file: parts.take_file("file"),
    };
    let content = form.content.clone();

    match state.intake.create_prescription(id, form).await {
        Ok(Ok(_)) => Ok(redirect_with_flash(
            &format!("/appointment/{id}/"),
            Flash::success(PRESCRIPTION_SAVED),
            state.secure_cookies,
        )),
        Ok(Err(errors)) => {
            let detail = state.directory.appointment_detail(id).await?;
            Ok(pages::respond(
                StatusCode::UNPROCESSABLE_ENTITY,
                &auth.viewer,
                state.secure_cookies,
                "New prescription",
                &pages::prescription_form(&detail, &content, Some(&errors)),
            ))
        }
        Err(ClinicError::Conflict(kind)) => Ok(redirect_with_flash(
            &format!("/appointment/{id}/"),
            Flash::error(kind.message()),
            state.secure_cookies,
        )),
        Err(e) => Err(e.into()),
    }
}

/// `GET /tests/upload/`
pub async fn test_result_page(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Result<Response, WebError> {
    let patients = state.intake.patients().await?;
    Ok(pages::respond(
        StatusCode::OK,
        &auth.viewer,
        state.secure_cookies,
        "Upload test result",
        &pages::test_result_form(&patients, None, "", None),
    ))
}

/// `POST /tests/upload/`
pub async fn upload_test_result(
    State(state): State<AppState>,
    auth: Authenticated,
    multipart: Multipart,
) -> Result<Response, WebError> {
    let mut parts = MultipartForm::read(multipart).await?;
    let form = TestResultForm {
        patient: parts.fields.get("patient").cloned(),
        file: parts.take_file("file"),
        notes: parts.text("notes"),
    };
    let (selected, notes) = (form.patient.clone(), form.notes.clone());

    match state.intake.upload_test_result(&auth.caller, form).await? {
        Ok(_) => Ok(redirect_with_flash(
            "/appointments/",
            Flash::success(TEST_RESULT_UPLOADED),
            state.secure_cookies,
        )),
        Err(errors) => {
            let patients = state.intake.patients().await?;
            Ok(pages::respond(
                StatusCode::UNPROCESSABLE_ENTITY,
                &auth.viewer,
                state.secure_cookies,
                "Upload test result",
                &pages::test_result_form(&patients, selected.as_deref(), &notes, Some(&errors)),
            ))
        }
    }
}
