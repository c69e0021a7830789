use super::{redirect_with_flash, today};
use crate::core::booking::{BookingForm, BookingOutcome};
use crate::domain::validation::FieldErrors;
use crate::domain::{ClinicError, DoctorId};
use crate::web::auth::Authenticated;
use crate::web::error::WebError;
use crate::web::pages::{self, BookingFormValues};
use crate::web::session::Flash;
use crate::web::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Form;

const BOOKED: &str = "Appointment booked successfully";
const NO_PATIENT_PROFILE: &str = "No patient profile linked to your account.";

/// `GET /doctor/:id/book/`
pub async fn booking_page(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(doctor_id): Path<DoctorId>,
) -> Result<Response, WebError> {
    let calendar = state.directory.doctor_detail(doctor_id, today()).await?;
    Ok(pages::respond(
        StatusCode::OK,
        &auth.viewer,
        state.secure_cookies,
        "Book an appointment",
        &pages::booking_form(&calendar, &BookingFormValues::default(), None),
    ))
}

/// `POST /doctor/:id/book/`
pub async fn book(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(doctor_id): Path<DoctorId>,
    Form(form): Form<BookingForm>,
) -> Result<Response, WebError> {
    let calendar = state.directory.doctor_detail(doctor_id, today()).await?;

    let rerender = |errors: &FieldErrors| {
        let values = BookingFormValues {
            timeslot: form.timeslot.as_deref(),
            reason: &form.reason,
        };
        pages::respond(
            StatusCode::UNPROCESSABLE_ENTITY,
            &auth.viewer,
            state.secure_cookies,
            "Book an appointment",
            &pages::booking_form(&calendar, &values, Some(errors)),
        )
    };

    let request = match form.validate(doctor_id) {
        Ok(request) => request,
        Err(errors) => return Ok(rerender(&errors)),
    };

    match state.booking.book(&auth.caller, request).await {
        Ok(BookingOutcome::Booked(_)) => Ok(redirect_with_flash(
            "/appointments/",
            Flash::success(BOOKED),
            state.secure_cookies,
        )),
        Ok(BookingOutcome::Rejected(rejection)) => Ok(redirect_with_flash(
            &format!("/doctor/{doctor_id}/"),
            Flash::error(rejection.message()),
            state.secure_cookies,
        )),
        Err(ClinicError::NotFound(_)) => {
            let mut errors = FieldErrors::new();
            errors.add(
                "timeslot",
                "Select a valid choice. That choice is not one of the available choices.",
            );
            Ok(rerender(&errors))
        }
        Err(e) => Err(e.into()),
    }
}

/// `GET /appointments/`
pub async fn my_appointments(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Result<Response, WebError> {
    match state.booking.appointments_for(&auth.caller).await? {
        Some(list) => Ok(pages::respond(
            StatusCode::OK,
            &auth.viewer,
            state.secure_cookies,
            "My appointments",
            &pages::my_appointments(&list),
        )),
        None => Ok(redirect_with_flash(
            "/",
            Flash::error(NO_PATIENT_PROFILE),
            state.secure_cookies,
        )),
    }
}
