//! HTML pages
//!
//! Every dynamic value goes through [`escape`] before it is written into
//! markup.

use super::auth::Viewer;
use super::session::{clear_cookie, FLASH_COOKIE};
use crate::core::booking::PatientAppointments;
use crate::core::directory::DoctorCalendar;
use crate::core::report::DailyReport;
use crate::domain::validation::FieldErrors;
use crate::domain::{AppointmentDetail, Doctor, Patient};
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use std::fmt::Write as _;

/// Escape text for HTML element content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

fn layout(viewer: &Viewer, title: &str, body: &str) -> String {
    let mut nav = String::from(r#"<a href="/">Doctors</a>"#);
    match &viewer.user {
        Some(user) => {
            nav.push_str(
                r#" | <a href="/appointments/">My appointments</a> | <a href="/tests/upload/">Upload test result</a> | <a href="/reports/daily/">Daily report</a>"#,
            );
            let _ = write!(
                nav,
                r#" | {} <form method="post" action="/logout/" style="display:inline"><button type="submit">Log out</button></form>"#,
                escape(&user.username)
            );
        }
        None => nav.push_str(r#" | <a href="/login/">Log in</a>"#),
    }

    let flash = match &viewer.flash {
        Some(flash) => format!(
            r#"<p class="flash {}">{}</p>"#,
            flash.level.as_str(),
            escape(&flash.message)
        ),
        None => String::new(),
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title} | Clinic</title></head>\n<body>\n<nav>{nav}</nav>\n{flash}\n<main>\n<h1>{title}</h1>\n{body}\n</main>\n</body>\n</html>\n",
        title = escape(title),
    )
}

/// Full page response; clears the flash cookie once it has been shown
pub fn respond(
    status: StatusCode,
    viewer: &Viewer,
    secure_cookies: bool,
    title: &str,
    body: &str,
) -> Response {
    let html = Html(layout(viewer, title, body));
    if viewer.flash.is_some() {
        (
            status,
            [(SET_COOKIE, clear_cookie(FLASH_COOKIE, secure_cookies))],
            html,
        )
            .into_response()
    } else {
        (status, html).into_response()
    }
}

/// Bare page for error responses
pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    layout(
        &Viewer::default(),
        title,
        &format!(r#"<p class="error">{}</p><p><a href="/">Back to doctors</a></p>"#, escape(message)),
    )
}

fn field_errors(errors: Option<&FieldErrors>, field: &str) -> String {
    let Some(errors) = errors else {
        return String::new();
    };
    let items: String = errors
        .for_field(field)
        .map(|m| format!("<li>{}</li>", escape(m)))
        .collect();
    if items.is_empty() {
        items
    } else {
        format!(r#"<ul class="errorlist">{items}</ul>"#)
    }
}

pub fn doctor_list(doctors: &[Doctor]) -> String {
    if doctors.is_empty() {
        return "<p>No doctors are listed yet.</p>".to_string();
    }
    let mut out = String::from("<ul class=\"doctors\">\n");
    for doctor in doctors {
        let _ = writeln!(
            out,
            r#"<li><a href="/doctor/{}/">{}</a> <span class="specialty">{}</span></li>"#,
            doctor.id,
            escape(&doctor.full_name),
            escape(doctor.specialty_name())
        );
    }
    out.push_str("</ul>");
    out
}

pub fn doctor_detail(calendar: &DoctorCalendar) -> String {
    let doctor = &calendar.doctor;
    let mut out = String::new();
    let _ = writeln!(out, "<p class=\"specialty\">{}</p>", escape(doctor.specialty_name()));
    if let Some(photo) = &doctor.photo {
        let _ = writeln!(
            out,
            r#"<img src="/media/{}" alt="{}" width="160">"#,
            escape(photo),
            escape(&doctor.full_name)
        );
    }
    if !doctor.bio.is_empty() {
        let _ = writeln!(out, "<p>{}</p>", escape(&doctor.bio));
    }
    if !doctor.phone.is_empty() {
        let _ = writeln!(out, "<p>Phone: {}</p>", escape(&doctor.phone));
    }

    out.push_str("<h2>Upcoming time slots</h2>\n");
    if calendar.slots.is_empty() {
        out.push_str("<p>No upcoming time slots.</p>\n");
    } else {
        out.push_str("<table>\n<tr><th>Date</th><th>Time</th><th>Places left</th></tr>\n");
        for availability in &calendar.slots {
            let slot = &availability.slot;
            let places = if availability.is_full() {
                "Full".to_string()
            } else {
                format!("{} of {}", availability.remaining(), slot.capacity)
            };
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td>{}-{}</td><td>{}</td></tr>",
                slot.date,
                slot.start.format("%H:%M"),
                slot.end.format("%H:%M"),
                places
            );
        }
        out.push_str("</table>\n");
    }
    let _ = write!(
        out,
        r#"<p><a href="/doctor/{}/book/">Book an appointment</a></p>"#,
        doctor.id
    );
    out
}

/// Values to put back into the booking form
#[derive(Debug, Clone, Default)]
pub struct BookingFormValues<'a> {
    pub timeslot: Option<&'a str>,
    pub reason: &'a str,
}

pub fn booking_form(
    calendar: &DoctorCalendar,
    values: &BookingFormValues<'_>,
    errors: Option<&FieldErrors>,
) -> String {
    let doctor = &calendar.doctor;
    let mut options = String::from(r#"<option value="">---------</option>"#);
    for availability in calendar.bookable() {
        let slot = &availability.slot;
        let id = slot.id.to_string();
        let selected = if values.timeslot == Some(id.as_str()) {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            options,
            r#"<option value="{id}"{selected}>{}</option>"#,
            escape(&slot.to_string())
        );
    }

    format!(
        r#"<p>With {doctor}</p>
<form method="post" action="/doctor/{id}/book/">
<label for="id_timeslot">Time slot</label>
<select name="timeslot" id="id_timeslot">{options}</select>
{timeslot_errors}
<label for="id_reason">Reason</label>
<textarea name="reason" id="id_reason" rows="3">{reason}</textarea>
{reason_errors}
<button type="submit">Book</button>
</form>
<p><a href="/doctor/{id}/">Back</a></p>"#,
        doctor = escape(&doctor.to_string()),
        id = doctor.id,
        timeslot_errors = field_errors(errors, "timeslot"),
        reason = escape(values.reason),
        reason_errors = field_errors(errors, "reason"),
    )
}

pub fn my_appointments(list: &PatientAppointments) -> String {
    if list.appointments.is_empty() {
        return r#"<p>You have no appointments. <a href="/">Find a doctor</a>.</p>"#.to_string();
    }
    let mut out = String::from(
        "<table>\n<tr><th>Date</th><th>Time</th><th>Doctor</th><th>Status</th><th></th></tr>\n",
    );
    for summary in &list.appointments {
        let _ = writeln!(
            out,
            r#"<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><a href="/appointment/{}/">Details</a></td></tr>"#,
            summary.slot.date,
            summary.slot.start.format("%H:%M"),
            escape(&summary.doctor_name),
            summary.appointment.status.label(),
            summary.appointment.id
        );
    }
    out.push_str("</table>");
    out
}

pub fn appointment_detail(detail: &AppointmentDetail) -> String {
    let appointment = &detail.appointment;
    let mut out = format!(
        "<dl>\n<dt>Patient</dt><dd>{}</dd>\n<dt>Doctor</dt><dd>{}</dd>\n<dt>When</dt><dd>{}</dd>\n<dt>Status</dt><dd>{}</dd>\n<dt>Reason</dt><dd>{}</dd>\n</dl>\n",
        escape(&detail.patient_name),
        escape(&detail.doctor_name),
        escape(&detail.slot.to_string()),
        appointment.status.label(),
        escape(&appointment.reason),
    );

    out.push_str("<h2>Prescription</h2>\n");
    match &detail.prescription {
        Some(prescription) => {
            let _ = writeln!(
                out,
                "<pre>{}</pre>\n<p>Prescribed {}</p>",
                escape(&prescription.content),
                prescription.prescribed_at.format("%Y-%m-%d %H:%M")
            );
            if let Some(file) = &prescription.file {
                let _ = writeln!(
                    out,
                    r#"<p><a href="/media/{}">Attachment</a></p>"#,
                    escape(file)
                );
            }
        }
        None => {
            let _ = writeln!(
                out,
                r#"<p>No prescription yet. <a href="/appointment/{}/prescription/">Write one</a>.</p>"#,
                appointment.id
            );
        }
    }
    out
}

pub fn prescription_form(
    detail: &AppointmentDetail,
    content: &str,
    errors: Option<&FieldErrors>,
) -> String {
    format!(
        r#"<p>For {patient} with {doctor} on {slot}</p>
<form method="post" action="/appointment/{id}/prescription/" enctype="multipart/form-data">
<label for="id_content">Content</label>
<textarea name="content" id="id_content" rows="4">{content}</textarea>
{content_errors}
<label for="id_file">File</label>
<input type="file" name="file" id="id_file">
{file_errors}
<button type="submit">Save</button>
</form>
<p><a href="/appointment/{id}/">Back</a></p>"#,
        patient = escape(&detail.patient_name),
        doctor = escape(&detail.doctor_name),
        slot = escape(&detail.slot.to_string()),
        id = detail.appointment.id,
        content = escape(content),
        content_errors = field_errors(errors, "content"),
        file_errors = field_errors(errors, "file"),
    )
}

pub fn test_result_form(
    patients: &[Patient],
    selected: Option<&str>,
    notes: &str,
    errors: Option<&FieldErrors>,
) -> String {
    let mut options = String::from(r#"<option value="">---------</option>"#);
    for patient in patients {
        let id = patient.id.to_string();
        let mark = if selected == Some(id.as_str()) {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            options,
            r#"<option value="{id}"{mark}>{}</option>"#,
            escape(&patient.full_name)
        );
    }

    format!(
        r#"<form method="post" action="/tests/upload/" enctype="multipart/form-data">
<label for="id_patient">Patient</label>
<select name="patient" id="id_patient">{options}</select>
{patient_errors}
<label for="id_file">File</label>
<input type="file" name="file" id="id_file">
{file_errors}
<label for="id_notes">Notes</label>
<textarea name="notes" id="id_notes" rows="3">{notes}</textarea>
{notes_errors}
<button type="submit">Upload</button>
</form>"#,
        patient_errors = field_errors(errors, "patient"),
        file_errors = field_errors(errors, "file"),
        notes = escape(notes),
        notes_errors = field_errors(errors, "notes"),
    )
}

pub fn daily_report(report: &DailyReport) -> String {
    let date = report.date.format("%Y-%m-%d");
    let mut out = format!(
        r#"<form method="get" action="/reports/daily/"><input type="date" name="date" value="{date}"> <button type="submit">Show</button></form>
<p><a href="/reports/daily/?date={date}&amp;format=csv">Download CSV</a></p>
"#
    );
    if report.is_empty() {
        out.push_str("<p>No appointments on this day.</p>");
        return out;
    }
    out.push_str(
        "<table>\n<tr><th>Patient</th><th>Doctor</th><th>Date</th><th>Start</th><th>Status</th></tr>\n",
    );
    for row in &report.rows {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&row.patient),
            escape(&row.doctor),
            row.date,
            row.start.format("%H:%M"),
            row.status.label()
        );
    }
    out.push_str("</table>");
    out
}

pub fn login_form(username: &str, next: &str, error: Option<&str>, errors: Option<&FieldErrors>) -> String {
    let banner = error
        .map(|message| format!(r#"<p class="error">{}</p>"#, escape(message)))
        .unwrap_or_default();
    format!(
        r#"{banner}
<form method="post" action="/login/">
<input type="hidden" name="next" value="{next}">
<label for="id_username">Username</label>
<input type="text" name="username" id="id_username" value="{username}" autofocus>
{username_errors}
<label for="id_password">Password</label>
<input type="password" name="password" id="id_password">
{password_errors}
<button type="submit">Log in</button>
</form>"#,
        next = escape(next),
        username = escape(username),
        username_errors = field_errors(errors, "username"),
        password_errors = field_errors(errors, "password"),
    )
}
