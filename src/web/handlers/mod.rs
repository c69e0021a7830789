//! Route handlers
//!
//! Handlers resolve the caller, call into `core`, and turn the result into
//! a page, a redirect with a flash message, or a [`WebError`].

pub mod auth;
pub mod booking;
pub mod directory;
pub mod health;
pub mod records;
pub mod reports;

use super::error::WebError;
use super::session::{set_cookie, Flash, FLASH_COOKIE};
use crate::adapters::media::Upload;
use axum::extract::Multipart;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Redirect, Response};
use std::collections::HashMap;

/// Redirect and leave a one-shot message for the next page
pub fn redirect_with_flash(to: &str, flash: Flash, secure_cookies: bool) -> Response {
    (
        [(
            SET_COOKIE,
            set_cookie(FLASH_COOKIE, &flash.encode(), None, secure_cookies),
        )],
        Redirect::to(to),
    )
        .into_response()
}

/// Today's date in the server's local time zone
pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Text fields and files from a multipart form
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, Upload>,
}

impl MultipartForm {
    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    pub fn take_file(&mut self, name: &str) -> Option<Upload> {
        self.files.remove(name)
    }

    /// Read every part; a file input left empty is treated as absent
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` for a malformed body or one over the size limit.
    pub async fn read(mut multipart: Multipart) -> Result<Self, WebError> {
        let mut form = Self::default();
        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(status = %e.status(), error = %e, "Rejected multipart body");
                    return Err(WebError::BadRequest(e.body_text()));
                }
            };

            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| WebError::BadRequest(e.body_text()))?;
                    if !(file_name.is_empty() && bytes.is_empty()) {
                        form.files.insert(
                            name,
                            Upload {
                                file_name,
                                bytes: bytes.to_vec(),
                            },
                        );
                    }
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| WebError::BadRequest(e.body_text()))?;
                    form.fields.insert(name, text);
                }
            }
        }
        Ok(form)
    }
}
