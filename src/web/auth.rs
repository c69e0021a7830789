//! Request extractors for the logged-in caller

use super::session::{read_cookie, Flash, FLASH_COOKIE, SESSION_COOKIE};
use super::state::AppState;
use crate::domain::CallerIdentity;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::Uri;
use axum::response::{IntoResponse, Redirect, Response};
use std::convert::Infallible;

/// Who is asking and any pending flash message; never rejects
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub user: Option<CallerIdentity>,
    pub flash: Option<Flash>,
}

#[async_trait]
impl FromRequestParts<AppState> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = match read_cookie(&parts.headers, SESSION_COOKIE) {
            Some(token) => state.sessions.resolve(&token).await,
            None => None,
        };
        let flash = read_cookie(&parts.headers, FLASH_COOKIE).and_then(|v| Flash::decode(&v));
        Ok(Self { user, flash })
    }
}

/// A logged-in caller; anonymous requests are sent to the login page
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub caller: CallerIdentity,
    pub viewer: Viewer,
}

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let viewer = match Viewer::from_request_parts(parts, state).await {
            Ok(viewer) => viewer,
            Err(never) => match never {},
        };
        match viewer.user.clone() {
            Some(caller) => Ok(Self { caller, viewer }),
            None => Err(Redirect::to(&login_url(&parts.uri)).into_response()),
        }
    }
}

/// `/login/?next=<path and query>`
pub fn login_url(uri: &Uri) -> String {
    let next = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("/login/?next={encoded}")
}

/// Only same-site absolute paths are followed after login
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url_encodes_next() {
        let uri: Uri = "/reports/daily/?format=csv".parse().unwrap();
        assert_eq!(
            login_url(&uri),
            "/login/?next=%2Freports%2Fdaily%2F%3Fformat%3Dcsv"
        );
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/appointments/")), "/appointments/");
        assert_eq!(safe_next(Some("//evil.example.com")), "/");
        assert_eq!(safe_next(Some("https://evil.example.com")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
