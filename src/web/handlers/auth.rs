use crate::core::accounts::LoginForm;
use crate::domain::{CallerIdentity, ClinicError};
use crate::web::auth::{safe_next, Viewer};
use crate::web::error::WebError;
use crate::web::pages;
use crate::web::session::{clear_cookie, read_cookie, set_cookie, SESSION_COOKIE};
use crate::web::state::AppState;
use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// `GET /login/`
pub async fn login_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<NextQuery>,
) -> Response {
    let next = safe_next(query.next.as_deref());
    pages::respond(
        StatusCode::OK,
        &viewer,
        state.secure_cookies,
        "Log in",
        &pages::login_form("", next, None, None),
    )
}

/// `POST /login/`
pub async fn login(
    State(state): State<AppState>,
    viewer: Viewer,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    let next = safe_next(form.next.as_deref()).to_string();

    if let Err(errors) = form.validate() {
        return Ok(pages::respond(
            StatusCode::UNPROCESSABLE_ENTITY,
            &viewer,
            state.secure_cookies,
            "Log in",
            &pages::login_form(&form.username, &next, None, Some(&errors)),
        ));
    }

    let user = match state.accounts.authenticate(&form.username, &form.password).await {
        Ok(user) => user,
        Err(ClinicError::Authentication(message)) => {
            return Ok(pages::respond(
                StatusCode::UNPROCESSABLE_ENTITY,
                &viewer,
                state.secure_cookies,
                "Log in",
                &pages::login_form(&form.username, &next, Some(&message), None),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let token = state.sessions.create(CallerIdentity::from(&user)).await;
    let cookie = set_cookie(
        SESSION_COOKIE,
        &token,
        Some(state.sessions.ttl_seconds()),
        state.secure_cookies,
    );
    Ok(([(SET_COOKIE, cookie)], Redirect::to(&next)).into_response())
}

/// `GET|POST /logout/`
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = read_cookie(&headers, SESSION_COOKIE) {
        state.sessions.remove(&token).await;
        tracing::info!("Session ended");
    }
    (
        [(SET_COOKIE, clear_cookie(SESSION_COOKIE, state.secure_cookies))],
        Redirect::to("/"),
    )
        .into_response()
}
