//! HTTP interface
//!
//! Server-rendered pages over the core services. Routes:
//!
//! | Route | Method | Login |
//! |-------|--------|-------|
//! | `/` | GET | no |
//! | `/doctor/:id/` | GET | no |
//! | `/doctor/:id/book/` | GET, POST | yes |
//! | `/appointments/` | GET | yes |
//! | `/appointment/:id/` | GET | yes |
//! | `/appointment/:id/prescription/` | GET, POST (multipart) | yes |
//! | `/tests/upload/` | GET, POST (multipart) | yes |
//! | `/reports/daily/` | GET (`?date=`, `?format=csv`) | yes |
//! | `/login/` | GET, POST | no |
//! | `/logout/` | GET, POST | no |
//! | `/healthz` | GET | no |
//! | `/media/*` | GET | no |

pub mod auth;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod session;
pub mod state;

pub use error::WebError;
pub use state::AppState;

use crate::domain::{ClinicError, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use tower_http::services::ServeDir;
use tracing::Instrument;

/// Room for form fields and multipart framing on top of the file itself
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let body_limit = state.media.max_bytes() + MULTIPART_OVERHEAD;
    let media = ServeDir::new(state.media.root());

    Router::new()
        .route("/", get(handlers::directory::doctor_list))
        .route("/doctor/:id/", get(handlers::directory::doctor_detail))
        .route(
            "/doctor/:id/book/",
            get(handlers::booking::booking_page).post(handlers::booking::book),
        )
        .route("/appointments/", get(handlers::booking::my_appointments))
        .route(
            "/appointment/:id/",
            get(handlers::records::appointment_detail),
        )
        .route(
            "/appointment/:id/prescription/",
            get(handlers::records::prescription_page)
                .post(handlers::records::create_prescription),
        )
        .route(
            "/tests/upload/",
            get(handlers::records::test_result_page).post(handlers::records::upload_test_result),
        )
        .route("/reports/daily/", get(handlers::reports::daily_report))
        .route(
            "/login/",
            get(handlers::auth::login_page).post(handlers::auth::login),
        )
        .route(
            "/logout/",
            get(handlers::auth::logout).post(handlers::auth::logout),
        )
        .route("/healthz", get(handlers::health::check))
        .nest_service("/media", media)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(request_span))
        .with_state(state)
}

/// Wrap each request in a span carrying its method and path
async fn request_span(req: Request<axum::body::Body>, next: Next) -> Response {
    let span = tracing::info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let started = std::time::Instant::now();
        let response = next.run(req).await;
        tracing::info!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Request completed"
        );
        response
    }
    .instrument(span)
    .await
}

/// Serve the router until the shutdown signal flips to `true`
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(
    state: AppState,
    bind_address: &str,
    mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
) -> Result<()> {
    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        ClinicError::Configuration(format!("Invalid bind address '{bind_address}': {e}"))
    })?;

    state.media.ensure_directories().await?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ClinicError::Io(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(addr = %addr, store = state.store.backend_name(), "Clinic server listening");

    let shutdown_signal = async move {
        while shutdown_rx.changed().await.is_ok() {
            if *shutdown_rx.borrow() {
                break;
            }
        }
        tracing::info!("Shutting down HTTP server");
    };

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ClinicError::Io(format!("HTTP server error: {e}")))?;

    Ok(())
}
