use crate::web::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub store: &'static str,
}

/// `GET /healthz`
pub async fn check(State(state): State<AppState>) -> Response {
    let store = state.store.backend_name();
    match state.store.test_connection().await {
        Ok(()) => (StatusCode::OK, Json(HealthBody { status: "ok", store })).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, store, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthBody {
                    status: "unavailable",
                    store,
                }),
            )
                .into_response()
        }
    }
}
