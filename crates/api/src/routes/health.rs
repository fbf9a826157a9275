//! Health check endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::state::AppState;

const SERVICE_NAME: &str = "helpdesk-api";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub store: &'static str,
    pub database: &'static str,
    pub agent_service: &'static str,
}

/// Service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Helpdesk API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_status = match state.store.ping().await {
        Ok(()) => "healthy",
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            "unhealthy"
        }
    };

    let status = if db_status == "healthy" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: db_status,
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            store: state.store.backend(),
            database: db_status,
            agent_service: if state.lyzr.is_mock() { "mock" } else { "live" },
        }),
    )
}

/// Liveness probe (just returns 200 if the server is running)
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe (checks if the service is ready to accept traffic)
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store.ping().await {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::routes::test_helpers::{call, test_app};
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_health_reports_memory_store() {
        let app = test_app();
        let (status, body) = call(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["store"], "memory");
        assert_eq!(body["agent_service"], "mock");
    }

    #[tokio::test]
    async fn test_probes_and_banner() {
        let app = test_app();
        let (status, _) = call(&app, Method::GET, "/health/live", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&app, Method::GET, "/health/ready", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = call(&app, Method::GET, "/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Helpdesk API is running");
    }
}
