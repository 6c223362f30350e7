//! Liveness and readiness probes

use axum::{extract::State, Json};
use serde::Serialize;

use crate::services::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Liveness: answers whenever the process is up
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub database: DatabaseCheck,
}

#[derive(Debug, Serialize)]
pub struct DatabaseCheck {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Readiness: the store must answer a ping. The schema is bootstrapped
/// during connect, so a reachable database is a usable one.
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    let start = std::time::Instant::now();

    let database = match state.repo.ping().await {
        Ok(()) => DatabaseCheck {
            reachable: true,
            latency_ms: Some(start.elapsed().as_millis() as u64),
            error: None,
        },
        Err(e) => DatabaseCheck {
            reachable: false,
            latency_ms: None,
            error: Some(e.to_string()),
        },
    };

    let status = if database.reachable { "ready" } else { "not_ready" };
    Json(ReadyResponse { status, database })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_reports_the_service_identity() {
        let Json(body) = health().await;
        assert_eq!(body.status, "healthy");
        assert_eq!(body.service, "toxtrack");
    }

    #[test]
    fn unreachable_database_omits_latency_and_carries_the_error() {
        let check = DatabaseCheck {
            reachable: false,
            latency_ms: None,
            error: Some("connection refused".to_string()),
        };
        let json = serde_json::to_value(&check).unwrap();
        assert_eq!(json["reachable"], false);
        assert!(json.get("latency_ms").is_none());
        assert_eq!(json["error"], "connection refused");
    }
}
