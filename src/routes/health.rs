/**
 * Health Routes
 * Endpoints for checking backend health status
 */
use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::Store;

// Track server start time for uptime calculation
lazy_static::lazy_static! {
    static ref SERVER_START: Instant = Instant::now();
}

/// Initialize the server start time
pub fn init_start_time() {
    lazy_static::initialize(&SERVER_START);
}

#[derive(Debug, Serialize)]
pub struct SimpleHealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageCheck {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime: u64,
    pub storage: StorageCheck,
}

/// GET /health - Simple health ping
pub async fn health_ping() -> impl IntoResponse {
    Json(SimpleHealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /health/detailed - Uptime plus a live storage round-trip
pub async fn health_detailed(State(store): State<Arc<Store>>) -> impl IntoResponse {
    let uptime = SERVER_START.elapsed().as_secs();

    let storage = if store.is_available() {
        // Exercise an actual read so a broken data directory surfaces here.
        let started = Instant::now();
        let _ = store.stats();
        StorageCheck {
            status: "healthy".to_string(),
            response_time: Some(started.elapsed().as_millis() as u64),
            error: None,
        }
    } else {
        StorageCheck {
            status: "unhealthy".to_string(),
            response_time: None,
            error: Some("Data directory is not writable".to_string()),
        }
    };

    let status = if storage.status == "healthy" {
        "healthy"
    } else {
        "degraded"
    };

    (
        StatusCode::OK,
        Json(DetailedHealthResponse {
            status: status.to_string(),
            timestamp: Utc::now(),
            uptime,
            storage,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ping_reports_ok() {
        let response = health_ping().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
