/**
 * Admin Data Management Routes
 * Reset / export / import / clear actions over the whole store
 */
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::routes::auth::require_role;
use crate::routes::ErrorResponse;
use crate::store::backup::{DataStats, ExportDocument};
use crate::store::models::UserRole;
use crate::store::Store;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataActionRequest {
    pub action: String,
    /// Present only for the import action.
    pub data: Option<ExportDocument>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataActionResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<DataStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ExportDocument>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    pub available: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStatsResponse {
    pub stats: DataStats,
    pub storage: StorageInfo,
}

/// POST /api/admin/data - Run a data-management action (admin only)
pub async fn manage_data(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
    Json(payload): Json<DataActionRequest>,
) -> impl IntoResponse {
    if let Err(e) = require_role(&headers, &[UserRole::Admin]) {
        return e.into_response();
    }

    match payload.action.as_str() {
        "reset" => {
            let stats = store.reset_data();
            tracing::info!("store reset to seed data");
            (
                StatusCode::OK,
                Json(DataActionResponse {
                    message: "Data reset to initial state successfully".to_string(),
                    stats: Some(stats),
                    data: None,
                }),
            )
                .into_response()
        }
        "export" => (
            StatusCode::OK,
            Json(DataActionResponse {
                message: "Data exported successfully".to_string(),
                stats: None,
                data: Some(store.export_data()),
            }),
        )
            .into_response(),
        "import" => {
            let Some(document) = payload.data else {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::new("No data provided for import")),
                )
                    .into_response();
            };
            if !store.import_data(&document) {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::new("Failed to import data")),
                )
                    .into_response();
            }
            tracing::info!("store state imported");
            (
                StatusCode::OK,
                Json(DataActionResponse {
                    message: "Data imported successfully".to_string(),
                    stats: Some(store.stats()),
                    data: None,
                }),
            )
                .into_response()
        }
        "clear" => {
            store.clear_all();
            tracing::info!("store cleared");
            (
                StatusCode::OK,
                Json(DataActionResponse {
                    message: "All data cleared successfully".to_string(),
                    stats: None,
                    data: None,
                }),
            )
                .into_response()
        }
        other => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::with_message(
                "Invalid action",
                other.to_string(),
            )),
        )
            .into_response(),
    }
}

/// GET /api/admin/data - Current data statistics (admin only)
pub async fn data_stats(State(store): State<Arc<Store>>, headers: HeaderMap) -> impl IntoResponse {
    if let Err(e) = require_role(&headers, &[UserRole::Admin]) {
        return e.into_response();
    }

    (
        StatusCode::OK,
        Json(DataStatsResponse {
            stats: store.stats(),
            storage: StorageInfo {
                available: store.is_available(),
            },
        }),
    )
        .into_response()
}
