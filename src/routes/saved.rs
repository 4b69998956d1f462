/**
 * Saved Jobs & Preferences Routes
 * Per-user bookmarks and settings, keyed by the authenticated user
 */
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::routes::auth::require_role;
use crate::routes::{ErrorResponse, SuccessResponse};
use crate::store::models::{JobView, SavedJob, UserPreferences, UserRole};
use crate::store::Store;

const ANY_ROLE: &[UserRole] = &[UserRole::Applicant, UserRole::Company, UserRole::Admin];

/// Saved entry with the job resolved for display. `job` is `None` when
/// the posting has since been deleted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedJobDetail {
    #[serde(flatten)]
    pub saved: SavedJob,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<JobView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedJobsResponse {
    pub items: Vec<SavedJobDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveJobRequest {
    pub job_id: String,
}

/// GET /api/saved-jobs - The caller's saved jobs
pub async fn list_saved_jobs(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let claims = match require_role(&headers, ANY_ROLE) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };

    let jobs = store.jobs();
    let items = store
        .saved_jobs(&claims.sub)
        .into_iter()
        .map(|saved| {
            let job = jobs.iter().find(|j| j.job.id == saved.job_id).cloned();
            SavedJobDetail { saved, job }
        })
        .collect();
    (StatusCode::OK, Json(SavedJobsResponse { items })).into_response()
}

/// POST /api/saved-jobs - Save a job for later (idempotent)
pub async fn save_job(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
    Json(payload): Json<SaveJobRequest>,
) -> impl IntoResponse {
    let claims = match require_role(&headers, ANY_ROLE) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };

    if store.find_job(&payload.job_id).is_none() {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Job not found")),
        )
            .into_response();
    }

    let success = store.save_job(&claims.sub, &payload.job_id);
    (StatusCode::OK, Json(SuccessResponse { success })).into_response()
}

/// DELETE /api/saved-jobs/:jobId - Remove a bookmark
pub async fn unsave_job(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    let claims = match require_role(&headers, ANY_ROLE) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };

    let success = store.unsave_job(&claims.sub, &job_id);
    (StatusCode::OK, Json(SuccessResponse { success })).into_response()
}

/// GET /api/preferences - The caller's preferences
pub async fn get_preferences(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let claims = match require_role(&headers, ANY_ROLE) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };
    (StatusCode::OK, Json(store.preferences(&claims.sub))).into_response()
}

/// PATCH /api/preferences - Merge a partial preferences record
pub async fn update_preferences(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
    Json(payload): Json<UserPreferences>,
) -> impl IntoResponse {
    let claims = match require_role(&headers, ANY_ROLE) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };

    if !store.set_preferences(&claims.sub, payload) {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("Storage not available")),
        )
            .into_response();
    }
    (StatusCode::OK, Json(store.preferences(&claims.sub))).into_response()
}
