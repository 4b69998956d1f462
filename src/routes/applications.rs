/**
 * Application Routes
 * Public apply endpoint plus company/admin review workflow
 */
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::routes::auth::require_role;
use crate::routes::{ErrorResponse, SuccessResponse};
use crate::store::models::{
    ApplicationStatus, ApplicationView, NewApplication, UpdateApplication, UserRole,
};
use crate::store::query::{paginate, DEFAULT_PAGE_SIZE};
use crate::store::Store;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub job_id: Option<String>,
    pub status: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// GET /api/applications - List applications (company/admin), newest
/// first, optionally narrowed to one job or status
pub async fn list_applications(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
    Query(query): Query<ApplicationListQuery>,
) -> impl IntoResponse {
    if let Err(e) = require_role(&headers, &[UserRole::Company, UserRole::Admin]) {
        return e.into_response();
    }

    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => match raw.parse::<ApplicationStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::with_message(
                        "Invalid status value",
                        raw.to_string(),
                    )),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let mut applications: Vec<ApplicationView> = store
        .applications()
        .into_iter()
        .filter(|a| {
            query
                .job_id
                .as_deref()
                .map_or(true, |job_id| a.application.job_id == job_id)
        })
        .filter(|a| status.map_or(true, |s| a.application.status == s))
        .collect();
    applications.sort_by(|a, b| b.application.created_at.cmp(&a.application.created_at));

    let page = paginate(applications, query.page, query.limit);
    (StatusCode::OK, Json(page)).into_response()
}

/// POST /api/applications - Submit an application
pub async fn create_application(
    State(store): State<Arc<Store>>,
    Json(payload): Json<NewApplication>,
) -> impl IntoResponse {
    if payload.applicant_name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Applicant name is required")),
        )
            .into_response();
    }
    if !is_valid_email(&payload.applicant_email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Invalid email format")),
        )
            .into_response();
    }
    if payload.job_id.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Job id is required")),
        )
            .into_response();
    }

    let application = store.create_application(payload);
    tracing::info!(
        application = %application.application.id,
        job = %application.application.job_id,
        "application submitted"
    );
    (StatusCode::CREATED, Json(application)).into_response()
}

/// PATCH /api/applications/:id - Review an application (company/admin)
pub async fn update_application(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(mut payload): Json<UpdateApplication>,
) -> impl IntoResponse {
    let claims = match require_role(&headers, &[UserRole::Company, UserRole::Admin]) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };

    // A status change is a review: stamp who did it and when.
    if payload.status.is_some() {
        payload.reviewed_at = Some(Utc::now());
        if payload.reviewed_by.is_none() {
            payload.reviewed_by = Some(claims.email);
        }
    }

    match store.update_application(&id, payload) {
        Some(application) => (StatusCode::OK, Json(application)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Application not found")),
        )
            .into_response(),
    }
}

/// DELETE /api/applications/:id - Withdraw/remove an application
/// (company/admin)
pub async fn delete_application(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(e) = require_role(&headers, &[UserRole::Company, UserRole::Admin]) {
        return e.into_response();
    }

    if store.delete_application(&id) {
        (StatusCode::OK, Json(SuccessResponse { success: true })).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Application not found")),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation_requires_domain() {
        assert!(is_valid_email("ada@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two words@example.com"));
    }
}
