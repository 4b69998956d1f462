/**
 * Job Routes
 * Public search/detail plus company/admin CRUD for job postings
 */
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::routes::auth::require_role;
use crate::routes::{ErrorResponse, SuccessResponse};
use crate::store::models::{
    ExperienceLevel, JobStatus, JobType, NewJob, UpdateJob, UserRole,
};
use crate::store::query::{search_jobs, JobFilter, JobSort, DEFAULT_PAGE_SIZE};
use crate::store::Store;

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for GET /api/jobs. Multi-valued filters take
/// comma-separated values (e.g. `jobType=FULL_TIME,CONTRACT`).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub search: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub experience: Option<String>,
    pub category: Option<String>,
    pub company: Option<String>,
    pub remote: Option<bool>,
    pub featured: Option<bool>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub sort: Option<String>,
    /// Restricted to authenticated company/admin callers; public
    /// listings always see PUBLISHED jobs only.
    pub status: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

// ============================================================================
// Helpers
// ============================================================================

type HandlerError = (StatusCode, Json<ErrorResponse>);

/// Parse a comma-separated membership filter; an absent or empty
/// parameter means "no constraint".
fn parse_set<T: FromStr>(raw: Option<&str>, what: &str) -> Result<Vec<T>, HandlerError> {
    let Some(raw) = raw else {
        return Ok(vec![]);
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|token| {
            token.parse::<T>().map_err(|_| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::with_message(
                        format!("Invalid {what} value"),
                        token.to_string(),
                    )),
                )
            })
        })
        .collect()
}

fn parse_id_set(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn build_filter(query: &JobListQuery, status: Option<JobStatus>) -> Result<JobFilter, HandlerError> {
    Ok(JobFilter {
        search: query.search.clone(),
        location: query.location.clone(),
        job_types: parse_set::<JobType>(query.job_type.as_deref(), "jobType")?,
        experience: parse_set::<ExperienceLevel>(query.experience.as_deref(), "experience")?,
        category_ids: parse_id_set(query.category.as_deref()),
        company_ids: parse_id_set(query.company.as_deref()),
        remote_only: query.remote.unwrap_or(false),
        featured_only: query.featured.unwrap_or(false),
        salary_min: query.salary_min,
        salary_max: query.salary_max,
        status,
    })
}

fn validate_salary_order(min: Option<i64>, max: Option<i64>) -> Result<(), HandlerError> {
    if let (Some(min), Some(max)) = (min, max) {
        if max < min {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(
                    "Maximum salary must be greater than or equal to minimum salary",
                )),
            ));
        }
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/jobs - Search published jobs with filters and pagination
pub async fn list_jobs(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
    Query(query): Query<JobListQuery>,
) -> impl IntoResponse {
    // The status parameter widens visibility beyond PUBLISHED, so it is
    // reserved for company/admin callers (dashboards list drafts too).
    let status = match query.status.as_deref() {
        None => Some(JobStatus::Published),
        Some(raw) => {
            if let Err(e) = require_role(&headers, &[UserRole::Company, UserRole::Admin]) {
                return e.into_response();
            }
            if raw.eq_ignore_ascii_case("all") {
                None
            } else {
                match raw.parse::<JobStatus>() {
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
                }
            }
        }
    };

    let filter = match build_filter(&query, status) {
        Ok(filter) => filter,
        Err(e) => return e.into_response(),
    };
    let sort = query
        .sort
        .as_deref()
        .map(JobSort::parse)
        .unwrap_or_default();

    let page = search_jobs(store.jobs(), &filter, sort, query.page, query.limit);
    (StatusCode::OK, Json(page)).into_response()
}

/// GET /api/jobs/:id - Enriched job detail; bumps the views counter
pub async fn get_job(State(store): State<Arc<Store>>, Path(id): Path<String>) -> impl IntoResponse {
    match store.record_job_view(&id) {
        Some(job) => (StatusCode::OK, Json(job)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Job not found")),
        )
            .into_response(),
    }
}

/// POST /api/jobs - Create a job posting (company/admin)
pub async fn create_job(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
    Json(payload): Json<NewJob>,
) -> impl IntoResponse {
    if let Err(e) = require_role(&headers, &[UserRole::Company, UserRole::Admin]) {
        return e.into_response();
    }

    if payload.title.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Title is required")),
        )
            .into_response();
    }
    if payload.description.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Description is required")),
        )
            .into_response();
    }
    if payload.location.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Location is required")),
        )
            .into_response();
    }
    if let Err(e) = validate_salary_order(payload.salary_min, payload.salary_max) {
        return e.into_response();
    }

    let job = store.create_job(payload);
    tracing::info!(job = %job.job.id, title = %job.job.title, "job created");
    (StatusCode::CREATED, Json(job)).into_response()
}

/// PATCH /api/jobs/:id - Update a job posting (company/admin)
pub async fn update_job(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateJob>,
) -> impl IntoResponse {
    if let Err(e) = require_role(&headers, &[UserRole::Company, UserRole::Admin]) {
        return e.into_response();
    }
    if let Err(e) = validate_salary_order(payload.salary_min, payload.salary_max) {
        return e.into_response();
    }

    match store.update_job(&id, payload) {
        Some(job) => (StatusCode::OK, Json(job)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Job not found")),
        )
            .into_response(),
    }
}

/// DELETE /api/jobs/:id - Delete a job posting (company/admin)
pub async fn delete_job(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(e) = require_role(&headers, &[UserRole::Company, UserRole::Admin]) {
        return e.into_response();
    }

    if store.delete_job(&id) {
        (StatusCode::OK, Json(SuccessResponse { success: true })).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Job not found")),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_set_accepts_comma_separated_enums() {
        let types: Vec<JobType> = parse_set(Some("FULL_TIME, CONTRACT"), "jobType").unwrap();
        assert_eq!(types, vec![JobType::FullTime, JobType::Contract]);

        let none: Vec<JobType> = parse_set(None, "jobType").unwrap();
        assert!(none.is_empty());

        let empty: Vec<JobType> = parse_set(Some(""), "jobType").unwrap();
        assert!(empty.is_empty());

        let err = parse_set::<JobType>(Some("FULL_TIME,BOGUS"), "jobType").unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn build_filter_maps_query_fields() {
        let query = JobListQuery {
            search: Some("rust".into()),
            remote: Some(true),
            salary_min: Some(50_000),
            category: Some("cat-1,cat-2".into()),
            ..Default::default()
        };
        let filter = build_filter(&query, Some(JobStatus::Published)).unwrap();
        assert_eq!(filter.search.as_deref(), Some("rust"));
        assert!(filter.remote_only);
        assert_eq!(filter.salary_min, Some(50_000));
        assert_eq!(filter.category_ids, vec!["cat-1", "cat-2"]);
        assert_eq!(filter.status, Some(JobStatus::Published));
    }

    #[test]
    fn salary_order_validation() {
        assert!(validate_salary_order(Some(100), Some(200)).is_ok());
        assert!(validate_salary_order(None, Some(200)).is_ok());
        assert!(validate_salary_order(Some(200), Some(100)).is_err());
    }
}
