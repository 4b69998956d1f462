/**
 * Company Routes
 * Public company browsing plus admin CRUD
 */
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::routes::auth::require_role;
use crate::routes::{ErrorResponse, SuccessResponse};
use crate::store::models::{Company, CompanySize, NewCompany, UpdateCompany, UserRole};
use crate::store::query::{search_companies, CompanyFilter, DEFAULT_PAGE_SIZE};
use crate::store::Store;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub search: Option<String>,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub verified: Option<bool>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Company detail with the number of jobs it currently lists.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub job_count: usize,
}

/// GET /api/companies - Browse companies with filters and pagination
pub async fn list_companies(
    State(store): State<Arc<Store>>,
    Query(query): Query<CompanyListQuery>,
) -> impl IntoResponse {
    let size = match query.size.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => match raw.parse::<CompanySize>() {
            Ok(size) => Some(size),
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::with_message(
                        "Invalid size value",
                        raw.to_string(),
                    )),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let filter = CompanyFilter {
        search: query.search,
        industry: query.industry,
        size,
        verified_only: query.verified.unwrap_or(false),
    };
    let page = search_companies(store.companies(), &filter, query.page, query.limit);
    (StatusCode::OK, Json(page)).into_response()
}

/// GET /api/companies/:id - Company detail with job count
pub async fn get_company(
    State(store): State<Arc<Store>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match store.find_company(&id) {
        Some(company) => {
            let job_count = store.company_job_count(&company.id);
            (StatusCode::OK, Json(CompanyDetail { company, job_count })).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Company not found")),
        )
            .into_response(),
    }
}

/// POST /api/companies - Create a company (admin)
pub async fn create_company(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
    Json(payload): Json<NewCompany>,
) -> impl IntoResponse {
    if let Err(e) = require_role(&headers, &[UserRole::Admin]) {
        return e.into_response();
    }
    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Company name is required")),
        )
            .into_response();
    }

    let company = store.create_company(payload);
    tracing::info!(company = %company.id, name = %company.name, "company created");
    (StatusCode::CREATED, Json(company)).into_response()
}

/// PATCH /api/companies/:id - Update a company (admin)
pub async fn update_company(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCompany>,
) -> impl IntoResponse {
    if let Err(e) = require_role(&headers, &[UserRole::Admin]) {
        return e.into_response();
    }

    match store.update_company(&id, payload) {
        Some(company) => (StatusCode::OK, Json(company)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Company not found")),
        )
            .into_response(),
    }
}

/// DELETE /api/companies/:id - Delete a company (admin)
///
/// Refused while jobs still reference the company. The store's delete
/// primitive does not check this; the guard lives here with the caller.
pub async fn delete_company(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(e) = require_role(&headers, &[UserRole::Admin]) {
        return e.into_response();
    }

    let dependents = store.company_job_count(&id);
    if dependents > 0 {
        return (
            StatusCode::CONFLICT,
            Json(ErrorResponse::with_message(
                "Company has active jobs",
                format!("{dependents} job(s) still reference this company"),
            )),
        )
            .into_response();
    }

    if store.delete_company(&id) {
        (StatusCode::OK, Json(SuccessResponse { success: true })).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Company not found")),
        )
            .into_response()
    }
}

/// The dependent-jobs guard used by the delete handler, separated so
/// the refusal rule is testable without HTTP plumbing.
pub fn deletion_blocked(store: &Store, company_id: &str) -> bool {
    store.company_job_count(company_id) > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreConfig;

    fn test_store() -> (Arc<Store>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(StoreConfig {
            data_dir: dir.path().to_path_buf(),
        });
        (Arc::new(store), dir)
    }

    #[test]
    fn guard_refuses_while_store_primitive_succeeds() {
        let (store, _dir) = test_store();
        // company-1 has a seeded dependent job: the caller-side guard
        // refuses, but the store-level delete still goes through when
        // invoked directly.
        assert!(deletion_blocked(&store, "company-1"));
        assert!(store.delete_company("company-1"));

        // company-4 has no jobs; the guard allows deletion.
        assert!(!deletion_blocked(&store, "company-4"));
    }
}
