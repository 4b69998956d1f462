/**
 * Category Routes
 * Public category listing plus admin CRUD
 */
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::routes::auth::require_role;
use crate::routes::{ErrorResponse, SuccessResponse};
use crate::store::models::{Category, NewCategory, UpdateCategory, UserRole};
use crate::store::Store;

/// Category with the number of jobs filed under it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub job_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryDetail>,
}

/// GET /api/categories - All categories with job counts
pub async fn list_categories(State(store): State<Arc<Store>>) -> impl IntoResponse {
    let categories = store
        .categories()
        .into_iter()
        .map(|category| {
            let job_count = store.category_job_count(&category.id);
            CategoryDetail {
                category,
                job_count,
            }
        })
        .collect();
    (StatusCode::OK, Json(CategoryListResponse { categories }))
}

/// POST /api/categories - Create a category (admin); slug is derived
/// from the name
pub async fn create_category(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
    Json(payload): Json<NewCategory>,
) -> impl IntoResponse {
    if let Err(e) = require_role(&headers, &[UserRole::Admin]) {
        return e.into_response();
    }
    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Category name is required")),
        )
            .into_response();
    }

    let category = store.create_category(payload);
    tracing::info!(category = %category.id, slug = %category.slug, "category created");
    (StatusCode::CREATED, Json(category)).into_response()
}

/// PATCH /api/categories/:id - Update a category (admin)
pub async fn update_category(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCategory>,
) -> impl IntoResponse {
    if let Err(e) = require_role(&headers, &[UserRole::Admin]) {
        return e.into_response();
    }

    match store.update_category(&id, payload) {
        Some(category) => (StatusCode::OK, Json(category)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Category not found")),
        )
            .into_response(),
    }
}

/// DELETE /api/categories/:id - Delete a category (admin); refused
/// while jobs are still filed under it
pub async fn delete_category(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(e) = require_role(&headers, &[UserRole::Admin]) {
        return e.into_response();
    }

    let dependents = store.category_job_count(&id);
    if dependents > 0 {
        return (
            StatusCode::CONFLICT,
            Json(ErrorResponse::with_message(
                "Category has active jobs",
                format!("{dependents} job(s) still reference this category"),
            )),
        )
            .into_response();
    }

    if store.delete_category(&id) {
        (StatusCode::OK, Json(SuccessResponse { success: true })).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Category not found")),
        )
            .into_response()
    }
}
