/**
 * User Routes
 * Admin back-office user management; profile updates for the caller
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
use crate::store::models::{UpdateUser, User, UserProfile, UserRole};
use crate::store::Store;

/// A user as exposed over the API. The password hash never leaves the
/// store.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserDetail {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            avatar: user.avatar,
            company_id: user.company_id,
            profile: user.profile,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub items: Vec<UserDetail>,
}

/// GET /api/users - All users (admin)
pub async fn list_users(State(store): State<Arc<Store>>, headers: HeaderMap) -> impl IntoResponse {
    if let Err(e) = require_role(&headers, &[UserRole::Admin]) {
        return e.into_response();
    }

    let items = store.users().into_iter().map(UserDetail::from).collect();
    (StatusCode::OK, Json(UserListResponse { items })).into_response()
}

/// GET /api/users/me - The caller's own record
pub async fn get_me(State(store): State<Arc<Store>>, headers: HeaderMap) -> impl IntoResponse {
    let claims = match require_role(
        &headers,
        &[UserRole::Applicant, UserRole::Company, UserRole::Admin],
    ) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };

    match store.find_user(&claims.sub) {
        Some(user) => (StatusCode::OK, Json(UserDetail::from(user))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("User not found")),
        )
            .into_response(),
    }
}

/// PATCH /api/users/me - Update the caller's profile. Role changes are
/// rejected here; only the admin endpoint may change roles.
pub async fn update_me(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
    Json(payload): Json<UpdateUser>,
) -> impl IntoResponse {
    let claims = match require_role(
        &headers,
        &[UserRole::Applicant, UserRole::Company, UserRole::Admin],
    ) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };

    if payload.role.is_some() {
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("Role can only be changed by an admin")),
        )
            .into_response();
    }

    match store.update_user(&claims.sub, payload) {
        Some(user) => (StatusCode::OK, Json(UserDetail::from(user))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("User not found")),
        )
            .into_response(),
    }
}

/// PATCH /api/users/:id - Moderate a user: role, company link, profile
/// (admin)
pub async fn update_user(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUser>,
) -> impl IntoResponse {
    if let Err(e) = require_role(&headers, &[UserRole::Admin]) {
        return e.into_response();
    }

    match store.update_user(&id, payload) {
        Some(user) => (StatusCode::OK, Json(UserDetail::from(user))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("User not found")),
        )
            .into_response(),
    }
}

/// DELETE /api/users/:id - Remove a user account (admin)
pub async fn delete_user(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let claims = match require_role(&headers, &[UserRole::Admin]) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };

    if claims.sub == id {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Cannot delete your own account")),
        )
            .into_response();
    }

    if store.delete_user(&id) {
        (StatusCode::OK, Json(SuccessResponse { success: true })).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("User not found")),
        )
            .into_response()
    }
}
