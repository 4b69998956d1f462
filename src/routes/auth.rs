/**
 * Authentication Routes
 * JWT-based authentication with register, login, verify, refresh, and logout
 */
use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::routes::ErrorResponse;
use crate::store::models::{NewUser, User, UserRole};
use crate::store::Store;

// ============================================================================
// Configuration
// ============================================================================

lazy_static::lazy_static! {
    /// JWT secret key from environment
    pub static ref JWT_SECRET: String = std::env::var("JWT_SECRET")
        .unwrap_or_else(|_| "default-jwt-secret-change-in-production".to_string());

    /// Refresh token bookkeeping (in-memory, keyed by SHA-256 of the token)
    static ref REFRESH_TOKENS: Arc<RwLock<HashMap<String, RefreshTokenData>>> =
        Arc::new(RwLock::new(HashMap::new()));

    /// Rate limit storage (IP -> last request timestamp)
    static ref RATE_LIMIT: Arc<RwLock<HashMap<String, i64>>> =
        Arc::new(RwLock::new(HashMap::new()));
}

/// Access token expiry in minutes
const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 15;

/// Refresh token expiry in days
const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;

/// Rate limit window in seconds for register/login per IP
const RATE_LIMIT_WINDOW_SECS: i64 = 60;

// ============================================================================
// Types
// ============================================================================

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,   // User ID
    pub email: String, // User email
    pub role: String,  // User role
    pub exp: i64,      // Expiry timestamp
    pub iat: i64,      // Issued at timestamp
}

/// Stored refresh token data
#[derive(Debug, Clone)]
struct RefreshTokenData {
    user_id: String,
    email: String,
    role: String,
    expires_at: i64,
    revoked: bool,
}

/// User info returned to the frontend
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.as_str().to_string(),
        }
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    /// APPLICANT (default) or COMPANY; admin accounts are seeded, not
    /// self-registered.
    pub role: Option<String>,
    pub company_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub user: Option<UserInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub user: Option<UserInfo>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub success: bool,
    pub is_valid: bool,
    pub user: Option<UserInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub success: bool,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Generate a random refresh token
fn generate_refresh_token() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), 64)
}

/// Hash a refresh token for storage. A cryptographic hash keeps the
/// stored map useless as a source of replayable tokens.
fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Create access token
fn create_access_token(
    user_id: &str,
    email: &str,
    role: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let exp = now + Duration::minutes(ACCESS_TOKEN_EXPIRY_MINUTES);

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
}

/// Verify and decode access token
pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(JWT_SECRET.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

/// Verify the bearer token and check the caller holds one of `roles`.
/// Used by every protected handler.
pub fn require_role(
    headers: &HeaderMap,
    roles: &[UserRole],
) -> Result<Claims, (StatusCode, Json<ErrorResponse>)> {
    let token = extract_bearer_token(headers).ok_or((
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new("Authorization required")),
    ))?;
    let claims = verify_access_token(&token).map_err(|_| {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("Invalid or expired token")),
        )
    })?;
    let role: UserRole = claims.role.parse().map_err(|_| {
        (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("Unknown role")),
        )
    })?;
    if !roles.contains(&role) {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("Insufficient permissions")),
        ));
    }
    Ok(claims)
}

/// Check rate limit for an IP.
///
/// Stale entries are evicted on every write so the map stays
/// proportional to the number of active IPs.
async fn check_rate_limit(ip: &str) -> bool {
    #[cfg(test)]
    {
        let _ = ip;
        return true; // Bypass in tests so validation and credentials are exercised
    }

    #[cfg(not(test))]
    {
        let now = Utc::now().timestamp();
        let mut limits = RATE_LIMIT.write().await;
        limits.retain(|_, last| now - *last < RATE_LIMIT_WINDOW_SECS);

        if let Some(last_request) = limits.get(ip) {
            if now - last_request < RATE_LIMIT_WINDOW_SECS {
                return false;
            }
        }

        limits.insert(ip.to_string(), now);
        true
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/register
/// Create an applicant or company account
pub async fn register(
    State(store): State<Arc<Store>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    let ip = addr.ip().to_string();

    if !check_rate_limit(&ip).await {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(RegisterResponse {
                success: false,
                user: None,
                error: Some("Too many requests. Please try again later.".to_string()),
            }),
        );
    }

    if payload.email.is_empty() || payload.password.is_empty() || payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(RegisterResponse {
                success: false,
                user: None,
                error: Some("Name, email and password are required".to_string()),
            }),
        );
    }

    if !payload.email.contains('@') {
        return (
            StatusCode::BAD_REQUEST,
            Json(RegisterResponse {
                success: false,
                user: None,
                error: Some("Invalid email format".to_string()),
            }),
        );
    }

    if payload.password.len() < 8 {
        return (
            StatusCode::BAD_REQUEST,
            Json(RegisterResponse {
                success: false,
                user: None,
                error: Some("Password must be at least 8 characters long".to_string()),
            }),
        );
    }

    // Self-registration is limited to applicant and company accounts.
    let role = match payload.role.as_deref() {
        None | Some("APPLICANT") => UserRole::Applicant,
        Some("COMPANY") => UserRole::Company,
        Some(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(RegisterResponse {
                    success: false,
                    user: None,
                    error: Some("Role must be APPLICANT or COMPANY".to_string()),
                }),
            );
        }
    };

    // bcrypt is intentionally CPU-intensive; run it outside the async
    // executor so it doesn't block other in-flight tasks.
    let password = payload.password.clone();
    let password_hash = match tokio::task::spawn_blocking(move || hash(&password, DEFAULT_COST)).await
    {
        Ok(Ok(h)) => h,
        Ok(Err(e)) => {
            tracing::error!("Failed to hash password: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RegisterResponse {
                    success: false,
                    user: None,
                    error: Some("Failed to process password".to_string()),
                }),
            );
        }
        Err(e) => {
            tracing::error!("spawn_blocking panic during hash: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RegisterResponse {
                    success: false,
                    user: None,
                    error: Some("Failed to process password".to_string()),
                }),
            );
        }
    };

    match store.create_user(NewUser {
        email: payload.email,
        password_hash,
        name: payload.name,
        role,
        company_id: payload.company_id,
    }) {
        Some(user) => {
            tracing::info!("User registered: {}", user.email);
            (
                StatusCode::CREATED,
                Json(RegisterResponse {
                    success: true,
                    user: Some(UserInfo::from(&user)),
                    error: None,
                }),
            )
        }
        None => (
            StatusCode::CONFLICT,
            Json(RegisterResponse {
                success: false,
                user: None,
                error: Some("Email already registered".to_string()),
            }),
        ),
    }
}

/// POST /api/auth/login
/// Authenticate user and return tokens
pub async fn login(
    State(store): State<Arc<Store>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let ip = addr.ip().to_string();

    if !check_rate_limit(&ip).await {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(LoginResponse {
                success: false,
                user: None,
                access_token: None,
                refresh_token: None,
                error: Some("Too many requests. Please try again later.".to_string()),
            }),
        );
    }

    if payload.email.is_empty() || payload.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(LoginResponse {
                success: false,
                user: None,
                access_token: None,
                refresh_token: None,
                error: Some("Email and password are required".to_string()),
            }),
        );
    }

    let invalid_credentials = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(LoginResponse {
                success: false,
                user: None,
                access_token: None,
                refresh_token: None,
                error: Some("Invalid email or password".to_string()),
            }),
        )
    };

    let user = match store.find_user_by_email(&payload.email) {
        Some(user) => user,
        None => return invalid_credentials(),
    };

    let password = payload.password.clone();
    let password_hash = user.password_hash.clone();
    let verified =
        match tokio::task::spawn_blocking(move || verify(&password, &password_hash)).await {
            Ok(Ok(ok)) => ok,
            _ => false,
        };
    if !verified {
        return invalid_credentials();
    }

    let role = user.role.as_str();
    let access_token = match create_access_token(&user.id, &user.email, role) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Failed to create access token: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(LoginResponse {
                    success: false,
                    user: None,
                    access_token: None,
                    refresh_token: None,
                    error: Some("Failed to create session".to_string()),
                }),
            );
        }
    };

    let refresh_token = generate_refresh_token();
    let expires_at = (Utc::now() + Duration::days(REFRESH_TOKEN_EXPIRY_DAYS)).timestamp();
    REFRESH_TOKENS.write().await.insert(
        hash_refresh_token(&refresh_token),
        RefreshTokenData {
            user_id: user.id.clone(),
            email: user.email.clone(),
            role: role.to_string(),
            expires_at,
            revoked: false,
        },
    );

    store.set_current_user(Some(&user));
    tracing::info!(user = %user.email, "login successful");

    (
        StatusCode::OK,
        Json(LoginResponse {
            success: true,
            user: Some(UserInfo::from(&user)),
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
            error: None,
        }),
    )
}

/// POST /api/auth/verify
/// Validate the bearer token and return the user it belongs to
pub async fn verify_token(State(store): State<Arc<Store>>, headers: HeaderMap) -> impl IntoResponse {
    let token = match extract_bearer_token(&headers) {
        Some(t) => t,
        None => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(VerifyResponse {
                    success: false,
                    is_valid: false,
                    user: None,
                    error: Some("Authorization required".to_string()),
                }),
            );
        }
    };

    match verify_access_token(&token) {
        Ok(claims) => {
            let user = store.find_user(&claims.sub).map(|u| UserInfo::from(&u));
            (
                StatusCode::OK,
                Json(VerifyResponse {
                    success: true,
                    is_valid: true,
                    user,
                    error: None,
                }),
            )
        }
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            Json(VerifyResponse {
                success: false,
                is_valid: false,
                user: None,
                error: Some("Invalid or expired token".to_string()),
            }),
        ),
    }
}

/// POST /api/auth/refresh
/// Rotate a refresh token into a fresh token pair
pub async fn refresh(Json(payload): Json<RefreshRequest>) -> impl IntoResponse {
    let key = hash_refresh_token(&payload.refresh_token);
    let mut tokens = REFRESH_TOKENS.write().await;

    let data = match tokens.get(&key) {
        Some(data) => data.clone(),
        None => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(RefreshResponse {
                    success: false,
                    access_token: None,
                    refresh_token: None,
                    error: Some("Invalid refresh token".to_string()),
                }),
            );
        }
    };

    if data.revoked || data.expires_at < Utc::now().timestamp() {
        tokens.remove(&key);
        return (
            StatusCode::UNAUTHORIZED,
            Json(RefreshResponse {
                success: false,
                access_token: None,
                refresh_token: None,
                error: Some("Refresh token expired or revoked".to_string()),
            }),
        );
    }

    let access_token = match create_access_token(&data.user_id, &data.email, &data.role) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Failed to create access token: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RefreshResponse {
                    success: false,
                    access_token: None,
                    refresh_token: None,
                    error: Some("Failed to refresh session".to_string()),
                }),
            );
        }
    };

    // Rotate: the old token is single-use.
    tokens.remove(&key);
    let new_refresh = generate_refresh_token();
    let expires_at = (Utc::now() + Duration::days(REFRESH_TOKEN_EXPIRY_DAYS)).timestamp();
    tokens.insert(
        hash_refresh_token(&new_refresh),
        RefreshTokenData {
            expires_at,
            revoked: false,
            ..data
        },
    );

    (
        StatusCode::OK,
        Json(RefreshResponse {
            success: true,
            access_token: Some(access_token),
            refresh_token: Some(new_refresh),
            error: None,
        }),
    )
}

/// POST /api/auth/logout
/// Revoke the refresh token and clear the current-user record
pub async fn logout(
    State(store): State<Arc<Store>>,
    Json(payload): Json<LogoutRequest>,
) -> impl IntoResponse {
    if let Some(token) = payload.refresh_token {
        REFRESH_TOKENS
            .write()
            .await
            .remove(&hash_refresh_token(&token));
    }
    store.set_current_user(None);
    (StatusCode::OK, Json(LogoutResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_tokens_round_trip() {
        let token = create_access_token("user-1", "a@b.com", "ADMIN").unwrap();
        let claims = verify_access_token(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, "ADMIN");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!(verify_access_token("not-a-jwt").is_err());
    }

    #[test]
    fn refresh_tokens_are_long_and_hashed() {
        let token = generate_refresh_token();
        assert_eq!(token.len(), 64);
        let hashed = hash_refresh_token(&token);
        assert_eq!(hashed.len(), 64); // hex sha-256
        assert_ne!(hashed, token);
        assert_eq!(hashed, hash_refresh_token(&token));
    }

    #[test]
    fn require_role_enforces_membership() {
        let token = create_access_token("user-1", "a@b.com", "APPLICANT").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("authorization", format!("Bearer {token}").parse().unwrap());

        assert!(require_role(&headers, &[UserRole::Applicant]).is_ok());
        let err = require_role(&headers, &[UserRole::Admin]).unwrap_err();
        assert_eq!(err.0, StatusCode::FORBIDDEN);

        let empty = HeaderMap::new();
        let err = require_role(&empty, &[UserRole::Admin]).unwrap_err();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);
    }
}
