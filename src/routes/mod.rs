/**
 * Routes Module
 * API route handlers
 */

pub mod admin;
pub mod applications;
pub mod auth;
pub mod categories;
pub mod companies;
pub mod health;
pub mod jobs;
pub mod saved;
pub mod users;

use serde::Serialize;

/// Error body shared by every handler.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    pub fn with_message(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: Some(message.into()),
        }
    }
}

/// Success body for deletes and other acknowledged actions.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}
