use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::eligibility::Denial;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Identifier failed the boundary format check.
    #[error("{0}")]
    InvalidFormat(String),

    #[error("{0}")]
    NotFound(String),

    /// The eligibility gate denied redemption; carries everything the caller
    /// needs to render a retry time or appeal path.
    #[error("redemption denied: {}", .0.reason.as_str())]
    Ineligible(Box<Denial>),

    #[error("{0}")]
    Conflict(String),

    /// The pool ran dry for one component. Never partially satisfied.
    #[error("insufficient inventory for {component_id}: needed {needed}, available {available}")]
    InsufficientInventory {
        component_id: String,
        needed: i64,
        available: i64,
    },

    /// Component has no catalog entry. Operational alert, generic message
    /// to the customer.
    #[error("{0}")]
    Configuration(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn ineligible(denial: Denial) -> Self {
        AppError::Ineligible(Box::new(denial))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::InvalidFormat(msg) => {
                (StatusCode::BAD_REQUEST, json!({ "error": msg }))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Ineligible(denial) => (
                StatusCode::FORBIDDEN,
                json!({
                    "error": denial.message,
                    "reason": denial.reason.as_str(),
                    "retry_at": denial.retry_at,
                    "days_remaining": denial.days_remaining,
                    "can_appeal": denial.can_appeal,
                    "appeal_status": denial.appeal_status,
                }),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::InsufficientInventory {
                ref component_id,
                needed,
                available,
            } => {
                tracing::warn!(
                    component_id = %component_id,
                    needed,
                    available,
                    "license key pool exhausted"
                );
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({
                        "error": "No license keys available for this product. Please try again later or contact support.",
                        "retryable": true,
                    }),
                )
            }
            AppError::Configuration(msg) => {
                tracing::error!("configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Product not configured. Please contact support." }),
                )
            }
            AppError::Database(e) => {
                tracing::error!("database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            AppError::Pool(e) => {
                tracing::error!("connection pool error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
