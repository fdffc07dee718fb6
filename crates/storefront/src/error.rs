//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that renders the JSON error body and
//! captures platform failures to Sentry before responding to the client. All
//! route handlers return `Result<T, AppError>`.
//!
//! ```json
//! { "errors": [ { "type": "CartEntryError", "reason": "notFound", "subject": "3", "message": "Entry not found" } ] }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::fields::FieldsError;
use crate::platform::FacadeError;
use crate::services::{EntryError, StockError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Cart entry operation failed.
    #[error(transparent)]
    Entry(#[from] EntryError),

    /// The `fields` query parameter could not be parsed.
    #[error("Invalid fields parameter: {0}")]
    Fields(#[from] FieldsError),

    /// Bad request from client (malformed path or body).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StockError> for AppError {
    fn from(err: StockError) -> Self {
        Self::Entry(err.into())
    }
}

impl From<FacadeError> for AppError {
    fn from(err: FacadeError) -> Self {
        Self::Entry(err.into())
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorList {
    pub errors: Vec<ErrorBody>,
}

/// A single entry of the JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

impl ErrorBody {
    fn new(error_type: &'static str, reason: &'static str, message: impl Into<String>) -> Self {
        Self {
            error_type,
            reason: Some(reason),
            subject: None,
            message: message.into(),
        }
    }

    fn with_subject(mut self, subject: impl ToString) -> Self {
        self.subject = Some(subject.to_string());
        self
    }
}

impl AppError {
    /// Whether this error is a server-side failure worth reporting.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Internal(_)
                | Self::Entry(
                    EntryError::Facade(FacadeError::Unavailable(_) | FacadeError::Rejected(_))
                        | EntryError::Stock(StockError::Facade(
                            FacadeError::Unavailable(_) | FacadeError::Rejected(_)
                        ))
                )
        )
    }

    /// Status code and client-facing body for this error.
    #[must_use]
    pub fn classify(&self) -> (StatusCode, ErrorBody) {
        match self {
            Self::Entry(err) => classify_entry(err),
            Self::Fields(err) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("ValidationError", "invalid", err.to_string()).with_subject("fields"),
            ),
            Self::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("ValidationError", "invalid", message.clone()),
            ),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error_type: "InternalError",
                    reason: None,
                    subject: None,
                    message: "Internal server error".to_string(),
                },
            ),
        }
    }
}

fn classify_entry(err: &EntryError) -> (StatusCode, ErrorBody) {
    let message = err.to_string();
    match err {
        EntryError::EntryNotFound(number) => (
            StatusCode::NOT_FOUND,
            ErrorBody::new("CartEntryError", "notFound", message).with_subject(number),
        ),
        EntryError::AmbiguousEntry { conflicting, .. } => (
            StatusCode::CONFLICT,
            ErrorBody::new("CartEntryError", "ambiguousEntry", message).with_subject(conflicting),
        ),
        EntryError::ProductCodeMismatch(_) => (
            StatusCode::BAD_REQUEST,
            ErrorBody::new("ValidationError", "productCodeNotMatch", message),
        ),
        EntryError::Validation { field, .. } => (
            StatusCode::BAD_REQUEST,
            ErrorBody::new("ValidationError", "invalid", message).with_subject(field),
        ),
        EntryError::Stock(stock) => classify_stock(stock),
        EntryError::EntryGroupNotFound(group) => (
            StatusCode::NOT_FOUND,
            ErrorBody::new("CartEntryGroupError", "notFound", message).with_subject(group),
        ),
        EntryError::EntryGroupsUnsupported => (
            StatusCode::NOT_IMPLEMENTED,
            ErrorBody::new("CartEntryGroupError", "unsupported", message),
        ),
        EntryError::Facade(facade) => classify_facade(facade),
    }
}

fn classify_stock(err: &StockError) -> (StatusCode, ErrorBody) {
    let (status, error_type) = match err {
        StockError::Facade(facade) => return classify_facade(facade),
        StockError::SystemUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "StockSystemError"),
        StockError::ProductOutOfStock(_) | StockError::ProductLowStock(_) => {
            (StatusCode::CONFLICT, "ProductLowStockError")
        }
        StockError::EntryOutOfStock(_) | StockError::EntryLowStock(_) => {
            (StatusCode::CONFLICT, "InsufficientStockError")
        }
    };
    (
        status,
        ErrorBody {
            error_type,
            reason: err.reason(),
            subject: err.subject(),
            message: err.to_string(),
        },
    )
}

fn classify_facade(err: &FacadeError) -> (StatusCode, ErrorBody) {
    match err {
        FacadeError::CartNotFound(cart) => (
            StatusCode::NOT_FOUND,
            ErrorBody::new("CartError", "notFound", "Cart not found").with_subject(cart),
        ),
        // Don't expose platform details to clients
        FacadeError::Unavailable(_) | FacadeError::Rejected(_) => (
            StatusCode::BAD_GATEWAY,
            ErrorBody {
                error_type: "PlatformError",
                reason: None,
                subject: None,
                message: "External service error".to_string(),
            },
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        let (status, body) = self.classify();
        (status, Json(ErrorList { errors: vec![body] })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for a cart action.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart
/// mutations leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, String)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb
            .data
            .insert((*key).to_string(), serde_json::Value::String(value.clone()));
    }

    sentry::add_breadcrumb(breadcrumb);
}
