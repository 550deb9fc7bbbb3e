//! Unified error handling with Sentry integration.
//!
//! Every failure a shopper can hit ends on the same generic error page:
//! `AppError` responds with a redirect to `/error`. Server-side failures are
//! captured to Sentry and logged before responding. All route handlers
//! should return `Result<T, AppError>`.

use axum::response::{IntoResponse, Redirect, Response};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::ServiceError;

/// Path of the generic error page.
pub const ERROR_PATH: &str = "/error";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Service operation failed.
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The session cart is not in a state that allows the operation.
    #[error("Invalid cart: {0}")]
    InvalidCart(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        Self::Service(ServiceError::Repository(err))
    }
}

impl AppError {
    /// Whether this error is our fault rather than the shopper's.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Service(ServiceError::Repository(_)) | Self::Session(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::info!(error = %self, "Redirecting to error page");
        }

        Redirect::to(ERROR_PATH).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart
/// operations leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, String)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String(value.clone()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}
