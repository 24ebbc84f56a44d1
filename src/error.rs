use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::diagnostics::UnhandledException;
use crate::endpoint::EndpointStyle;

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({ "error": message });
        let mut response = (status, axum::Json(body)).into_response();

        // Development diagnostics pick this up and reformat the response.
        if let AppError::Internal(msg) = self {
            response
                .extensions_mut()
                .insert(UnhandledException::new(msg));
        }

        response
    }
}

/// Startup composition errors. Any of these aborts the process before it
/// starts listening.
#[derive(Debug)]
pub enum RegistrationError {
    DuplicateRoute(String),
    ConflictingStyles(String),
    DuplicateBehavior {
        style: EndpointStyle,
        existing: String,
        rejected: String,
    },
}

impl std::fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationError::DuplicateRoute(path) => {
                write!(f, "Route registered more than once: {path}")
            }
            RegistrationError::ConflictingStyles(path) => {
                write!(f, "Route carries more than one endpoint style marker: {path}")
            }
            RegistrationError::DuplicateBehavior {
                style,
                existing,
                rejected,
            } => write!(
                f,
                "Redirect behavior '{rejected}' handles {style} endpoints, already handled by '{existing}'"
            ),
        }
    }
}

impl std::error::Error for RegistrationError {}
