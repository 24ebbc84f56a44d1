use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Every problem this service emits. Status, title and type are fixed per
/// kind, so a body can never go out with a status but no title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemKind {
    Unauthorized,
    Forbidden,
    /// Unhandled handler failure surfaced by the development diagnostics.
    UnhandledException,
    /// Generic 500 produced on purpose by a handler.
    InternalServerError,
}

impl ProblemKind {
    pub fn status(self) -> StatusCode {
        match self {
            ProblemKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ProblemKind::Forbidden => StatusCode::FORBIDDEN,
            ProblemKind::UnhandledException | ProblemKind::InternalServerError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ProblemKind::Unauthorized => "Unauthorized",
            ProblemKind::Forbidden => "Forbidden",
            ProblemKind::UnhandledException => {
                "An unhandled exception occurred while processing the request"
            }
            ProblemKind::InternalServerError => "An error occurred while processing your request.",
        }
    }

    pub fn type_uri(self) -> &'static str {
        match self {
            ProblemKind::Unauthorized => "https://datatracker.ietf.org/doc/html/rfc7235#section-3.1",
            ProblemKind::Forbidden => "https://datatracker.ietf.org/doc/html/rfc7231#section-6.5.3",
            ProblemKind::UnhandledException | ProblemKind::InternalServerError => {
                "https://datatracker.ietf.org/doc/html/rfc7231#section-6.6.1"
            }
        }
    }
}

/// Structured error body written in place of an HTML page.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProblemDetails {
    pub status: u16,
    pub title: &'static str,
    #[serde(rename = "type")]
    pub type_uri: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(rename = "traceId", skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl ProblemDetails {
    pub fn new(kind: ProblemKind) -> Self {
        Self {
            status: kind.status().as_u16(),
            title: kind.title(),
            type_uri: kind.type_uri(),
            detail: None,
            trace_id: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (
            status,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
            )],
            axum::Json(self),
        )
            .into_response()
    }
}
