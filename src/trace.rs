use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::Extensions;
use axum::http::request::Parts;
use tower_http::request_id::RequestId;
use uuid::Uuid;

/// Identifier reported as `traceId` in problem bodies: the request id set by
/// the request-id layer, or a fresh one if that layer is absent.
pub fn trace_id(extensions: &Extensions) -> String {
    extensions
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::now_v7().to_string())
}

#[derive(Debug, Clone)]
pub struct TraceId(pub String);

impl<S> FromRequestParts<S> for TraceId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(TraceId(trace_id(&parts.extensions)))
    }
}
