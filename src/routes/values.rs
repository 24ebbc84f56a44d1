use axum::Json;
use axum::routing::get;

use crate::auth::extractor::AuthUser;
use crate::endpoint::{Controller, RouteRegistration};
use crate::error::AppError;
use crate::problem::{ProblemDetails, ProblemKind};
use crate::state::SharedState;
use crate::trace::TraceId;

/// `/api/values`, signed-in users only unless an action says otherwise.
pub struct ValuesController;

impl Controller<SharedState> for ValuesController {
    fn name(&self) -> &'static str {
        "values"
    }

    fn actions(&self) -> Vec<RouteRegistration<SharedState>> {
        vec![
            RouteRegistration::new("/api/values", get(list)),
            RouteRegistration::new("/api/values/problem", get(problem)).allow_anonymous(),
            RouteRegistration::new("/api/values/throw", get(throw)).allow_anonymous(),
            RouteRegistration::new("/api/values/fail", get(fail)).allow_anonymous(),
            RouteRegistration::new("/api/values/admin", get(admin)).require_role("admin"),
        ]
    }
}

pub async fn list(user: AuthUser) -> Json<Vec<i32>> {
    tracing::debug!(user = %user.name, "Listing values");
    Json(vec![1, 2, 3])
}

pub async fn problem(TraceId(trace_id): TraceId) -> ProblemDetails {
    ProblemDetails::new(ProblemKind::InternalServerError).with_trace_id(trace_id)
}

pub async fn throw() -> Json<Vec<i32>> {
    panic!("values exploded")
}

pub async fn fail() -> Result<Json<Vec<i32>>, AppError> {
    Err(AppError::Internal("values store unavailable".to_string()))
}

pub async fn admin(user: AuthUser) -> Result<Json<Vec<&'static str>>, AppError> {
    user.require_role("admin")?;
    Ok(Json(vec!["secret"]))
}
