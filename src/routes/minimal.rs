use axum::Json;
use axum::routing::get;

use crate::auth::extractor::AuthUser;
use crate::endpoint::RouteRegistration;
use crate::problem::{ProblemDetails, ProblemKind};
use crate::state::SharedState;
use crate::trace::TraceId;

/// Lightweight handlers. Each is tagged so auth failures answer with
/// problem bodies instead of redirects.
pub fn registrations() -> Vec<RouteRegistration<SharedState>> {
    vec![
        RouteRegistration::new("/minimal/api/values", get(list))
            .name("minimal values")
            .require_authorization()
            .minimal_api(),
        RouteRegistration::new("/minimal/api/values/problem", get(problem))
            .name("minimal values problem")
            .allow_anonymous()
            .minimal_api(),
        RouteRegistration::new("/minimal/api/values/throw", get(throw))
            .name("minimal values throw")
            .allow_anonymous()
            .minimal_api(),
        RouteRegistration::new("/minimal/api/values/admin", get(admin))
            .name("minimal values admin")
            .require_role("admin")
            .minimal_api(),
    ]
}

async fn list() -> Json<Vec<i32>> {
    Json(vec![1, 2, 3])
}

async fn problem(TraceId(trace_id): TraceId) -> ProblemDetails {
    ProblemDetails::new(ProblemKind::InternalServerError).with_trace_id(trace_id)
}

async fn throw() -> Json<Vec<i32>> {
    panic!("minimal values exploded")
}

async fn admin(user: AuthUser) -> Json<Vec<String>> {
    Json(vec![format!("secret for {}", user.name)])
}
