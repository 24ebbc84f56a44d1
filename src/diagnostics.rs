//! Development-time handling of unhandled handler failures.
//!
//! A failure is either a panic inside the handler or a response tagged with
//! [`UnhandledException`] (see [`AppError::Internal`](crate::error::AppError)).
//! Controller endpoints get a 500 problem body with the failure message and
//! trace id. Everything else, and any request carrying the force-HTML query
//! parameter, falls through to the HTML diagnostic page.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use askama::Template;
use axum::Router;
use axum::extract::{MatchedPath, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use futures_util::FutureExt;
use tower_http::catch_panic::CatchPanicLayer;

use crate::endpoint::EndpointStyle;
use crate::problem::{ProblemDetails, ProblemKind};
use crate::state::SharedState;
use crate::trace;

/// Response extension marking a 500 produced from an internal error.
#[derive(Debug, Clone)]
pub struct UnhandledException {
    message: String,
}

impl UnhandledException {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

struct ExceptionContext {
    style: EndpointStyle,
    force_html: bool,
    trace_id: String,
    path: String,
    failure: UnhandledException,
}

#[derive(Template)]
#[template(path = "diagnostics/exception.html")]
struct ExceptionPage<'a> {
    message: &'a str,
    path: &'a str,
    trace_id: &'a str,
}

/// Installs the failure handling for the configured environment: the
/// problem converter in development, a bare catch-panic layer otherwise.
pub fn install(router: Router<SharedState>, state: SharedState) -> Router<SharedState> {
    if state.config.environment.is_development() {
        router.route_layer(middleware::from_fn_with_state(
            state,
            developer_exception_problems,
        ))
    } else {
        router.layer(CatchPanicLayer::new())
    }
}

pub async fn developer_exception_problems(
    State(state): State<SharedState>,
    req: Request,
    next: Next,
) -> Response {
    let style = state.endpoints.classify(
        req.extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str),
    );
    let force_html = has_query_flag(req.uri().query(), &state.config.force_html_parameter);
    let trace_id = trace::trace_id(req.extensions());
    let path = req.uri().path().to_owned();

    let failure = match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => match response.extensions().get::<UnhandledException>() {
            Some(failure) => failure.clone(),
            None => return response,
        },
        Err(panic) => UnhandledException::new(panic_message(panic.as_ref())),
    };

    tracing::error!(
        %path,
        %style,
        %trace_id,
        "Unhandled failure: {}",
        failure.message()
    );

    let ctx = ExceptionContext {
        style,
        force_html,
        trace_id,
        path,
        failure,
    };
    exception_problem(&ctx).unwrap_or_else(|| exception_page(&ctx))
}

/// `None` defers to the next handler in the chain.
fn exception_problem(ctx: &ExceptionContext) -> Option<Response> {
    if ctx.style != EndpointStyle::Controller || ctx.force_html {
        return None;
    }
    let problem = ProblemDetails::new(ProblemKind::UnhandledException)
        .with_detail(ctx.failure.message())
        .with_trace_id(ctx.trace_id.clone());
    Some(problem.into_response())
}

fn exception_page(ctx: &ExceptionContext) -> Response {
    let page = ExceptionPage {
        message: ctx.failure.message(),
        path: &ctx.path,
        trace_id: &ctx.trace_id,
    };
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(page.render().unwrap_or_default()),
    )
        .into_response()
}

fn has_query_flag(query: Option<&str>, flag: &str) -> bool {
    query.is_some_and(|q| {
        form_urlencoded::parse(q.as_bytes()).any(|(key, _)| key.eq_ignore_ascii_case(flag))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
