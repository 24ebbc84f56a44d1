//! Redirect interception.
//!
//! The cookie authentication middleware raises two events: the request needs
//! a login, or the signed-in user may not access the endpoint. For each event
//! it prepares the default browser redirect inside a [`RedirectContext`] and
//! hands it to the [`RedirectDispatcher`]. Every registered
//! [`RedirectBehavior`] then gets a chance, in registration order, to replace
//! that redirect with a problem response for the endpoint style it owns.

pub mod controller;
pub mod minimal;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderValue, Method, Request, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};

use crate::endpoint::EndpointStyle;
use crate::error::RegistrationError;
use crate::problem::{ProblemDetails, ProblemKind};

pub use controller::ControllerRedirectBehavior;
pub use minimal::MinimalApiRedirectBehavior;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectEvent {
    Login,
    AccessDenied,
}

impl RedirectEvent {
    /// Status used instead of a redirect for script-initiated requests.
    fn ajax_status(self) -> StatusCode {
        match self {
            RedirectEvent::Login => StatusCode::UNAUTHORIZED,
            RedirectEvent::AccessDenied => StatusCode::FORBIDDEN,
        }
    }

    fn problem_kind(self) -> ProblemKind {
        match self {
            RedirectEvent::Login => ProblemKind::Unauthorized,
            RedirectEvent::AccessDenied => ProblemKind::Forbidden,
        }
    }
}

impl std::fmt::Display for RedirectEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RedirectEvent::Login => write!(f, "redirect-to-login"),
            RedirectEvent::AccessDenied => write!(f, "redirect-to-access-denied"),
        }
    }
}

/// Per-request state handed to redirect behaviors.
pub struct RedirectContext {
    event: RedirectEvent,
    method: Method,
    uri: Uri,
    endpoint: EndpointStyle,
    response: Response,
    committed: bool,
}

impl RedirectContext {
    pub fn new<B>(
        event: RedirectEvent,
        request: &Request<B>,
        endpoint: EndpointStyle,
        redirect_uri: String,
    ) -> Self {
        let response = default_response(event, request.headers(), &redirect_uri);
        Self {
            event,
            method: request.method().clone(),
            uri: request.uri().clone(),
            endpoint,
            response,
            committed: false,
        }
    }

    pub fn event(&self) -> RedirectEvent {
        self.event
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn endpoint_style(&self) -> EndpointStyle {
        self.endpoint
    }

    /// True once a behavior has replaced the default redirect.
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Replaces the pending response. Only the first write wins; later
    /// writes return `false` and leave the response untouched.
    pub fn write_problem(&mut self, problem: ProblemDetails) -> bool {
        if self.committed {
            return false;
        }
        self.response = problem.into_response();
        self.committed = true;
        true
    }

    pub fn into_response(self) -> Response {
        self.response
    }
}

fn default_response(event: RedirectEvent, headers: &HeaderMap, redirect_uri: &str) -> Response {
    let location = match HeaderValue::try_from(redirect_uri) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!("Invalid redirect location '{redirect_uri}': {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let status = if is_ajax_request(headers) {
        event.ajax_status()
    } else {
        StatusCode::FOUND
    };

    (status, [(header::LOCATION, location)]).into_response()
}

fn is_ajax_request(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .is_some_and(|v| v.as_bytes().eq_ignore_ascii_case(b"XMLHttpRequest"))
}

/// Replaces a pending redirect with the problem matching the event, if the
/// request's endpoint has the given style and nothing was written yet.
pub(crate) fn suppress_with_problem(ctx: &mut RedirectContext, style: EndpointStyle) -> bool {
    if ctx.endpoint_style() != style || ctx.is_committed() {
        return false;
    }
    let problem = ProblemDetails::new(ctx.event().problem_kind());
    ctx.write_problem(problem)
}

/// Strategy invoked on the two redirect events.
#[async_trait]
pub trait RedirectBehavior: Send + Sync {
    fn name(&self) -> &str;

    /// The endpoint style this behavior acts on.
    fn style(&self) -> EndpointStyle;

    /// Returns `true` if the login redirect was replaced.
    async fn on_redirect_to_login(&self, ctx: &mut RedirectContext) -> bool;

    /// Returns `true` if the access-denied redirect was replaced.
    async fn on_redirect_to_access_denied(&self, ctx: &mut RedirectContext) -> bool;
}

/// Ordered list of behaviors, fixed at startup.
#[derive(Default)]
pub struct RedirectDispatcher {
    behaviors: Vec<Arc<dyn RedirectBehavior>>,
}

impl RedirectDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller behavior first, then the minimal API behavior.
    pub fn with_default_behaviors() -> Self {
        Self {
            behaviors: vec![
                Arc::new(ControllerRedirectBehavior::new()),
                Arc::new(MinimalApiRedirectBehavior::new()),
            ],
        }
    }

    /// Appends a behavior. At most one behavior per endpoint style.
    pub fn register(
        &mut self,
        behavior: Arc<dyn RedirectBehavior>,
    ) -> Result<(), RegistrationError> {
        if let Some(existing) = self
            .behaviors
            .iter()
            .find(|b| b.style() == behavior.style())
        {
            return Err(RegistrationError::DuplicateBehavior {
                style: behavior.style(),
                existing: existing.name().to_string(),
                rejected: behavior.name().to_string(),
            });
        }
        self.behaviors.push(behavior);
        Ok(())
    }

    /// Behavior names in dispatch order.
    pub fn names(&self) -> Vec<&str> {
        self.behaviors.iter().map(|b| b.name()).collect()
    }

    /// Returns whether a behavior replaced the redirect during this call.
    pub async fn on_redirect_to_login(&self, ctx: &mut RedirectContext) -> bool {
        let mut suppressed = false;
        for behavior in &self.behaviors {
            if behavior.on_redirect_to_login(ctx).await {
                tracing::debug!(
                    behavior = behavior.name(),
                    method = %ctx.method(),
                    uri = %ctx.uri(),
                    "Login redirect replaced"
                );
                suppressed = true;
            }
        }
        suppressed
    }

    /// Returns whether a behavior replaced the redirect during this call.
    pub async fn on_redirect_to_access_denied(&self, ctx: &mut RedirectContext) -> bool {
        let mut suppressed = false;
        for behavior in &self.behaviors {
            if behavior.on_redirect_to_access_denied(ctx).await {
                tracing::debug!(
                    behavior = behavior.name(),
                    method = %ctx.method(),
                    uri = %ctx.uri(),
                    "Access-denied redirect replaced"
                );
                suppressed = true;
            }
        }
        suppressed
    }
}
