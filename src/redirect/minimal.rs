use async_trait::async_trait;

use super::{RedirectBehavior, RedirectContext, suppress_with_problem};
use crate::endpoint::EndpointStyle;

/// Answers auth redirects on endpoints tagged with
/// [`RouteRegistration::minimal_api`](crate::endpoint::RouteRegistration::minimal_api).
#[derive(Debug, Default)]
pub struct MinimalApiRedirectBehavior;

impl MinimalApiRedirectBehavior {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RedirectBehavior for MinimalApiRedirectBehavior {
    fn name(&self) -> &str {
        "minimal-api"
    }

    fn style(&self) -> EndpointStyle {
        EndpointStyle::MinimalApi
    }

    async fn on_redirect_to_login(&self, ctx: &mut RedirectContext) -> bool {
        suppress_with_problem(ctx, EndpointStyle::MinimalApi)
    }

    async fn on_redirect_to_access_denied(&self, ctx: &mut RedirectContext) -> bool {
        suppress_with_problem(ctx, EndpointStyle::MinimalApi)
    }
}
