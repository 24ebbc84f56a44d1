use async_trait::async_trait;

use super::{RedirectBehavior, RedirectContext, suppress_with_problem};
use crate::endpoint::EndpointStyle;

/// Answers auth redirects on controller endpoints with 401/403 problems.
#[derive(Debug, Default)]
pub struct ControllerRedirectBehavior;

impl ControllerRedirectBehavior {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RedirectBehavior for ControllerRedirectBehavior {
    fn name(&self) -> &str {
        "controller"
    }

    fn style(&self) -> EndpointStyle {
        EndpointStyle::Controller
    }

    async fn on_redirect_to_login(&self, ctx: &mut RedirectContext) -> bool {
        suppress_with_problem(ctx, EndpointStyle::Controller)
    }

    async fn on_redirect_to_access_denied(&self, ctx: &mut RedirectContext) -> bool {
        suppress_with_problem(ctx, EndpointStyle::Controller)
    }
}
