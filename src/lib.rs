pub mod auth;
pub mod config;
pub mod diagnostics;
pub mod endpoint;
pub mod error;
pub mod middleware;
pub mod problem;
pub mod redirect;
pub mod routes;
pub mod state;
pub mod trace;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::RegistrationError;
use crate::middleware::auth_redirect::cookie_authentication;
use crate::redirect::RedirectDispatcher;
use crate::state::{AppState, SharedState};

pub fn build_app(config: Config) -> Result<Router, RegistrationError> {
    let (router, endpoints) = routes::endpoints(&config.cookie).build()?;
    tracing::info!(count = endpoints.len(), "Endpoint table built");

    let redirects = RedirectDispatcher::with_default_behaviors();
    tracing::info!(behaviors = ?redirects.names(), "Redirect behaviors installed");

    let state: SharedState = Arc::new(AppState {
        config,
        endpoints,
        redirects,
    });

    let router = router.route_layer(axum::middleware::from_fn_with_state(
        state.clone(),
        cookie_authentication,
    ));
    let router = diagnostics::install(router, state.clone());

    let app = router
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .with_state(state);

    Ok(app)
}
