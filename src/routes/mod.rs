pub mod account;
pub mod minimal;
pub mod pages;
pub mod values;

use axum::routing::{get, post};

use crate::config::CookieAuthConfig;
use crate::endpoint::{EndpointRouteBuilder, RouteRegistration};
use crate::error::AppError;
use crate::state::SharedState;

/// Account pages are mounted where the cookie pipeline redirects to.
pub fn endpoints(cookie: &CookieAuthConfig) -> EndpointRouteBuilder<SharedState> {
    let builder = EndpointRouteBuilder::new()
        .controller(values::ValuesController)
        // Browser pages
        .map(RouteRegistration::new("/", get(pages::home)))
        .map(RouteRegistration::new("/dashboard", get(pages::dashboard)).require_authorization())
        // Account
        .map(
            RouteRegistration::new(
                cookie.login_path.as_str(),
                get(account::login_page).post(account::login),
            )
            .allow_anonymous(),
        )
        .map(RouteRegistration::new("/account/logout", post(account::logout)).allow_anonymous())
        .map(
            RouteRegistration::new(cookie.access_denied_path.as_str(), get(account::access_denied_page))
                .allow_anonymous(),
        )
        .map(RouteRegistration::new("/health", get(health)));

    minimal::registrations()
        .into_iter()
        .fold(builder, EndpointRouteBuilder::map)
}

pub async fn not_found(uri: axum::http::Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

async fn health() -> &'static str {
    "ok"
}
