use std::collections::HashMap;

use askama::Template;
use axum::Form;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::auth::cookie;
use crate::error::AppError;
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "account/login.html")]
struct LoginTemplate {
    error: Option<String>,
    action: String,
    return_url: String,
}

#[derive(Template)]
#[template(path = "account/access_denied.html")]
struct AccessDeniedTemplate {
    return_url: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub return_url: Option<String>,
}

fn return_url(state: &SharedState, query: &HashMap<String, String>) -> String {
    query
        .get(&state.config.cookie.return_url_parameter)
        .cloned()
        .unwrap_or_default()
}

pub async fn login_page(
    State(state): State<SharedState>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let template = LoginTemplate {
        error: None,
        action: state.config.cookie.login_path.clone(),
        return_url: return_url(&state, &query),
    };
    Html(template.render().unwrap_or_default())
}

/// Development sign-in: any non-empty user name gets a session. Names listed
/// in the admin configuration also get the `admin` role.
pub async fn login(
    State(state): State<SharedState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let username = form.username.trim().to_string();
    let destination = form
        .return_url
        .filter(|url| cookie::is_local_url(url))
        .unwrap_or_else(|| "/".to_string());

    if username.is_empty() {
        let template = LoginTemplate {
            error: Some("User name is required".to_string()),
            action: state.config.cookie.login_path.clone(),
            return_url: destination,
        };
        return Ok((
            StatusCode::BAD_REQUEST,
            Html(template.render().unwrap_or_default()),
        )
            .into_response());
    }

    let mut roles = vec!["user".to_string()];
    if state.config.admin_users.iter().any(|u| u == &username) {
        roles.push("admin".to_string());
    }

    tracing::info!(user = %username, ?roles, "Signed in");

    let jar: CookieJar =
        cookie::sign_in(&state.config.cookie, username, roles).map_err(AppError::Internal)?;
    Ok((jar, Redirect::to(&destination)).into_response())
}

pub async fn logout(State(state): State<SharedState>) -> impl IntoResponse {
    (cookie::sign_out(&state.config.cookie), Redirect::to("/"))
}

pub async fn access_denied_page(
    State(state): State<SharedState>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let template = AccessDeniedTemplate {
        return_url: return_url(&state, &query),
    };
    (
        StatusCode::FORBIDDEN,
        Html(template.render().unwrap_or_default()),
    )
}
