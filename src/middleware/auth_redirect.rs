use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::cookie;
use crate::auth::extractor::AuthUser;
use crate::endpoint::Authorization;
use crate::redirect::{RedirectContext, RedirectEvent};
use crate::state::SharedState;

/// Cookie authentication for routed requests.
///
/// Resolves the signed-in user from the session cookie and checks it against
/// the endpoint's requirement. A failed check raises the login or
/// access-denied redirect event; registered redirect behaviors may turn the
/// default redirect into a problem response.
pub async fn cookie_authentication(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned());
    let requirement = state.endpoints.authorization(path.as_deref());
    let user = cookie::authenticate(req.headers(), &state.config.cookie);

    let Some(event) = challenge(requirement, user.as_ref()) else {
        if let Some(user) = user {
            req.extensions_mut().insert(user);
        }
        return next.run(req).await;
    };

    let style = state.endpoints.classify(path.as_deref());
    let cookie_config = &state.config.cookie;
    let target = match event {
        RedirectEvent::Login => &cookie_config.login_path,
        RedirectEvent::AccessDenied => &cookie_config.access_denied_path,
    };
    let return_url = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let redirect_uri =
        cookie::redirect_uri(target, &cookie_config.return_url_parameter, return_url);

    tracing::debug!(
        %event,
        endpoint = path.as_deref().unwrap_or("-"),
        %style,
        "Authentication challenge"
    );

    let mut ctx = RedirectContext::new(event, &req, style, redirect_uri);
    match event {
        RedirectEvent::Login => state.redirects.on_redirect_to_login(&mut ctx).await,
        RedirectEvent::AccessDenied => state.redirects.on_redirect_to_access_denied(&mut ctx).await,
    };
    ctx.into_response()
}

/// `None` when the request may proceed.
fn challenge(requirement: &Authorization, user: Option<&AuthUser>) -> Option<RedirectEvent> {
    match (requirement, user) {
        (Authorization::AllowAnonymous, _) => None,
        (_, None) => Some(RedirectEvent::Login),
        (Authorization::Authenticated, Some(_)) => None,
        (Authorization::Roles(roles), Some(user)) => {
            if roles.iter().any(|role| user.has_role(role)) {
                None
            } else {
                Some(RedirectEvent::AccessDenied)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: &[&str]) -> AuthUser {
        AuthUser {
            name: "carol".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn anonymous_endpoints_never_challenge() {
        assert_eq!(challenge(&Authorization::AllowAnonymous, None), None);
    }

    #[test]
    fn missing_user_needs_login() {
        assert_eq!(
            challenge(&Authorization::Authenticated, None),
            Some(RedirectEvent::Login)
        );
        assert_eq!(
            challenge(&Authorization::Roles(vec!["admin".to_string()]), None),
            Some(RedirectEvent::Login)
        );
    }

    #[test]
    fn missing_role_is_access_denied() {
        let roles = Authorization::Roles(vec!["admin".to_string()]);
        assert_eq!(challenge(&roles, Some(&user(&["user"]))), Some(RedirectEvent::AccessDenied));
        assert_eq!(challenge(&roles, Some(&user(&["admin"]))), None);
        assert_eq!(challenge(&Authorization::Authenticated, Some(&user(&[]))), None);
    }
}
