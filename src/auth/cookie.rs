use axum::http::HeaderMap;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::auth::extractor::AuthUser;
use crate::auth::jwt::{self, Claims};
use crate::config::CookieAuthConfig;

/// Reads the session cookie. A missing, malformed or expired cookie means
/// the request is anonymous.
pub fn authenticate(headers: &HeaderMap, config: &CookieAuthConfig) -> Option<AuthUser> {
    let jar = CookieJar::from_headers(headers);
    let cookie = jar.get(&config.cookie_name)?;

    match jwt::decode_token(cookie.value(), &config.secret) {
        Ok(claims) => Some(AuthUser::from(claims)),
        Err(e) => {
            tracing::debug!("Ignoring session cookie: {e}");
            None
        }
    }
}

/// Issues the session cookie for `name`.
pub fn sign_in(
    config: &CookieAuthConfig,
    name: String,
    roles: Vec<String>,
) -> Result<CookieJar, String> {
    let claims = Claims::new(name, roles, config.session_minutes);
    let token = jwt::encode_token(&claims, &config.secret)?;

    let session = Cookie::build((config.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(config.session_minutes))
        .build();

    Ok(CookieJar::new().add(session))
}

pub fn sign_out(config: &CookieAuthConfig) -> CookieJar {
    let session = Cookie::build((config.cookie_name.clone(), ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();
    CookieJar::new().add(session)
}

/// Builds `{path}?{parameter}={return_url}` with the return URL encoded.
pub fn redirect_uri(path: &str, parameter: &str, return_url: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair(parameter, return_url)
        .finish();
    format!("{path}?{query}")
}

/// Only same-site paths are accepted as post-login destinations.
pub fn is_local_url(url: &str) -> bool {
    url.starts_with('/') && !url.starts_with("//") && !url.starts_with("/\\")
}

#[cfg(test)]
mod tests {
    use axum::http::header;

    use super::*;

    fn config() -> CookieAuthConfig {
        CookieAuthConfig {
            secret: "test-secret".to_string(),
            cookie_name: "access_token".to_string(),
            session_minutes: 5,
            login_path: "/account/login".to_string(),
            access_denied_path: "/account/access-denied".to_string(),
            return_url_parameter: "ReturnUrl".to_string(),
            secure: false,
        }
    }

    fn headers_from(jar: CookieJar) -> HeaderMap {
        let cookie = jar.get("access_token").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            format!("{}={}", cookie.name(), cookie.value()).parse().unwrap(),
        );
        headers
    }

    #[test]
    fn signed_in_cookie_authenticates() {
        let config = config();
        let jar = sign_in(&config, "bob".to_string(), vec!["user".to_string()]).unwrap();
        let user = authenticate(&headers_from(jar), &config).unwrap();
        assert_eq!(user.name, "bob");
        assert!(user.has_role("user"));
    }

    #[test]
    fn garbage_cookie_is_anonymous() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "access_token=not-a-jwt".parse().unwrap());
        assert!(authenticate(&headers, &config()).is_none());
    }

    #[test]
    fn no_cookie_is_anonymous() {
        assert!(authenticate(&HeaderMap::new(), &config()).is_none());
    }

    #[test]
    fn redirect_uri_encodes_return_url() {
        assert_eq!(
            redirect_uri("/account/login", "ReturnUrl", "/api/values?x=1"),
            "/account/login?ReturnUrl=%2Fapi%2Fvalues%3Fx%3D1"
        );
    }

    #[test]
    fn rejects_off_site_return_urls() {
        assert!(is_local_url("/dashboard"));
        assert!(!is_local_url("//evil.example"));
        assert!(!is_local_url("/\\evil.example"));
        assert!(!is_local_url("https://evil.example"));
    }
}
