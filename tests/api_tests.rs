mod common;

use reqwest::{StatusCode, header};
use serde_json::{Value, json};

const PROBLEM_JSON: &str = "application/problem+json";

// ── Health ──────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_ok() {
    let app = common::spawn_app().await;

    let resp = app.get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

// ── Login redirect on API endpoints ─────────────────────────────

#[tokio::test]
async fn controller_endpoint_without_session_returns_401_problem() {
    let app = common::spawn_app().await;

    let resp = app.get("/api/values").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().get(header::LOCATION).is_none());
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), PROBLEM_JSON);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "status": 401,
            "title": "Unauthorized",
            "type": "https://datatracker.ietf.org/doc/html/rfc7235#section-3.1"
        })
    );
}

#[tokio::test]
async fn minimal_endpoint_without_session_returns_401_problem() {
    let app = common::spawn_app().await;

    let resp = app.get("/minimal/api/values").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().get(header::LOCATION).is_none());

    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "status": 401,
            "title": "Unauthorized",
            "type": "https://datatracker.ietf.org/doc/html/rfc7235#section-3.1"
        })
    );
}

#[tokio::test]
async fn invalid_session_cookie_is_treated_as_anonymous() {
    let app = common::spawn_app().await;

    let resp = app
        .get_with_cookie("/api/values", "access_token=not-a-token")
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ── Browser pages keep the redirect ─────────────────────────────

#[tokio::test]
async fn unclassified_page_redirects_to_login() {
    let app = common::spawn_app().await;

    let resp = app.get("/dashboard?tab=1").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "/account/login?ReturnUrl=%2Fdashboard%3Ftab%3D1"
    );
}

#[tokio::test]
async fn unclassified_page_answers_ajax_with_401() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .get(app.url("/dashboard"))
        .header("X-Requested-With", "XMLHttpRequest")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::LOCATION));
    assert_ne!(
        resp.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
        Some(PROBLEM_JSON.as_bytes())
    );
}

#[tokio::test]
async fn anonymous_pages_are_served() {
    let app = common::spawn_app().await;

    let resp = app.get("/").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.get("/account/login?ReturnUrl=%2Fdashboard").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("dashboard"));
}

// ── Authorized requests ─────────────────────────────────────────

#[tokio::test]
async fn signed_in_user_gets_values() {
    let app = common::spawn_app().await;
    let cookie = app.session_cookie("bob").await;

    let resp = app.get_with_cookie("/api/values", &cookie).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!([1, 2, 3]));

    let resp = app.get_with_cookie("/minimal/api/values", &cookie).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!([1, 2, 3]));
}

#[tokio::test]
async fn signed_in_user_sees_dashboard() {
    let app = common::spawn_app().await;
    let cookie = app.session_cookie("bob").await;

    let resp = app.get_with_cookie("/dashboard", &cookie).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("Signed in as bob"));
}

#[tokio::test]
async fn admin_gets_admin_values() {
    let app = common::spawn_app().await;
    let cookie = app.session_cookie("admin").await;

    let resp = app.get_with_cookie("/api/values/admin", &cookie).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!(["secret"]));
}

// ── Access denied ───────────────────────────────────────────────

#[tokio::test]
async fn controller_endpoint_without_role_returns_403_problem() {
    let app = common::spawn_app().await;
    let cookie = app.session_cookie("bob").await;

    let resp = app.get_with_cookie("/api/values/admin", &cookie).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(resp.headers().get(header::LOCATION).is_none());

    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "status": 403,
            "title": "Forbidden",
            "type": "https://datatracker.ietf.org/doc/html/rfc7231#section-6.5.3"
        })
    );
}

#[tokio::test]
async fn minimal_endpoint_without_role_returns_403_problem() {
    let app = common::spawn_app().await;
    let cookie = app.session_cookie("bob").await;

    let resp = app.get_with_cookie("/minimal/api/values/admin", &cookie).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["title"], "Forbidden");
}

// ── Problems and unhandled failures ─────────────────────────────

#[tokio::test]
async fn explicit_problem_bypasses_redirects() {
    let app = common::spawn_app().await;

    let resp = app.get("/api/values/problem").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), PROBLEM_JSON);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], 500);
    assert_eq!(body["title"], "An error occurred while processing your request.");
    assert_eq!(
        body["type"],
        "https://datatracker.ietf.org/doc/html/rfc7231#section-6.6.1"
    );
    assert!(body.get("detail").is_none());
}

#[tokio::test]
async fn controller_panic_returns_500_problem_with_trace_id() {
    let app = common::spawn_app().await;

    let resp = app.get("/api/values/throw").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let request_id = resp
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("request id header");

    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["title"],
        "An unhandled exception occurred while processing the request"
    );
    assert!(body["detail"].as_str().unwrap().contains("values exploded"));
    assert_eq!(body["traceId"], request_id.as_str());
}

#[tokio::test]
async fn forcehtml_returns_diagnostic_page() {
    let app = common::spawn_app().await;

    let resp = app.get("/api/values/throw?forcehtml=1").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/html"));
    assert!(resp.text().await.unwrap().contains("values exploded"));
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = common::spawn_app().await;

    let resp = app.get("/nope").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("/nope"));
}

// ── Account ─────────────────────────────────────────────────────

#[tokio::test]
async fn login_redirects_to_local_return_url() {
    let app = common::spawn_app().await;

    let resp = app.login("bob", "/dashboard").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/dashboard");
    assert!(common::set_cookie(&resp).unwrap().starts_with("access_token="));
}

#[tokio::test]
async fn login_ignores_off_site_return_url() {
    let app = common::spawn_app().await;

    let resp = app.login("bob", "//evil.example/").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
}

#[tokio::test]
async fn login_requires_username() {
    let app = common::spawn_app().await;

    let resp = app.login("  ", "/").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(common::set_cookie(&resp).is_none());
}

#[tokio::test]
async fn logout_expires_session_cookie() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/account/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("access_token="));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn access_denied_page_is_served() {
    let app = common::spawn_app().await;

    let resp = app.get("/account/access-denied?ReturnUrl=%2Fadmin").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(resp.text().await.unwrap().contains("admin"));
}

#[tokio::test]
async fn configured_account_paths_are_served() {
    let mut config = common::test_config();
    config.cookie.login_path = "/signin".to_string();
    config.cookie.access_denied_path = "/forbidden".to_string();
    let app = common::spawn_app_with(config).await;

    let resp = app.get("/dashboard").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let location = resp
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(location, "/signin?ReturnUrl=%2Fdashboard");

    let resp = app.get(&location).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("signin"));

    let resp = app
        .client
        .post(app.url("/signin"))
        .form(&[("username", "bob"), ("return_url", "/dashboard")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let cookie = common::set_cookie(&resp).unwrap();

    let resp = app.get_with_cookie("/api/values/admin", &cookie).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app.get("/forbidden").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(resp.text().await.unwrap().contains("Access denied"));

    let resp = app.get("/account/login").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn colliding_account_paths_fail_at_startup() {
    let mut config = common::test_config();
    config.cookie.login_path = "/dashboard".to_string();

    let err = apiproblem::build_app(config).unwrap_err();
    assert!(err.to_string().contains("/dashboard"));
}
