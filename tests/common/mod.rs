use std::net::SocketAddr;

use reqwest::{Client, Response, header};

use apiproblem::config::{Config, CookieAuthConfig, Environment};

/// A running test server instance.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Anonymous GET.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed")
    }

    /// GET carrying the given session cookie.
    pub async fn get_with_cookie(&self, path: &str, cookie: &str) -> Response {
        self.client
            .get(self.url(path))
            .header(header::COOKIE, cookie)
            .send()
            .await
            .expect("get request failed")
    }

    /// Sign in through the login form, return the raw response.
    pub async fn login(&self, username: &str, return_url: &str) -> Response {
        self.client
            .post(self.url("/account/login"))
            .form(&[("username", username), ("return_url", return_url)])
            .send()
            .await
            .expect("login request failed")
    }

    /// Sign in and return the `name=value` pair of the session cookie.
    pub async fn session_cookie(&self, username: &str) -> String {
        let resp = self.login(username, "/").await;
        set_cookie(&resp).expect("login did not set a session cookie")
    }
}

/// `name=value` part of the first `Set-Cookie` header.
pub fn set_cookie(resp: &Response) -> Option<String> {
    resp.headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_string())
}

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        environment: Environment::Development,
        cookie: CookieAuthConfig {
            secret: "test-cookie-secret-that-is-long-enough".to_string(),
            cookie_name: "access_token".to_string(),
            session_minutes: 15,
            login_path: "/account/login".to_string(),
            access_denied_path: "/account/access-denied".to_string(),
            return_url_parameter: "ReturnUrl".to_string(),
            secure: false,
        },
        force_html_parameter: "forcehtml".to_string(),
        admin_users: vec!["admin".to_string()],
        log_level: "warn".to_string(),
    }
}

/// Spawn the app on a random port.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

/// Spawn the app with a custom configuration on a random port.
pub async fn spawn_app_with(config: Config) -> TestApp {
    let app = apiproblem::build_app(config).expect("Failed to build app");

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    // Spawn server in background
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp { addr, client }
}
