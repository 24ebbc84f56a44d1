use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub environment: Environment,
    pub cookie: CookieAuthConfig,
    pub force_html_parameter: String,
    pub admin_users: Vec<String>,
    pub log_level: String,
}

/// Settings of the cookie authentication pipeline.
#[derive(Debug, Clone)]
pub struct CookieAuthConfig {
    pub secret: String,
    pub cookie_name: String,
    pub session_minutes: i64,
    pub login_path: String,
    pub access_denied_path: String,
    pub return_url_parameter: String,
    pub secure: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(Environment::Development),
            "production" => Ok(Environment::Production),
            other => Err(format!(
                "Invalid APIPROBLEM_ENVIRONMENT: expected 'development' or 'production', got '{other}'"
            )),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let secret = env_required("APIPROBLEM_COOKIE_SECRET")?;

        let host: IpAddr = env_or("APIPROBLEM_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid APIPROBLEM_HOST: {e}"))?;

        let port: u16 = env_or("APIPROBLEM_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid APIPROBLEM_PORT: {e}"))?;

        let environment: Environment = env_or("APIPROBLEM_ENVIRONMENT", "production").parse()?;

        let session_minutes: i64 = env_or("APIPROBLEM_SESSION_MINUTES", "60")
            .parse()
            .map_err(|e| format!("Invalid APIPROBLEM_SESSION_MINUTES: {e}"))?;

        let login_path = local_path("APIPROBLEM_LOGIN_PATH", "/account/login")?;
        let access_denied_path =
            local_path("APIPROBLEM_ACCESS_DENIED_PATH", "/account/access-denied")?;

        let cookie = CookieAuthConfig {
            secret,
            cookie_name: env_or("APIPROBLEM_COOKIE_NAME", "access_token"),
            session_minutes,
            login_path,
            access_denied_path,
            return_url_parameter: env_or("APIPROBLEM_RETURN_URL_PARAMETER", "ReturnUrl"),
            secure: !environment.is_development(),
        };

        let admin_users: Vec<String> = env_or("APIPROBLEM_ADMIN_USERS", "admin")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Config {
            host,
            port,
            environment,
            cookie,
            force_html_parameter: env_or("APIPROBLEM_FORCE_HTML_PARAMETER", "forcehtml"),
            admin_users,
            log_level: env_or("APIPROBLEM_LOG_LEVEL", "info"),
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Redirect targets end up in a `Location` header.
fn local_path(key: &str, default: &str) -> Result<String, String> {
    let path = env_or(key, default);
    if path.starts_with('/')
        && !path.starts_with("//")
        && path.bytes().all(|b| b.is_ascii_graphic())
    {
        Ok(path)
    } else {
        Err(format!("Invalid {key}: must be a local path, got '{path}'"))
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        environment: Environment::Development,
        cookie: CookieAuthConfig {
            secret: "test-cookie-secret".to_string(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_case_insensitively() {
        assert_eq!("development".parse::<Environment>(), Ok(Environment::Development));
        assert_eq!("Development".parse::<Environment>(), Ok(Environment::Development));
        assert_eq!(" PRODUCTION ".parse::<Environment>(), Ok(Environment::Production));
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let err = "dev".parse::<Environment>().unwrap_err();
        assert!(err.starts_with("Invalid APIPROBLEM_ENVIRONMENT"));
        assert!(err.contains("'dev'"));
    }
}
