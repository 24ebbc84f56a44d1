use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::jwt::Claims;
use crate::error::AppError;

/// The signed-in user, placed in request extensions by the cookie
/// authentication middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub name: String,
    pub roles: Vec<String>,
}

impl AuthUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn require_role(&self, role: &str) -> Result<(), AppError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("Role '{role}' required")))
        }
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            name: claims.sub,
            roles: claims.roles,
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Missing authentication cookie".to_string()))
    }
}
