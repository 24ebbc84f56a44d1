use askama::Template;
use axum::response::Html;

use crate::auth::extractor::AuthUser;

#[derive(Template)]
#[template(path = "pages/dashboard.html")]
struct DashboardTemplate {
    name: String,
    is_admin: bool,
}

pub async fn home() -> Html<&'static str> {
    Html("<h1>apiproblem</h1><p><a href=\"/dashboard\">Dashboard</a></p>")
}

/// Browser page behind the login redirect.
pub async fn dashboard(user: AuthUser) -> Html<String> {
    let template = DashboardTemplate {
        is_admin: user.has_role("admin"),
        name: user.name,
    };
    Html(template.render().unwrap_or_default())
}
