use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use crate::cookie_auth::UserRecord;

/// Data the login form needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoginPage<'a> {
    /// Where the form posts to.
    pub action: &'a str,
    pub error_message: &'a str,
}

pub trait LoginRenderer: Send + Sync {
    fn render_login(&self, page: LoginPage<'_>) -> Response;
}

const DEFAULT_TITLE: &str = "Admin";

/// Built-in HTML login page.
#[derive(Clone, Debug)]
pub struct AdminPanel {
    title: String,
}

impl Default for AdminPanel {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl AdminPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Landing page for a signed-in user.
    #[must_use]
    pub fn render_dashboard(&self, user: &UserRecord, logout_path: &str) -> Response {
        html(&DashboardTemplate {
            title: &self.title,
            user: display_name(user),
            logout_path,
        })
    }
}

#[derive(Template)]
#[template(path = "admin/login.html")]
struct LoginTemplate<'a> {
    title: &'a str,
    action: &'a str,
    error_message: &'a str,
}

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
struct DashboardTemplate<'a> {
    title: &'a str,
    user: String,
    logout_path: &'a str,
}

fn html<T: Template>(template: &T) -> Response {
    match template.render() {
        Ok(body) => Html(body).into_response(),
        Err(err) => {
            error!("Failed to render admin page: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Prefer the record's `email`, then `name`, then the whole record.
fn display_name(user: &UserRecord) -> String {
    ["email", "name"]
        .iter()
        .find_map(|key| user.get(key).and_then(|value| value.as_str()))
        .map_or_else(|| user.to_string(), ToString::to_string)
}

impl LoginRenderer for AdminPanel {
    fn render_login(&self, page: LoginPage<'_>) -> Response {
        html(&LoginTemplate {
            title: &self.title,
            action: page.action,
            error_message: page.error_message,
        })
    }
}
