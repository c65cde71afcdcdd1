use axum::{
    Form, Json,
    extract::{FromRequest, Request, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error};

use super::{config::SessionAuthConfig, error::Error};
use crate::{
    admin::{LoginPage, LoginRenderer},
    cookie_auth::{CookieStrategy, is_truthy},
};

pub const WRONG_CREDENTIALS: &str = "Wrong email and/or password";

/// Everything the login/logout handlers need, shared across requests.
#[derive(Clone)]
pub struct BinderState {
    pub config: Arc<SessionAuthConfig>,
    pub panel: Arc<dyn LoginRenderer>,
    pub strategy: Arc<CookieStrategy>,
}

impl BinderState {
    fn render(&self, error_message: &str) -> Response {
        self.panel.render_login(LoginPage {
            action: self.config.login_path(),
            error_message,
        })
    }
}

#[derive(Deserialize)]
struct LoginForm {
    email: String,
    password: String,
}

/// `GET` renders the form, `POST` checks the submitted credentials.
pub async fn login(State(state): State<BinderState>, request: Request) -> Result<Response, Error> {
    if !request.method().as_str().eq_ignore_ascii_case("POST") {
        return Ok(state.render(state.config.default_message()));
    }

    attempt(&state, request)
        .await
        .inspect_err(|err| error!("Failed to process login: {err}"))
}

async fn attempt(state: &BinderState, request: Request) -> Result<Response, Error> {
    let form = read_form(request).await?;
    debug!(email = %form.email, "login attempt");

    let record = state
        .config
        .authenticator()
        .authenticate(&form.email, &form.password)
        .await
        .map_err(Error::Authenticate)?
        .filter(is_truthy);

    let Some(record) = record else {
        debug!(email = %form.email, "login rejected");
        return Ok(state.render(WRONG_CREDENTIALS));
    };

    let mut response = Redirect::to(state.config.root_path()).into_response();
    state.strategy.set(response.headers_mut(), &record)?;
    Ok(response)
}

/// Accept the credentials as JSON or as a url-encoded form.
async fn read_form(request: Request) -> Result<LoginForm, Error> {
    let is_json = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    if is_json {
        let Json(form) = Json::<LoginForm>::from_request(request, &())
            .await
            .map_err(|rejection| Error::Payload(rejection.body_text()))?;
        Ok(form)
    } else {
        let Form(form) = Form::<LoginForm>::from_request(request, &())
            .await
            .map_err(|rejection| Error::Payload(rejection.body_text()))?;
        Ok(form)
    }
}

/// Drop the session cookie and go back to the login form.
pub async fn logout(State(state): State<BinderState>) -> Result<Response, Error> {
    let mut response = Redirect::to(state.config.login_path()).into_response();
    state
        .strategy
        .clear(response.headers_mut())
        .inspect_err(|err| error!("Failed to clear session cookie: {err}"))?;
    Ok(response)
}
