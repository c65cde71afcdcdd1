use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{cookie_auth, server};

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid session auth configuration: {0}")]
    Config(String),
    #[error(transparent)]
    CookieAuth(#[from] cookie_auth::Error),
    #[error(transparent)]
    Server(#[from] server::Error),
    #[error("invalid login payload: {0}")]
    Payload(String),
    #[error("authenticator failed: {0:#}")]
    Authenticate(anyhow::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Details stay in the logs.
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}
