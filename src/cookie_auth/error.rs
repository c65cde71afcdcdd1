use axum::http::header::InvalidHeaderValue;
use thiserror::Error;

use super::options::MIN_PASSWORD_LEN;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cookie password must be at least {MIN_PASSWORD_LEN} bytes")]
    PasswordTooShort,
    #[error("missing cookie name")]
    MissingCookieName,
    #[error("invalid strategy options: {0}")]
    InvalidOptions(#[source] serde_json::Error),
    #[error("invalid value for {key}: {reason}")]
    InvalidOption { key: &'static str, reason: String },
    #[error("failed to encode session record")]
    Encode(#[source] serde_json::Error),
    #[error("failed to seal session cookie")]
    Seal,
    #[error("invalid cookie header")]
    Header(#[from] InvalidHeaderValue),
}
