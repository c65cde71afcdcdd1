//! Cookie session scheme.
//!
//! The authenticated user record is serialized to JSON and stored in a private
//! cookie (`cookie` crate, AEAD with a key derived from the strategy password).
//! Nothing is kept server side, so any instance holding the same password can
//! read the session.

pub mod error;
pub mod guard;
pub mod options;
pub mod strategy;

pub use error::Error;
pub use guard::{AuthMode, Credentials, Guard, authenticate};
pub use options::{MIN_PASSWORD_LEN, StrategyOptions, merge};
pub use strategy::{CookieStrategy, SessionState};

use serde_json::Value;

/// Whatever the authenticator hands back for a successful login.
pub type UserRecord = Value;

/// `null`, `false`, zero and `""` mean "no user".
#[must_use]
pub fn is_truthy(record: &UserRecord) -> bool {
    match record {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
