use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::{future::Future, pin::Pin};

use crate::cookie_auth::UserRecord;

pub type AuthFuture<'a> =
    Pin<Box<dyn Future<Output = anyhow::Result<Option<UserRecord>>> + Send + 'a>>;

/// Credential check used by the login route.
///
/// `Ok(None)` (or a falsy record) is a failed login. `Err` is reserved for
/// failures of the check itself.
pub trait Authenticator: Send + Sync {
    fn authenticate<'a>(&'a self, email: &'a str, password: &'a str) -> AuthFuture<'a>;
}

/// A single account supplied through configuration.
pub struct StaticAuthenticator {
    email: String,
    password: SecretString,
}

impl std::fmt::Debug for StaticAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticAuthenticator")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl StaticAuthenticator {
    pub fn new(email: impl Into<String>, password: SecretString) -> Self {
        Self {
            email: email.into().trim().to_lowercase(),
            password,
        }
    }

    fn matches(&self, email: &str, password: &str) -> bool {
        email.trim().to_lowercase() == self.email && password == self.password.expose_secret()
    }
}

impl Authenticator for StaticAuthenticator {
    fn authenticate<'a>(&'a self, email: &'a str, password: &'a str) -> AuthFuture<'a> {
        Box::pin(async move {
            if self.matches(email, password) {
                Ok(Some(json!({ "email": self.email, "role": "admin" })))
            } else {
                Ok(None)
            }
        })
    }
}

/// Adapter turning an async closure into an [`Authenticator`].
pub struct FnAuthenticator<F>(F);

/// Wrap `check` so it can be passed where an [`Authenticator`] is expected.
pub fn authenticate_with<F, Fut>(check: F) -> FnAuthenticator<F>
where
    F: Fn(String, String) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Option<UserRecord>>> + Send + 'static,
{
    FnAuthenticator(check)
}

impl<F, Fut> Authenticator for FnAuthenticator<F>
where
    F: Fn(String, String) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Option<UserRecord>>> + Send + 'static,
{
    fn authenticate<'a>(&'a self, email: &'a str, password: &'a str) -> AuthFuture<'a> {
        Box::pin((self.0)(email.to_string(), password.to_string()))
    }
}
