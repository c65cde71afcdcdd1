use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value, json};
use std::sync::Arc;

use super::error::Error;
use crate::{
    admin::Authenticator,
    cookie_auth::{self, StrategyOptions},
    server::route::is_static_path,
};

pub const DEFAULT_LOGIN_PATH: &str = "/admin/login";
pub const DEFAULT_LOGOUT_PATH: &str = "/admin/logout";
pub const DEFAULT_ROOT_PATH: &str = "/admin";
pub const DEFAULT_COOKIE_NAME: &str = "bastion_session";
pub const DEFAULT_MESSAGE: &str = "Please log in";
pub const DEFAULT_STRATEGY: &str = "session";

/// Settings for the login/logout routes and the session strategy behind them.
#[derive(Clone)]
pub struct SessionAuthConfig {
    login_path: String,
    logout_path: String,
    root_path: String,
    cookie_password: SecretString,
    cookie_name: String,
    authenticate: Arc<dyn Authenticator>,
    is_secure: bool,
    default_message: String,
    strategy: String,
    other: Map<String, Value>,
}

impl std::fmt::Debug for SessionAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAuthConfig")
            .field("login_path", &self.login_path)
            .field("logout_path", &self.logout_path)
            .field("root_path", &self.root_path)
            .field("cookie_name", &self.cookie_name)
            .field("is_secure", &self.is_secure)
            .field("default_message", &self.default_message)
            .field("strategy", &self.strategy)
            .field("other", &self.other.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl SessionAuthConfig {
    #[must_use]
    pub fn new(cookie_password: SecretString, authenticate: Arc<dyn Authenticator>) -> Self {
        Self {
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            logout_path: DEFAULT_LOGOUT_PATH.to_string(),
            root_path: DEFAULT_ROOT_PATH.to_string(),
            cookie_password,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            authenticate,
            is_secure: true,
            default_message: DEFAULT_MESSAGE.to_string(),
            strategy: DEFAULT_STRATEGY.to_string(),
            other: Map::new(),
        }
    }

    #[must_use]
    pub fn with_login_path(mut self, path: String) -> Self {
        self.login_path = path;
        self
    }

    #[must_use]
    pub fn with_logout_path(mut self, path: String) -> Self {
        self.logout_path = path;
        self
    }

    #[must_use]
    pub fn with_root_path(mut self, path: String) -> Self {
        self.root_path = path;
        self
    }

    #[must_use]
    pub fn with_cookie_name(mut self, name: String) -> Self {
        self.cookie_name = name;
        self
    }

    #[must_use]
    pub fn with_secure(mut self, is_secure: bool) -> Self {
        self.is_secure = is_secure;
        self
    }

    #[must_use]
    pub fn with_default_message(mut self, message: String) -> Self {
        self.default_message = message;
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, name: String) -> Self {
        self.strategy = name;
        self
    }

    /// Extra cookie strategy options (camelCase keys). Named settings above
    /// override keys given here.
    #[must_use]
    pub fn with_other(mut self, other: Map<String, Value>) -> Self {
        self.other = other;
        self
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[must_use]
    pub fn logout_path(&self) -> &str {
        &self.logout_path
    }

    #[must_use]
    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    #[must_use]
    pub fn authenticator(&self) -> &Arc<dyn Authenticator> {
        &self.authenticate
    }

    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.is_secure
    }

    #[must_use]
    pub fn default_message(&self) -> &str {
        &self.default_message
    }

    #[must_use]
    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    #[must_use]
    pub fn other(&self) -> &Map<String, Value> {
        &self.other
    }

    pub(super) fn validate(&self) -> Result<(), Error> {
        if self.strategy.trim().is_empty() {
            return Err(Error::Config("strategy name must not be empty".to_string()));
        }
        for (name, path) in [
            ("login", &self.login_path),
            ("logout", &self.logout_path),
            ("root", &self.root_path),
        ] {
            if !is_static_path(path) {
                return Err(Error::Config(format!("invalid {name} path: {path:?}")));
            }
        }
        if self.login_path == self.logout_path {
            return Err(Error::Config(format!(
                "login and logout paths must differ, both are {}",
                self.login_path
            )));
        }
        Ok(())
    }

    /// Cookie strategy options: `other` first, then the named settings on top.
    ///
    /// # Errors
    /// Returns an error if the merged options are not valid for the cookie scheme.
    pub fn strategy_options(&self) -> Result<StrategyOptions, cookie_auth::Error> {
        let mut named = Map::new();
        named.insert(
            "password".to_string(),
            json!(self.cookie_password.expose_secret()),
        );
        named.insert("cookie".to_string(), json!(self.cookie_name));
        named.insert("redirectTo".to_string(), json!(self.login_path));
        named.insert("isSecure".to_string(), json!(self.is_secure));

        StrategyOptions::from_map(cookie_auth::merge(&self.other, named))
    }
}
