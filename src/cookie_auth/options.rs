//! Strategy options for the cookie scheme.
//!
//! Options arrive as a loose JSON map (camelCase keys) so callers can pass extra
//! settings through without this crate knowing about them up front. The map is
//! checked once, here, and turned into [`StrategyOptions`].

use cookie::SameSite;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

use super::error::Error;

/// Minimum length of the cookie password, in bytes.
pub const MIN_PASSWORD_LEN: usize = 32;

const DEFAULT_COOKIE_PATH: &str = "/";
const DEFAULT_NEXT_PARAM: &str = "next";

/// Validated settings for a [`super::CookieStrategy`].
#[derive(Debug)]
pub struct StrategyOptions {
    pub password: SecretString,
    pub cookie: String,
    /// Where to send requests that need a session and have none.
    pub redirect_to: Option<String>,
    pub is_secure: bool,
    pub is_http_only: bool,
    pub is_same_site: Option<SameSite>,
    pub path: String,
    pub domain: Option<String>,
    /// Cookie lifetime. `None` keeps the cookie until the browser session ends.
    pub ttl: Option<Duration>,
    pub clear_invalid: bool,
    pub keep_alive: bool,
    /// Query parameter carrying the original path on redirects.
    pub append_next: Option<String>,
}

/// A setting that is either a plain on/off flag or a value.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Toggle {
    Flag(bool),
    Value(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawOptions {
    password: String,
    cookie: String,
    redirect_to: Option<Toggle>,
    is_secure: Option<bool>,
    is_http_only: Option<bool>,
    is_same_site: Option<Toggle>,
    path: Option<String>,
    domain: Option<String>,
    ttl: Option<u64>,
    clear_invalid: Option<bool>,
    keep_alive: Option<bool>,
    append_next: Option<Toggle>,
}

impl StrategyOptions {
    /// Build options from a camelCase JSON map.
    ///
    /// # Errors
    /// Returns an error for unknown keys, wrong value types, or values outside
    /// what the cookie scheme supports.
    pub fn from_map(map: Map<String, Value>) -> Result<Self, Error> {
        let raw: RawOptions =
            serde_json::from_value(Value::Object(map)).map_err(Error::InvalidOptions)?;

        if raw.cookie.trim().is_empty() {
            return Err(Error::MissingCookieName);
        }

        let redirect_to = match raw.redirect_to {
            None | Some(Toggle::Flag(false)) => None,
            Some(Toggle::Flag(true)) => {
                return Err(Error::InvalidOption {
                    key: "redirectTo",
                    reason: "expected a path or false".to_string(),
                });
            }
            Some(Toggle::Value(path)) => Some(path),
        };

        let is_same_site = match raw.is_same_site {
            None => Some(SameSite::Strict),
            Some(Toggle::Flag(false)) => None,
            Some(Toggle::Flag(true)) => {
                return Err(Error::InvalidOption {
                    key: "isSameSite",
                    reason: "expected Strict, Lax, None or false".to_string(),
                });
            }
            Some(Toggle::Value(policy)) => Some(parse_same_site(&policy)?),
        };

        let append_next = match raw.append_next {
            None | Some(Toggle::Flag(false)) => None,
            Some(Toggle::Flag(true)) => Some(DEFAULT_NEXT_PARAM.to_string()),
            Some(Toggle::Value(param)) if param.is_empty() => {
                return Err(Error::InvalidOption {
                    key: "appendNext",
                    reason: "parameter name must not be empty".to_string(),
                });
            }
            Some(Toggle::Value(param)) => Some(param),
        };

        let ttl = raw.ttl.map(Duration::from_millis);
        let keep_alive = raw.keep_alive.unwrap_or(false);
        if keep_alive && ttl.is_none() {
            return Err(Error::InvalidOption {
                key: "keepAlive",
                reason: "requires ttl".to_string(),
            });
        }

        Ok(Self {
            password: SecretString::from(raw.password),
            cookie: raw.cookie,
            redirect_to,
            is_secure: raw.is_secure.unwrap_or(true),
            is_http_only: raw.is_http_only.unwrap_or(true),
            is_same_site,
            path: raw.path.unwrap_or_else(|| DEFAULT_COOKIE_PATH.to_string()),
            domain: raw.domain,
            ttl,
            clear_invalid: raw.clear_invalid.unwrap_or(false),
            keep_alive,
            append_next,
        })
    }
}

/// Overlay `named` on top of `other`; keys in `named` win.
#[must_use]
pub fn merge(other: &Map<String, Value>, named: Map<String, Value>) -> Map<String, Value> {
    let mut merged = other.clone();
    merged.extend(named);
    merged
}

fn parse_same_site(policy: &str) -> Result<SameSite, Error> {
    match policy.to_ascii_lowercase().as_str() {
        "strict" => Ok(SameSite::Strict),
        "lax" => Ok(SameSite::Lax),
        "none" => Ok(SameSite::None),
        _ => Err(Error::InvalidOption {
            key: "isSameSite",
            reason: format!("unknown policy {policy}"),
        }),
    }
}
