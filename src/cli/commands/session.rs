use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, builder::ValueParser};
use secrecy::SecretString;
use serde_json::{Map, Value};

use crate::session_auth::config::{
    DEFAULT_COOKIE_NAME, DEFAULT_LOGIN_PATH, DEFAULT_LOGOUT_PATH, DEFAULT_MESSAGE,
    DEFAULT_ROOT_PATH, DEFAULT_STRATEGY,
};

pub const ARG_LOGIN_PATH: &str = "login-path";
pub const ARG_LOGOUT_PATH: &str = "logout-path";
pub const ARG_ROOT_PATH: &str = "root-path";
pub const ARG_COOKIE_PASSWORD: &str = "cookie-password";
pub const ARG_COOKIE_NAME: &str = "cookie-name";
pub const ARG_INSECURE_COOKIE: &str = "insecure-cookie";
pub const ARG_DEFAULT_MESSAGE: &str = "default-message";
pub const ARG_STRATEGY: &str = "strategy";
pub const ARG_COOKIE_OPTION: &str = "cookie-option";

/// Parse `key=value`; the value is read as JSON and falls back to a plain string.
#[must_use]
pub fn validator_cookie_option() -> ValueParser {
    ValueParser::from(
        move |option: &str| -> std::result::Result<(String, Value), String> {
            let (key, value) = option
                .split_once('=')
                .ok_or_else(|| format!("expected key=value, got {option:?}"))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(format!("missing key in {option:?}"));
            }
            let value = value.trim();
            let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
            Ok((key.to_string(), value))
        },
    )
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_LOGIN_PATH)
                .long(ARG_LOGIN_PATH)
                .help("Login route, also where unauthenticated requests are sent")
                .env("BASTION_LOGIN_PATH")
                .default_value(DEFAULT_LOGIN_PATH),
        )
        .arg(
            Arg::new(ARG_LOGOUT_PATH)
                .long(ARG_LOGOUT_PATH)
                .help("Logout route")
                .env("BASTION_LOGOUT_PATH")
                .default_value(DEFAULT_LOGOUT_PATH),
        )
        .arg(
            Arg::new(ARG_ROOT_PATH)
                .long(ARG_ROOT_PATH)
                .help("Admin panel root, the redirect target after login")
                .env("BASTION_ROOT_PATH")
                .default_value(DEFAULT_ROOT_PATH),
        )
        .arg(
            Arg::new(ARG_COOKIE_PASSWORD)
                .long(ARG_COOKIE_PASSWORD)
                .help("Secret used to encrypt the session cookie (at least 32 bytes)")
                .env("BASTION_COOKIE_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_COOKIE_NAME)
                .long(ARG_COOKIE_NAME)
                .help("Session cookie name")
                .env("BASTION_COOKIE_NAME")
                .default_value(DEFAULT_COOKIE_NAME),
        )
        .arg(
            Arg::new(ARG_INSECURE_COOKIE)
                .long(ARG_INSECURE_COOKIE)
                .help("Allow the session cookie over plain HTTP (local development only)")
                .env("BASTION_INSECURE_COOKIE")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_DEFAULT_MESSAGE)
                .long(ARG_DEFAULT_MESSAGE)
                .help("Message shown on the login form")
                .env("BASTION_DEFAULT_MESSAGE")
                .default_value(DEFAULT_MESSAGE),
        )
        .arg(
            Arg::new(ARG_STRATEGY)
                .long(ARG_STRATEGY)
                .help("Name of the session auth strategy")
                .env("BASTION_STRATEGY")
                .default_value(DEFAULT_STRATEGY),
        )
        .arg(
            Arg::new(ARG_COOKIE_OPTION)
                .long(ARG_COOKIE_OPTION)
                .help("Extra cookie option as key=value, e.g. ttl=86400000 or isSameSite=Lax")
                .long_help(
                    "Extra cookie option as key=value. The value is parsed as JSON and kept as a string otherwise. \
                     Keys use camelCase: ttl, path, domain, isHttpOnly, isSameSite, clearInvalid, keepAlive, appendNext. \
                     Options set through dedicated flags take precedence.",
                )
                .env("BASTION_COOKIE_OPTIONS")
                .value_delimiter(',')
                .action(ArgAction::Append)
                .value_parser(validator_cookie_option()),
        )
}

#[derive(Debug)]
pub struct Options {
    pub login_path: String,
    pub logout_path: String,
    pub root_path: String,
    pub cookie_password: SecretString,
    pub cookie_name: String,
    pub is_secure: bool,
    pub default_message: String,
    pub strategy: String,
    pub cookie_options: Map<String, Value>,
}

impl Options {
    /// Parse session arguments from matches.
    ///
    /// # Errors
    /// Returns an error if required arguments are missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let get = |id: &str| -> Result<String> {
            matches
                .get_one::<String>(id)
                .cloned()
                .with_context(|| format!("missing required argument: --{id}"))
        };

        let cookie_password = get(ARG_COOKIE_PASSWORD)?;

        let cookie_options = matches
            .get_many::<(String, Value)>(ARG_COOKIE_OPTION)
            .map(|options| options.cloned().collect())
            .unwrap_or_default();

        Ok(Self {
            login_path: get(ARG_LOGIN_PATH)?,
            logout_path: get(ARG_LOGOUT_PATH)?,
            root_path: get(ARG_ROOT_PATH)?,
            cookie_password: SecretString::from(cookie_password),
            cookie_name: get(ARG_COOKIE_NAME)?,
            is_secure: !matches.get_flag(ARG_INSECURE_COOKIE),
            default_message: get(ARG_DEFAULT_MESSAGE)?,
            strategy: get(ARG_STRATEGY)?,
            cookie_options,
        })
    }
}
