use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_ADMIN_EMAIL: &str = "admin-email";
pub const ARG_ADMIN_PASSWORD: &str = "admin-password";
pub const ARG_PANEL_TITLE: &str = "panel-title";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ADMIN_EMAIL)
                .long(ARG_ADMIN_EMAIL)
                .help("Email of the admin account")
                .env("BASTION_ADMIN_EMAIL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_ADMIN_PASSWORD)
                .long(ARG_ADMIN_PASSWORD)
                .help("Password of the admin account")
                .env("BASTION_ADMIN_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_PANEL_TITLE)
                .long(ARG_PANEL_TITLE)
                .help("Title shown on the admin panel pages")
                .env("BASTION_PANEL_TITLE")
                .default_value("Admin"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub email: String,
    pub password: SecretString,
    pub panel_title: String,
}

impl Options {
    /// Parse admin account arguments from matches.
    ///
    /// # Errors
    /// Returns an error if required arguments are missing or empty.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        // clap passes empty env values through
        let get_non_empty = |id: &str| -> Result<String> {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("missing required argument: --{id}"))
        };

        Ok(Self {
            email: get_non_empty(ARG_ADMIN_EMAIL)?,
            password: SecretString::from(get_non_empty(ARG_ADMIN_PASSWORD)?),
            panel_title: get_non_empty(ARG_PANEL_TITLE)?,
        })
    }
}
