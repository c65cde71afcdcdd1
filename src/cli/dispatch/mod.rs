//! Map parsed CLI arguments to the action the binary runs.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_PORT, admin, session};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or empty.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let session_opts = session::Options::parse(matches)?;
    let admin_opts = admin::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        login_path: session_opts.login_path,
        logout_path: session_opts.logout_path,
        root_path: session_opts.root_path,
        cookie_password: session_opts.cookie_password,
        cookie_name: session_opts.cookie_name,
        is_secure: session_opts.is_secure,
        default_message: session_opts.default_message,
        strategy: session_opts.strategy,
        cookie_options: session_opts.cookie_options,
        admin_email: admin_opts.email,
        admin_password: admin_opts.password,
        panel_title: admin_opts.panel_title,
    }))
}
