//! # Bastion (cookie session login for admin panels)
//!
//! `bastion` puts a cookie-based session login in front of an admin panel. The
//! wiring is small on purpose: one named authentication strategy and two routes.
//!
//! ## Flow
//!
//! - `GET <login_path>` renders the login form supplied by the admin panel.
//! - `POST <login_path>` checks the submitted `email`/`password` with the
//!   configured authenticator. A match seals the returned user record into the
//!   session cookie and redirects to `root_path`. A miss re-renders the form with
//!   `"Wrong email and/or password"`.
//! - `GET <logout_path>` clears the session cookie and redirects to `login_path`.
//!
//! ## Session cookie
//!
//! The cookie holds the JSON user record, encrypted and authenticated with a key
//! derived from the configured cookie password (see [`cookie_auth`]). Routes
//! registered with a required strategy redirect to the login path when the
//! cookie is missing or cannot be opened.
//!
//! ## Errors
//!
//! Wrong credentials are not errors. Anything unexpected while handling a login
//! (bad payload, authenticator failure) is logged and answered with `500`.

pub mod admin;
pub mod api;
pub mod cli;
pub mod cookie_auth;
pub mod server;
pub mod session_auth;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
