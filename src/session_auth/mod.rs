//! Session login for the admin panel.
//!
//! [`register`] adds one cookie strategy and two routes to a [`Server`]:
//!
//! - `GET|POST <login_path>` renders the login form, or checks the posted
//!   `email`/`password` and opens a session that redirects to `root_path`.
//! - `GET <logout_path>` clears the session and redirects to `login_path`.
//!
//! The login route resolves an existing session when there is one but never
//! redirects, so the form stays reachable for anonymous users.

pub mod config;
pub mod error;
pub mod handlers;

#[cfg(test)]
mod tests;

pub use config::SessionAuthConfig;
pub use error::Error;
pub use handlers::{BinderState, WRONG_CREDENTIALS};

use axum::http::Method;
use std::sync::Arc;
use tracing::debug;

use crate::{
    admin::LoginRenderer,
    cookie_auth::CookieStrategy,
    server::{Route, RouteAuth, Server},
};

/// Register the session strategy and the login/logout routes on `server`.
///
/// # Errors
/// Returns an error if the configuration or the merged cookie options are
/// invalid, or if the strategy name or either route is already taken.
pub fn register(
    server: &mut Server,
    config: SessionAuthConfig,
    admin_panel: Arc<dyn LoginRenderer>,
) -> Result<(), Error> {
    config.validate()?;

    let strategy = CookieStrategy::new(config.strategy_options()?)?;
    let strategy = server.auth_strategy(config.strategy(), strategy)?;

    let config = Arc::new(config);
    let state = BinderState {
        config: Arc::clone(&config),
        panel: admin_panel,
        strategy,
    };

    server.route(
        Route::new(
            &[Method::GET, Method::POST],
            config.login_path(),
            handlers::login,
            state.clone(),
        )?
        .auth(RouteAuth::optional(config.strategy()).without_redirect()),
    )?;

    server.route(Route::new(
        &[Method::GET],
        config.logout_path(),
        handlers::logout,
        state,
    )?)?;

    debug!(
        strategy = config.strategy(),
        login = config.login_path(),
        logout = config.logout_path(),
        "session auth registered"
    );

    Ok(())
}
