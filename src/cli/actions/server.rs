use crate::{
    admin::{AdminPanel, StaticAuthenticator},
    api,
    session_auth::SessionAuthConfig,
};
use anyhow::Result;
use secrecy::SecretString;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub login_path: String,
    pub logout_path: String,
    pub root_path: String,
    pub cookie_password: SecretString,
    pub cookie_name: String,
    pub is_secure: bool,
    pub default_message: String,
    pub strategy: String,
    pub cookie_options: Map<String, Value>,
    pub admin_email: String,
    pub admin_password: SecretString,
    pub panel_title: String,
}

impl Args {
    /// Split into the session config and the panel the server needs.
    #[must_use]
    pub fn into_parts(self) -> (u16, SessionAuthConfig, AdminPanel) {
        let authenticator = StaticAuthenticator::new(self.admin_email, self.admin_password);

        let session = SessionAuthConfig::new(self.cookie_password, Arc::new(authenticator))
            .with_login_path(self.login_path)
            .with_logout_path(self.logout_path)
            .with_root_path(self.root_path)
            .with_cookie_name(self.cookie_name)
            .with_secure(self.is_secure)
            .with_default_message(self.default_message)
            .with_strategy(self.strategy)
            .with_other(self.cookie_options);

        let panel = AdminPanel::new().with_title(self.panel_title);

        (self.port, session, panel)
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the session configuration is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let (port, session, panel) = args.into_parts();

    info!(
        "Starting bastion {} ({})",
        env!("CARGO_PKG_VERSION"),
        crate::GIT_COMMIT_HASH
    );

    api::new(port, session, panel).await
}

fn log_startup_args(args: &Args) {
    debug!(
        port = args.port,
        login_path = %args.login_path,
        logout_path = %args.logout_path,
        root_path = %args.root_path,
        cookie_name = %args.cookie_name,
        is_secure = args.is_secure,
        strategy = %args.strategy,
        cookie_options = ?args.cookie_options.keys().collect::<Vec<_>>(),
        admin_email = %args.admin_email,
        "startup arguments"
    );
}
