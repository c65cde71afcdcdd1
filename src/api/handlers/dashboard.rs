use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::{admin::AdminPanel, cookie_auth::Credentials};

#[derive(Clone)]
pub struct DashboardState {
    pub panel: Arc<AdminPanel>,
    pub logout_path: String,
}

/// Panel landing page. Mounted behind a required session.
pub async fn dashboard(
    State(state): State<DashboardState>,
    Extension(credentials): Extension<Credentials>,
) -> Response {
    match credentials.0 {
        Some(user) => state.panel.render_dashboard(&user, &state.logout_path),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}
