use crate::{
    admin::AdminPanel,
    server::{Route, RouteAuth, Server},
    session_auth::{self, SessionAuthConfig},
};
use anyhow::{Context, Result};
use axum::{
    Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Method, Request},
};
use handlers::{
    dashboard::{self, DashboardState},
    health,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, error, info, info_span};
use ulid::Ulid;

pub mod handlers;

/// Build the application router: session routes, the dashboard and `/health`.
///
/// # Errors
/// Returns an error if the session auth cannot be registered or a route clashes.
pub fn router(session: SessionAuthConfig, panel: AdminPanel) -> Result<Router> {
    let panel = Arc::new(panel);
    let root_path = session.root_path().to_string();
    let strategy = session.strategy().to_string();
    let dashboard_state = DashboardState {
        panel: Arc::clone(&panel),
        logout_path: session.logout_path().to_string(),
    };

    let mut server = Server::new();
    session_auth::register(&mut server, session, panel)
        .context("Failed to register session auth")?;

    server.route(
        Route::new(
            &[Method::GET],
            root_path,
            dashboard::dashboard,
            dashboard_state,
        )?
        .auth(RouteAuth::required(strategy)),
    )?;
    server.route(Route::new(
        &[Method::GET, Method::HEAD, Method::OPTIONS],
        "/health",
        health::health,
        (),
    )?)?;

    Ok(server.into_router().layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span)),
    ))
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, session: SessionAuthConfig, panel: AdminPanel) -> Result<()> {
    let app = router(session, panel)?;

    let listener = TcpListener::bind(format!("::0:{port}"))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
    }
    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
