//! Per-route session middleware.

use axum::{
    extract::{Request, State},
    http::{StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{debug, error};
use url::form_urlencoded;

use super::{
    UserRecord,
    strategy::{CookieStrategy, SessionState, sets_cookie},
};

/// How a route treats a missing session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    /// Reject the request when there is no valid session.
    Required,
    /// Resolve the session if present and always let the request through.
    Try,
}

/// Session resolved by the guard, available to handlers as
/// `Extension<Credentials>`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Credentials(pub Option<UserRecord>);

/// Middleware state for one route.
#[derive(Clone, Debug)]
pub struct Guard {
    strategy: Arc<CookieStrategy>,
    mode: AuthMode,
    redirect: bool,
}

impl Guard {
    #[must_use]
    pub fn new(strategy: Arc<CookieStrategy>, mode: AuthMode, redirect: bool) -> Self {
        Self {
            strategy,
            mode,
            redirect,
        }
    }

    fn reject(&self, uri: &Uri) -> Response {
        let target = if self.redirect {
            self.strategy.redirect_to()
        } else {
            None
        };

        let Some(target) = target else {
            return StatusCode::UNAUTHORIZED.into_response();
        };

        match &self.strategy.options().append_next {
            Some(param) => {
                let next = uri
                    .path_and_query()
                    .map_or_else(|| uri.path(), |path| path.as_str());
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair(param, next)
                    .finish();
                let separator = if target.contains('?') { '&' } else { '?' };
                Redirect::to(&format!("{target}{separator}{query}")).into_response()
            }
            None => Redirect::to(target).into_response(),
        }
    }

    /// Remove an invalid cookie unless the handler already touched it.
    fn clear_invalid(&self, response: &mut Response) {
        let name = self.strategy.cookie_name();
        if !self.strategy.options().clear_invalid || sets_cookie(response.headers(), name) {
            return;
        }
        if let Err(err) = self.strategy.clear(response.headers_mut()) {
            error!("Failed to clear invalid session cookie: {err}");
        }
    }
}

/// Resolve the session cookie and enforce the route's [`AuthMode`].
pub async fn authenticate(State(guard): State<Guard>, mut request: Request, next: Next) -> Response {
    let state = guard.strategy.read(request.headers());

    match state {
        SessionState::Valid(record) => {
            request
                .extensions_mut()
                .insert(Credentials(Some(record.clone())));
            let mut response = next.run(request).await;

            if guard.strategy.options().keep_alive
                && !sets_cookie(response.headers(), guard.strategy.cookie_name())
            {
                if let Err(err) = guard.strategy.set(response.headers_mut(), &record) {
                    error!("Failed to refresh session cookie: {err}");
                }
            }

            response
        }
        state if guard.mode == AuthMode::Required => {
            debug!(path = request.uri().path(), "request without a valid session");
            let mut response = guard.reject(request.uri());
            if state == SessionState::Invalid {
                guard.clear_invalid(&mut response);
            }
            response
        }
        state => {
            request.extensions_mut().insert(Credentials(None));
            let mut response = next.run(request).await;
            if state == SessionState::Invalid {
                guard.clear_invalid(&mut response);
            }
            response
        }
    }
}
