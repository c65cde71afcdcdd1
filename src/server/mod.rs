//! Host server handle.
//!
//! Strategies and routes are registered up front, checked for conflicts, and
//! then turned into an [`axum::Router`] with the session guard attached to every
//! route that names a strategy.

pub mod error;
pub mod route;

pub use error::Error;
pub use route::{Route, RouteAuth};

use axum::{Router, middleware::from_fn_with_state};
use std::{collections::BTreeMap, sync::Arc};
use tracing::debug;

use crate::cookie_auth::{CookieStrategy, Guard, authenticate};

#[derive(Debug, Default)]
pub struct Server {
    strategies: BTreeMap<String, Arc<CookieStrategy>>,
    routes: Vec<Route>,
}

impl Server {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `strategy` under `name` and return the shared handle routes use.
    ///
    /// # Errors
    /// Returns an error if `name` is already taken.
    pub fn auth_strategy(
        &mut self,
        name: impl Into<String>,
        strategy: CookieStrategy,
    ) -> Result<Arc<CookieStrategy>, Error> {
        let name = name.into();
        if self.strategies.contains_key(&name) {
            return Err(Error::DuplicateStrategy(name));
        }
        debug!(strategy = %name, cookie = strategy.cookie_name(), "registered auth strategy");
        let strategy = Arc::new(strategy);
        self.strategies.insert(name, Arc::clone(&strategy));
        Ok(strategy)
    }

    /// Add a route.
    ///
    /// # Errors
    /// Returns an error if a method is already routed at the same path, or the
    /// route names a strategy that is not registered.
    pub fn route(&mut self, route: Route) -> Result<(), Error> {
        if let Some(name) = route.auth_settings().strategy() {
            if !self.strategies.contains_key(name) {
                return Err(Error::UnknownStrategy {
                    name: name.to_string(),
                    path: route.path().to_string(),
                });
            }
        }

        if let Some(method) = self
            .routes
            .iter()
            .find_map(|existing| existing.overlaps(&route))
        {
            return Err(Error::DuplicateRoute {
                method: method.clone(),
                path: route.path().to_string(),
            });
        }

        debug!(path = route.path(), methods = ?route.methods(), "registered route");
        self.routes.push(route);
        Ok(())
    }

    /// Registered strategy names, sorted.
    #[must_use]
    pub fn strategies(&self) -> Vec<&str> {
        self.strategies.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn strategy(&self, name: &str) -> Option<&Arc<CookieStrategy>> {
        self.strategies.get(name)
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[must_use]
    pub fn into_router(self) -> Router {
        let Self { strategies, routes } = self;

        routes.into_iter().fold(Router::new(), |router, route| {
            let guard = match route.auth_settings() {
                RouteAuth::Disabled => None,
                RouteAuth::Strategy {
                    name,
                    mode,
                    redirect,
                } => strategies
                    .get(name)
                    .map(|strategy| Guard::new(Arc::clone(strategy), *mode, *redirect)),
            };

            let path = route.path().to_string();
            let handler = match guard {
                Some(guard) => route
                    .handler
                    .route_layer(from_fn_with_state(guard, authenticate)),
                None => route.handler,
            };
            router.route(&path, handler)
        })
    }
}
