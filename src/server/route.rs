use axum::{
    handler::Handler,
    http::Method,
    routing::{MethodFilter, MethodRouter, on},
};

use super::error::Error;
use crate::cookie_auth::AuthMode;

/// Authentication settings for a single route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteAuth {
    Disabled,
    Strategy {
        name: String,
        mode: AuthMode,
        /// Follow the strategy's `redirectTo` when the session is missing.
        redirect: bool,
    },
}

impl RouteAuth {
    pub fn required(name: impl Into<String>) -> Self {
        Self::Strategy {
            name: name.into(),
            mode: AuthMode::Required,
            redirect: true,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self::Strategy {
            name: name.into(),
            mode: AuthMode::Try,
            redirect: true,
        }
    }

    #[must_use]
    pub fn without_redirect(self) -> Self {
        match self {
            Self::Strategy { name, mode, .. } => Self::Strategy {
                name,
                mode,
                redirect: false,
            },
            Self::Disabled => Self::Disabled,
        }
    }

    #[must_use]
    pub fn strategy(&self) -> Option<&str> {
        match self {
            Self::Strategy { name, .. } => Some(name),
            Self::Disabled => None,
        }
    }
}

pub struct Route {
    methods: Vec<Method>,
    path: String,
    auth: RouteAuth,
    pub(super) handler: MethodRouter,
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("methods", &self.methods)
            .field("path", &self.path)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

/// Absolute, without whitespace, and free of router capture syntax: no
/// segment may start with `:` or `*`, and `{`/`}` are not allowed.
pub(crate) fn is_static_path(path: &str) -> bool {
    path.starts_with('/')
        && !path
            .chars()
            .any(|c| c.is_whitespace() || c == '{' || c == '}')
        && !path
            .split('/')
            .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
}

impl Route {
    /// A route serving `handler` for `methods` at `path`. Auth defaults to
    /// [`RouteAuth::Disabled`].
    ///
    /// # Errors
    /// Returns an error if `path` is not a literal absolute path, `methods` is
    /// empty, or one of the methods cannot be routed.
    pub fn new<H, T, S>(
        methods: &[Method],
        path: impl Into<String>,
        handler: H,
        state: S,
    ) -> Result<Self, Error>
    where
        H: Handler<T, S>,
        T: 'static,
        S: Clone + Send + Sync + 'static,
    {
        let path = path.into();
        if !is_static_path(&path) {
            return Err(Error::InvalidPath(path));
        }

        let mut filter: Option<MethodFilter> = None;
        for method in methods {
            let next = MethodFilter::try_from(method.clone())
                .map_err(|_| Error::UnsupportedMethod(method.clone()))?;
            filter = Some(filter.map_or(next, |filter| filter.or(next)));
        }
        let Some(filter) = filter else {
            return Err(Error::NoMethods(path));
        };

        Ok(Self {
            methods: methods.to_vec(),
            path,
            auth: RouteAuth::Disabled,
            handler: on(filter, handler).with_state(state),
        })
    }

    #[must_use]
    pub fn auth(mut self, auth: RouteAuth) -> Self {
        self.auth = auth;
        self
    }

    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn auth_settings(&self) -> &RouteAuth {
        &self.auth
    }

    pub(super) fn overlaps(&self, other: &Self) -> Option<&Method> {
        if self.path != other.path {
            return None;
        }
        self.methods
            .iter()
            .find(|method| other.methods.contains(method))
    }
}
