use axum::http::Method;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("strategy {0} is already registered")]
    DuplicateStrategy(String),
    #[error("route {method} {path} is already registered")]
    DuplicateRoute { method: Method, path: String },
    #[error("route {path} uses unknown strategy {name}")]
    UnknownStrategy { name: String, path: String },
    #[error("invalid route path: {0:?}")]
    InvalidPath(String),
    #[error("unsupported method {0}")]
    UnsupportedMethod(Method),
    #[error("route {0} has no methods")]
    NoMethods(String),
}
