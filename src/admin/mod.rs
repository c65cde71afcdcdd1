//! Admin panel pieces the login routes call into: the page renderer and the
//! credential check.

pub mod authenticator;
pub mod render;

pub use authenticator::{
    AuthFuture, Authenticator, FnAuthenticator, StaticAuthenticator, authenticate_with,
};
pub use render::{AdminPanel, LoginPage, LoginRenderer};
