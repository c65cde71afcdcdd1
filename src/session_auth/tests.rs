//! Router-level tests for the login/logout routes.

use super::*;
use crate::{
    admin::{LoginPage, StaticAuthenticator, authenticate_with},
    cookie_auth::{AuthMode, Credentials, SessionState},
};
use anyhow::{Context, Result, anyhow};
use axum::{
    Extension, Json, Router,
    body::{Body, to_bytes},
    http::{
        Request, StatusCode,
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
    },
    response::{IntoResponse, Response},
};
use cookie::Cookie;
use secrecy::SecretString;
use serde_json::{Map, Value, json};
use tower::ServiceExt;

const PASSWORD: &str = "a-long-cookie-password-of-32-bytes!!";

/// Echoes the page data back as JSON so tests can inspect it.
struct JsonRenderer;

impl LoginRenderer for JsonRenderer {
    fn render_login(&self, page: LoginPage<'_>) -> Response {
        Json(json!({
            "action": page.action,
            "errorMessage": page.error_message,
        }))
        .into_response()
    }
}

fn authenticator() -> Arc<dyn crate::admin::Authenticator> {
    Arc::new(authenticate_with(|email: String, password: String| async move {
        match (email.as_str(), password.as_str()) {
            ("a@b.com", "x") => Ok(Some(json!({ "id": 1 }))),
            ("zero@b.com", _) => Ok(Some(json!(0))),
            ("boom@b.com", _) => Err(anyhow!("user directory unavailable")),
            _ => Ok(None),
        }
    }))
}

fn config() -> SessionAuthConfig {
    SessionAuthConfig::new(SecretString::from(PASSWORD.to_string()), authenticator())
}

struct Harness {
    router: Router,
    strategy: Arc<CookieStrategy>,
}

async fn whoami(Extension(credentials): Extension<Credentials>) -> Json<Value> {
    Json(credentials.0.unwrap_or(Value::Null))
}

fn harness(config: SessionAuthConfig) -> Result<Harness> {
    let root = config.root_path().to_string();
    let name = config.strategy().to_string();

    let mut server = Server::new();
    register(&mut server, config, Arc::new(JsonRenderer))?;
    server.route(
        Route::new(&[Method::GET], root, whoami, ())?.auth(RouteAuth::required(name.clone())),
    )?;

    let strategy = server
        .strategy(&name)
        .cloned()
        .context("strategy missing after register")?;

    Ok(Harness {
        router: server.into_router(),
        strategy,
    })
}

fn post_form(uri: &str, body: &str) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))?)
}

fn get(uri: &str) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())?)
}

async fn json_body(response: Response) -> Result<Value> {
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&body)?)
}

fn set_cookie(response: &Response) -> Result<Cookie<'static>> {
    let header = response
        .headers()
        .get(SET_COOKIE)
        .context("missing Set-Cookie")?
        .to_str()?;
    Ok(Cookie::parse(header.to_string())?)
}

#[test]
fn register_adds_one_strategy_and_two_routes() -> Result<()> {
    let mut server = Server::new();
    register(&mut server, config(), Arc::new(JsonRenderer))?;

    assert_eq!(server.strategies(), vec!["session"]);

    let routes = server.routes();
    assert_eq!(routes.len(), 2);

    assert_eq!(routes[0].path(), "/admin/login");
    assert_eq!(routes[0].methods(), &[Method::GET, Method::POST]);
    assert_eq!(
        routes[0].auth_settings(),
        &RouteAuth::Strategy {
            name: "session".to_string(),
            mode: AuthMode::Try,
            redirect: false,
        }
    );

    assert_eq!(routes[1].path(), "/admin/logout");
    assert_eq!(routes[1].methods(), &[Method::GET]);
    assert_eq!(routes[1].auth_settings(), &RouteAuth::Disabled);
    Ok(())
}

#[test]
fn register_uses_configured_strategy_name() -> Result<()> {
    let mut server = Server::new();
    register(
        &mut server,
        config().with_strategy("admin-session".to_string()),
        Arc::new(JsonRenderer),
    )?;

    assert_eq!(server.strategies(), vec!["admin-session"]);
    assert_eq!(
        server.routes()[0].auth_settings().strategy(),
        Some("admin-session")
    );
    Ok(())
}

#[test]
fn register_twice_on_one_server_fails() -> Result<()> {
    let mut server = Server::new();
    register(&mut server, config(), Arc::new(JsonRenderer))?;

    let result = register(&mut server, config(), Arc::new(JsonRenderer));
    assert!(matches!(
        result,
        Err(Error::Server(crate::server::Error::DuplicateStrategy(_)))
    ));
    Ok(())
}

#[test]
fn short_cookie_password_fails_registration() {
    let config = SessionAuthConfig::new(SecretString::from("short".to_string()), authenticator());
    let mut server = Server::new();

    let result = register(&mut server, config, Arc::new(JsonRenderer));
    assert!(matches!(
        result,
        Err(Error::CookieAuth(crate::cookie_auth::Error::PasswordTooShort))
    ));
    assert!(server.strategies().is_empty());
}

#[test]
fn capture_syntax_in_paths_fails_registration_before_routing() {
    for config in [
        config().with_login_path("/admin/:login".to_string()),
        config().with_logout_path("/admin/*out".to_string()),
        config().with_login_path("/admin/{login}".to_string()),
        config().with_root_path(String::new()),
    ] {
        let mut server = Server::new();
        let result = register(&mut server, config, Arc::new(JsonRenderer));
        assert!(matches!(result, Err(Error::Config(_))));
        assert!(server.strategies().is_empty());
        assert!(server.routes().is_empty());
        let _router = server.into_router();
    }
}

#[tokio::test]
async fn get_login_renders_default_message() -> Result<()> {
    let harness = harness(config().with_default_message("Admins only".to_string()))?;

    let response = harness.router.oneshot(get("/admin/login")?).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(SET_COOKIE).is_none());
    assert_eq!(
        json_body(response).await?,
        json!({ "action": "/admin/login", "errorMessage": "Admins only" })
    );
    Ok(())
}

#[tokio::test]
async fn post_valid_credentials_sets_session_and_redirects() -> Result<()> {
    let harness = harness(config())?;

    let response = harness
        .router
        .oneshot(post_form("/admin/login", "email=a%40b.com&password=x")?)
        .await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(LOCATION).context("missing Location")?,
        "/admin"
    );

    let cookie = set_cookie(&response)?;
    assert_eq!(cookie.name(), "bastion_session");
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(
        harness.strategy.unseal(cookie.value()),
        SessionState::Valid(json!({ "id": 1 }))
    );
    Ok(())
}

#[tokio::test]
async fn post_accepts_json_body() -> Result<()> {
    let harness = harness(config())?;

    let response = harness
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/login")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email":"a@b.com","password":"x"}"#))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(response.headers().get(SET_COOKIE).is_some());
    Ok(())
}

#[tokio::test]
async fn post_wrong_credentials_rerenders_without_cookie() -> Result<()> {
    let harness = harness(config())?;

    let response = harness
        .router
        .oneshot(post_form("/admin/login", "email=a%40b.com&password=nope")?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(SET_COOKIE).is_none());
    assert_eq!(
        json_body(response).await?,
        json!({
            "action": "/admin/login",
            "errorMessage": "Wrong email and/or password",
        })
    );
    Ok(())
}

#[tokio::test]
async fn falsy_record_counts_as_wrong_credentials() -> Result<()> {
    let harness = harness(config())?;

    let response = harness
        .router
        .oneshot(post_form("/admin/login", "email=zero%40b.com&password=x")?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(SET_COOKIE).is_none());
    let body = json_body(response).await?;
    assert_eq!(body["errorMessage"], WRONG_CREDENTIALS);
    Ok(())
}

#[tokio::test]
async fn authenticator_failure_is_a_server_error() -> Result<()> {
    let harness = harness(config())?;

    let response = harness
        .router
        .oneshot(post_form("/admin/login", "email=boom%40b.com&password=x")?)
        .await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().get(SET_COOKIE).is_none());
    Ok(())
}

#[tokio::test]
async fn malformed_payload_is_a_server_error() -> Result<()> {
    let harness = harness(config())?;

    let response = harness
        .router
        .clone()
        .oneshot(post_form("/admin/login", "email=a%40b.com")?)
        .await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = harness
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/login")
                .header(CONTENT_TYPE, "text/plain")
                .body(Body::from("a@b.com:x"))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookie_and_redirects_every_time() -> Result<()> {
    let harness = harness(config())?;

    for _ in 0..2 {
        let response = harness.router.clone().oneshot(get("/admin/logout")?).await?;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).context("missing Location")?,
            "/admin/login"
        );
        let cookie = set_cookie(&response)?;
        assert_eq!(cookie.name(), "bastion_session");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(cookie::time::Duration::seconds(0)));
    }
    Ok(())
}

#[tokio::test]
async fn login_session_then_logout() -> Result<()> {
    let harness = harness(config())?;

    // No session yet: the dashboard sends us to the form.
    let response = harness.router.clone().oneshot(get("/admin")?).await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(LOCATION).context("missing Location")?,
        "/admin/login"
    );

    let response = harness
        .router
        .clone()
        .oneshot(post_form("/admin/login", "email=a%40b.com&password=x")?)
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let session = set_cookie(&response)?;

    let response = harness
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin")
                .header(COOKIE, session.stripped().to_string())
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await?, json!({ "id": 1 }));

    let response = harness.router.oneshot(get("/admin/logout")?).await?;
    let cleared = set_cookie(&response)?;
    assert_eq!(cleared.name(), session.name());
    assert_eq!(cleared.value(), "");
    Ok(())
}

#[tokio::test]
async fn other_options_reach_the_cookie() -> Result<()> {
    let mut other = Map::new();
    other.insert("ttl".to_string(), json!(3_600_000));
    other.insert("isSameSite".to_string(), json!("Lax"));
    other.insert("cookie".to_string(), json!("ignored"));

    let harness = harness(
        config()
            .with_secure(false)
            .with_cookie_name("sid".to_string())
            .with_other(other),
    )?;

    let response = harness
        .router
        .oneshot(post_form("/admin/login", "email=a%40b.com&password=x")?)
        .await?;

    let cookie = set_cookie(&response)?;
    assert_eq!(cookie.name(), "sid");
    assert_ne!(cookie.secure(), Some(true));
    assert!(
        !response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .any(|value| value.contains("Secure"))
    );
    assert_eq!(cookie.same_site(), Some(cookie::SameSite::Lax));
    assert_eq!(cookie.max_age(), Some(cookie::time::Duration::hours(1)));
    Ok(())
}

#[tokio::test]
async fn custom_paths_are_honoured() -> Result<()> {
    let harness = harness(
        config()
            .with_login_path("/login".to_string())
            .with_logout_path("/logout".to_string())
            .with_root_path("/".to_string()),
    )?;

    let response = harness
        .router
        .clone()
        .oneshot(post_form("/login", "email=a%40b.com&password=x")?)
        .await?;
    assert_eq!(
        response.headers().get(LOCATION).context("missing Location")?,
        "/"
    );

    let response = harness.router.oneshot(get("/logout")?).await?;
    assert_eq!(
        response.headers().get(LOCATION).context("missing Location")?,
        "/login"
    );
    Ok(())
}

#[tokio::test]
async fn static_authenticator_login() -> Result<()> {
    let config = SessionAuthConfig::new(
        SecretString::from(PASSWORD.to_string()),
        Arc::new(StaticAuthenticator::new(
            "admin@example.com",
            SecretString::from("hunter2".to_string()),
        )),
    );
    let harness = harness(config)?;

    let response = harness
        .router
        .oneshot(post_form(
            "/admin/login",
            "email=admin%40example.com&password=hunter2",
        )?)
        .await?;

    let cookie = set_cookie(&response)?;
    match harness.strategy.unseal(cookie.value()) {
        SessionState::Valid(record) => {
            assert_eq!(record["email"], "admin@example.com");
            assert_eq!(record["role"], "admin");
        }
        state => return Err(anyhow!("unexpected session state {state:?}")),
    }
    Ok(())
}
