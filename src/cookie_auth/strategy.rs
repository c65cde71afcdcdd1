use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, SET_COOKIE},
};
use axum_extra::extract::cookie::{CookieJar as RequestJar, Key, PrivateCookieJar};
use cookie::{Cookie, CookieJar};
use secrecy::ExposeSecret;
use tracing::debug;

use super::{
    UserRecord,
    error::Error,
    is_truthy,
    options::{MIN_PASSWORD_LEN, StrategyOptions},
};

/// Outcome of looking for a session cookie on a request.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Missing,
    /// Present but could not be opened, or held no user.
    Invalid,
    Valid(UserRecord),
}

/// Cookie scheme: the user record is kept client side in an encrypted,
/// authenticated cookie.
pub struct CookieStrategy {
    key: Key,
    max_age: Option<cookie::time::Duration>,
    options: StrategyOptions,
}

impl std::fmt::Debug for CookieStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieStrategy")
            .field("cookie", &self.options.cookie)
            .field("redirect_to", &self.options.redirect_to)
            .finish_non_exhaustive()
    }
}

impl CookieStrategy {
    /// Derive the cookie key from the options' password.
    ///
    /// # Errors
    /// Returns an error if the password is shorter than [`MIN_PASSWORD_LEN`] bytes
    /// or the ttl does not fit a cookie `Max-Age`.
    pub fn new(options: StrategyOptions) -> Result<Self, Error> {
        let password = options.password.expose_secret().as_bytes();
        if password.len() < MIN_PASSWORD_LEN {
            return Err(Error::PasswordTooShort);
        }

        let max_age = options
            .ttl
            .map(|ttl| {
                cookie::time::Duration::try_from(ttl).map_err(|err| Error::InvalidOption {
                    key: "ttl",
                    reason: err.to_string(),
                })
            })
            .transpose()?;

        Ok(Self {
            key: Key::derive_from(password),
            max_age,
            options,
        })
    }

    #[must_use]
    pub fn options(&self) -> &StrategyOptions {
        &self.options
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.options.cookie
    }

    #[must_use]
    pub fn redirect_to(&self) -> Option<&str> {
        self.options.redirect_to.as_deref()
    }

    /// Encrypt `record` into a session cookie carrying the configured attributes.
    ///
    /// # Errors
    /// Returns an error if the record cannot be serialized.
    pub fn seal(&self, record: &UserRecord) -> Result<Cookie<'static>, Error> {
        let value = serde_json::to_string(record).map_err(Error::Encode)?;
        let mut jar = CookieJar::new();
        jar.private_mut(&self.key).add(self.build_cookie(value));
        jar.get(self.cookie_name()).cloned().ok_or(Error::Seal)
    }

    /// An expired, empty cookie matching the session cookie's path and domain.
    #[must_use]
    pub fn removal(&self) -> Cookie<'static> {
        let mut cookie = self.build_cookie(String::new());
        cookie.make_removal();
        cookie
    }

    /// Open a sealed cookie value.
    #[must_use]
    pub fn unseal(&self, value: &str) -> SessionState {
        let Ok(header) = HeaderValue::from_str(&format!("{}={value}", self.cookie_name())) else {
            return SessionState::Invalid;
        };
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, header);
        self.read(&headers)
    }

    /// Resolve the session from the request's `Cookie` headers.
    #[must_use]
    pub fn read(&self, headers: &HeaderMap) -> SessionState {
        if RequestJar::from_headers(headers)
            .get(self.cookie_name())
            .is_none()
        {
            return SessionState::Missing;
        }

        let jar = PrivateCookieJar::from_headers(headers, self.key.clone());
        let Some(cookie) = jar.get(self.cookie_name()) else {
            debug!(cookie = self.cookie_name(), "session cookie failed to unseal");
            return SessionState::Invalid;
        };

        match serde_json::from_str::<UserRecord>(cookie.value()) {
            Ok(record) if is_truthy(&record) => SessionState::Valid(record),
            Ok(_) => SessionState::Invalid,
            Err(err) => {
                debug!(cookie = self.cookie_name(), "session cookie is not JSON: {err}");
                SessionState::Invalid
            }
        }
    }

    /// Append a `Set-Cookie` header carrying `record`.
    ///
    /// # Errors
    /// Returns an error if the record cannot be sealed into a header value.
    pub fn set(&self, headers: &mut HeaderMap, record: &UserRecord) -> Result<(), Error> {
        let cookie = self.seal(record)?;
        headers.append(SET_COOKIE, HeaderValue::from_str(&cookie.to_string())?);
        Ok(())
    }

    /// Append a `Set-Cookie` header that removes the session cookie.
    ///
    /// # Errors
    /// Returns an error if the removal cookie is not a valid header value.
    pub fn clear(&self, headers: &mut HeaderMap) -> Result<(), Error> {
        headers.append(
            SET_COOKIE,
            HeaderValue::from_str(&self.removal().to_string())?,
        );
        Ok(())
    }

    fn build_cookie(&self, value: String) -> Cookie<'static> {
        let options = &self.options;
        let mut cookie = Cookie::build((options.cookie.clone(), value))
            .path(options.path.clone())
            .secure(options.is_secure)
            .http_only(options.is_http_only);

        if let Some(domain) = &options.domain {
            cookie = cookie.domain(domain.clone());
        }

        if let Some(same_site) = options.is_same_site {
            cookie = cookie.same_site(same_site);
        }

        if let Some(max_age) = self.max_age {
            cookie = cookie.max_age(max_age);
        }

        cookie.build()
    }
}

/// Whether `headers` already set or removed the cookie called `name`.
pub(crate) fn sets_cookie(headers: &HeaderMap, name: &str) -> bool {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| Cookie::parse(value).ok())
        .any(|cookie| cookie.name() == name)
}
