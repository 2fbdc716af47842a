use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::HttpError,
    models::{User, UserRole},
    utils::{redirect::is_safe_redirect, token},
};

pub const SESSION_COOKIE: &str = "session";

/// The acting identity of a request, resolved once by
/// [`crate::middleware::resolve_identity`] and handed to every use case.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Identity {
    #[default]
    Anonymous,
    User(User),
}

impl Identity {
    pub fn user(&self) -> Option<&User> {
        match self {
            Identity::Anonymous => None,
            Identity::User(user) => Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    pub fn require_authenticated(&self) -> Result<&User, HttpError> {
        self.user().ok_or(HttpError::Unauthenticated { next: None })
    }

    /// Anonymous callers are sent to log in first; a wrong role is `Forbidden`.
    pub fn require_role(&self, role: UserRole) -> Result<&User, HttpError> {
        let user = self.require_authenticated()?;
        if user.role != role {
            return Err(HttpError::Forbidden);
        }
        Ok(user)
    }
}

/// `?next=` carried by the login page.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

impl NextQuery {
    /// Where to go after a successful login. Unsafe targets fall back to the dashboard.
    pub fn destination(&self) -> &str {
        self.next
            .as_deref()
            .filter(|next| is_safe_redirect(next))
            .unwrap_or("/dashboard")
    }
}

/// Login page URL, keeping `next` only when it is a safe redirect.
pub fn login_url(next: Option<&str>) -> String {
    let query = NextQuery {
        next: next.filter(|n| is_safe_redirect(n)).map(str::to_string),
    };
    match query.next {
        Some(_) => match serde_qs::to_string(&query) {
            Ok(qs) => format!("/login?{qs}"),
            Err(_) => "/login".to_string(),
        },
        None => "/login".to_string(),
    }
}

/// Bind the browser to `user` with a signed session cookie.
pub fn establish(jar: CookieJar, config: &Config, user: &User) -> Result<CookieJar, HttpError> {
    let token = token::create_token(
        &user.id.to_string(),
        config.session_secret.as_bytes(),
        config.session_maxage,
    )
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .max_age(time::Duration::seconds(config.session_maxage))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.session_cookie_secure)
        .build();

    Ok(jar.add(cookie))
}

pub fn clear(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// User id carried by a session cookie value, if the signature and expiry check out.
pub fn session_user_id(value: &str, secret: &[u8]) -> Option<i64> {
    token::decode_token(value, secret)
        .ok()
        .and_then(|sub| sub.parse::<i64>().ok())
}
