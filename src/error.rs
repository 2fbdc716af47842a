use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use std::fmt;

use crate::{
    flash::{self, Notice},
    session, view,
};

/// Enumeration of identity and infrastructure failures with a fixed,
/// human-readable message.
///
/// PartialEq allows comparing error variants (useful in tests)
#[derive(Debug, PartialEq)]
pub enum ErrorMessage {
    // Password errors
    EmptyPassword,
    InvalidHashFormat,
    HashingError,

    // Session errors
    InvalidSession,
    UserNotAuthenticated,

    // Authorization errors
    PermissionDenied,
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ErrorMessage::EmptyPassword => "Password cannot be empty",
            ErrorMessage::HashingError => "Error while hashing password",
            ErrorMessage::InvalidHashFormat => "Invalid password hash format",
            ErrorMessage::InvalidSession => "Session is invalid or expired",
            ErrorMessage::UserNotAuthenticated => "Authentication required. Please log in.",
            ErrorMessage::PermissionDenied => "You are not allowed to perform this action",
        };
        write!(f, "{}", message)
    }
}

/// Request-terminating failure.
///
/// Validation problems and duplicate enrollments/applications are ordinary
/// outcomes of a use case and never travel through this type. Whatever a
/// handler returns as `Err` is turned into a page or a redirect by
/// [`IntoResponse`]; by then the request transaction has been dropped, which
/// rolls it back.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpError {
    /// A referenced course, internship or feedback row does not exist.
    NotFound,
    /// Login required. `next` is the path to return to after logging in.
    Unauthenticated { next: Option<String> },
    /// Logged in, but the role does not allow the action.
    Forbidden,
    /// Persistence or I/O fault. The detail is logged, never shown.
    Internal(String),
}

impl HttpError {
    pub fn server_error(message: impl Into<String>) -> Self {
        HttpError::Internal(message.into())
    }

    pub fn unauthenticated(next: Option<String>) -> Self {
        HttpError::Unauthenticated { next }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::NotFound => write!(f, "HttpError: not found"),
            HttpError::Unauthenticated { .. } => {
                write!(f, "HttpError: {}", ErrorMessage::UserNotAuthenticated)
            }
            HttpError::Forbidden => write!(f, "HttpError: {}", ErrorMessage::PermissionDenied),
            HttpError::Internal(message) => write!(f, "HttpError: internal: {}", message),
        }
    }
}

impl std::error::Error for HttpError {}

impl From<sqlx::Error> for HttpError {
    fn from(err: sqlx::Error) -> Self {
        HttpError::Internal(format!("database: {err}"))
    }
}

impl From<std::io::Error> for HttpError {
    fn from(err: std::io::Error) -> Self {
        HttpError::Internal(format!("io: {err}"))
    }
}

impl From<ErrorMessage> for HttpError {
    fn from(err: ErrorMessage) -> Self {
        HttpError::Internal(err.to_string())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match self {
            HttpError::NotFound => view::not_found().into_response(),
            HttpError::Unauthenticated { next } => {
                let jar = flash::push(CookieJar::new(), Notice::LoginRequired);
                let target = session::login_url(next.as_deref());
                (jar, Redirect::to(&target)).into_response()
            }
            HttpError::Forbidden => {
                let jar = flash::push(CookieJar::new(), Notice::AccessDenied);
                (jar, Redirect::to("/dashboard")).into_response()
            }
            HttpError::Internal(message) => {
                tracing::error!(error = %message, "request failed");
                view::internal_error().into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{StatusCode, header};

    #[test]
    fn unauthenticated_redirects_to_login_with_next() {
        let res = HttpError::unauthenticated(Some("/courses/3".into())).into_response();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let location = res.headers().get(header::LOCATION).unwrap().to_str().unwrap();
        assert!(location.starts_with("/login?next="));
        assert!(location.contains("courses"));
        let cookie = res.headers().get(header::SET_COOKIE).unwrap();
        assert!(cookie.to_str().unwrap().starts_with("flash=login_required"));
    }

    #[test]
    fn forbidden_redirects_to_dashboard() {
        let res = HttpError::Forbidden.into_response();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/dashboard");
    }

    #[test]
    fn internal_hides_detail() {
        let res = HttpError::server_error("password authentication failed").into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            HttpError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
