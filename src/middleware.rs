use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    AppState,
    error::HttpError,
    models::UserRole,
    session::{self, Identity, SESSION_COOKIE},
};

/// Resolve the acting identity for every request
///
/// Reads the `session` cookie, verifies its signature and expiry, and loads
/// the user it names. A missing, tampered or expired cookie, or a user that no
/// longer exists, yields [`Identity::Anonymous`]. The identity is inserted into
/// the request extensions for the gates below and for handlers.
///
/// # Errors
/// Only a database failure while loading the user (rendered as a 500 page).
pub async fn resolve_identity(
    cookie_jar: CookieJar,
    State(app_state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = cookie_jar.get(SESSION_COOKIE).and_then(|cookie| {
        session::session_user_id(cookie.value(), app_state.env.session_secret.as_bytes())
    });

    let identity = match user_id {
        Some(user_id) => match app_state.db_client.session_user(user_id).await? {
            Some(user) => Identity::User(user),
            None => {
                tracing::debug!(user_id, "session names a missing user");
                Identity::Anonymous
            }
        },
        None => Identity::Anonymous,
    };

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

fn identity_of(req: &Request) -> Identity {
    req.extensions().get::<Identity>().cloned().unwrap_or_default()
}

/// Login-required gate
///
/// Anonymous callers are redirected to the login page. For GET requests the
/// requested path is carried along as `next` so the user lands back on it.
pub async fn auth(req: Request, next: Next) -> Result<impl IntoResponse, HttpError> {
    if !identity_of(&req).is_authenticated() {
        let return_to = (req.method() == Method::GET)
            .then(|| req.uri().path_and_query().map(|pq| pq.as_str().to_string()))
            .flatten();
        return Err(HttpError::unauthenticated(return_to));
    }

    Ok(next.run(req).await)
}

/// Role-required gate. Stack it inside [`auth`] so anonymous callers are sent
/// to log in first.
///
/// # Errors
/// `Forbidden` (redirect to the dashboard with "Access denied.") when the user
/// lacks `required_role`.
pub async fn role_check(
    req: Request,
    next: Next,
    required_role: UserRole,
) -> Result<impl IntoResponse, HttpError> {
    if let Err(err) = identity_of(&req).require_role(required_role) {
        tracing::info!(path = %req.uri().path(), required = required_role.to_str(), "role check failed");
        return Err(err);
    }

    Ok(next.run(req).await)
}
