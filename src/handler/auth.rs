use axum::{
    Extension, Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::instrument;

use crate::{
    AppState,
    error::HttpError,
    flash::Notice,
    forms::{FieldErrors, LoginInput, RegisterInput},
    handler::redirect_with,
    middleware::auth,
    session::{self, Identity, NextQuery},
    usecase::{
        Ctx, Submitted,
        auth::{self as accounts, LoginOutcome},
    },
    view::Page,
};

/// Router for the identity lifecycle
pub fn auth_handler() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/register", get(register_page).post(register))
        .route(
            "/logout",
            get(logout).route_layer(axum::middleware::from_fn(auth)),
        )
}

fn login_view(identity: &Identity, query: &NextQuery, input: &LoginInput, errors: &FieldErrors) -> Page {
    let action = session::login_url(query.next.as_deref());
    Page::new("Login")
        .viewer(identity)
        .form(input.form(&action, errors))
        .action(crate::view::Action::link("Create an account", "/register"))
}

pub async fn login_page(
    Extension(identity): Extension<Identity>,
    Query(query): Query<NextQuery>,
    jar: CookieJar,
) -> Response {
    if identity.is_authenticated() {
        return Redirect::to("/dashboard").into_response();
    }
    login_view(&identity, &query, &LoginInput::default(), &FieldErrors::new())
        .with_flash(jar)
        .into_response()
}

/// Check credentials and establish the session cookie
///
/// On success the browser continues to `next` when it is a same-origin path,
/// otherwise to the dashboard.
#[instrument(skip_all, fields(email = %input.email))]
pub async fn login(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<NextQuery>,
    jar: CookieJar,
    Form(input): Form<LoginInput>,
) -> Result<Response, HttpError> {
    if identity.is_authenticated() {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    let mut tx = app_state.db_client.begin().await?;
    let outcome = accounts::login(Ctx::new(&identity, &mut tx), &input).await?;
    tx.commit().await?;

    match outcome {
        LoginOutcome::Authenticated(user) => {
            let jar = session::establish(jar, &app_state.env, &user)?;
            Ok(redirect_with(jar, Notice::LoginSuccessful, query.destination()).into_response())
        }
        LoginOutcome::InvalidCredentials => {
            tracing::info!("login rejected");
            Ok(login_view(&identity, &query, &input, &FieldErrors::new())
                .notice(Notice::InvalidCredentials)
                .into_response())
        }
        LoginOutcome::Invalid(errors) => {
            Ok(login_view(&identity, &query, &input, &errors).into_response())
        }
    }
}

fn register_view(identity: &Identity, input: &RegisterInput, errors: &FieldErrors) -> Page {
    Page::new("Register")
        .viewer(identity)
        .form(input.form(errors))
}

pub async fn register_page(Extension(identity): Extension<Identity>, jar: CookieJar) -> Response {
    if identity.is_authenticated() {
        return Redirect::to("/dashboard").into_response();
    }
    register_view(&identity, &RegisterInput::default(), &FieldErrors::new())
        .with_flash(jar)
        .into_response()
}

#[instrument(skip_all, fields(email = %input.email))]
pub async fn register(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    jar: CookieJar,
    Form(input): Form<RegisterInput>,
) -> Result<Response, HttpError> {
    if identity.is_authenticated() {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    let mut tx = app_state.db_client.begin().await?;
    let outcome = accounts::register(Ctx::new(&identity, &mut tx), &input).await?;
    tx.commit().await?;

    match outcome {
        Submitted::Accepted(_) => Ok(redirect_with(jar, Notice::Registered, "/login").into_response()),
        Submitted::Rejected(errors) => Ok(register_view(&identity, &input, &errors).into_response()),
    }
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    redirect_with(session::clear(jar), Notice::LoggedOut, "/")
}
