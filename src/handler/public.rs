use axum::{
    Extension, Form, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::instrument;

use crate::{
    AppState,
    error::HttpError,
    flash::Notice,
    forms::{CertificateVerifyInput, ContactInput, FieldErrors},
    handler::redirect_with,
    session::Identity,
    usecase::{
        Ctx, Submitted,
        certificate::{self, Verification},
        contact,
    },
    view::Page,
};

/// Forms open to anonymous visitors
pub fn public_handler() -> Router<AppState> {
    Router::new()
        .route(
            "/verify-certificate",
            get(verify_page).post(verify_certificate),
        )
        .route("/contact", get(contact_page).post(send_message))
}

fn verify_view(identity: &Identity, input: &CertificateVerifyInput, errors: &FieldErrors) -> Page {
    Page::new("Verify Certificate")
        .viewer(identity)
        .form(input.form(errors))
}

pub async fn verify_page(Extension(identity): Extension<Identity>, jar: CookieJar) -> impl IntoResponse {
    verify_view(&identity, &CertificateVerifyInput::default(), &FieldErrors::new()).with_flash(jar)
}

/// Look a certificate up by its exact code and show the holder and course.
#[instrument(skip_all, fields(code = %input.certificate_code))]
pub async fn verify_certificate(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Form(input): Form<CertificateVerifyInput>,
) -> Result<Response, HttpError> {
    let mut tx = app_state.db_client.begin().await?;
    let verification = certificate::verify_certificate(Ctx::new(&identity, &mut tx), &input).await?;
    tx.commit().await?;

    let page = match verification {
        Verification::Found(found) => verify_view(&identity, &input, &FieldErrors::new()).context(&found),
        Verification::NotFound => {
            verify_view(&identity, &input, &FieldErrors::new()).notice(Notice::CertificateNotFound)
        }
        Verification::Invalid(errors) => verify_view(&identity, &input, &errors),
    };

    Ok(page.into_response())
}

fn contact_view(identity: &Identity, input: &ContactInput, errors: &FieldErrors) -> Page {
    Page::new("Contact Us")
        .viewer(identity)
        .form(input.form(errors))
}

pub async fn contact_page(Extension(identity): Extension<Identity>, jar: CookieJar) -> impl IntoResponse {
    contact_view(&identity, &ContactInput::default(), &FieldErrors::new()).with_flash(jar)
}

#[instrument(skip_all)]
pub async fn send_message(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    jar: CookieJar,
    Form(input): Form<ContactInput>,
) -> Result<Response, HttpError> {
    let mut tx = app_state.db_client.begin().await?;
    let outcome = contact::send_message(Ctx::new(&identity, &mut tx), &input).await?;
    tx.commit().await?;

    match outcome {
        Submitted::Accepted(_) => Ok(redirect_with(jar, Notice::MessageSent, "/contact").into_response()),
        Submitted::Rejected(errors) => Ok(contact_view(&identity, &input, &errors).into_response()),
    }
}
