use axum::{
    Extension, Form, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State, multipart::MultipartError},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::instrument;

use crate::{
    AppState,
    error::HttpError,
    flash::Notice,
    forms::{ApplicationInput, FeedbackInput, FieldErrors, ResumeUpload},
    handler::{parse_id, redirect_with},
    middleware::auth,
    session::Identity,
    usecase::{
        Ctx, Submitted,
        application::{self, ApplyGate, ApplyOutcome},
        dashboard::{self as overview, Dashboard},
        enrollment::{self, EnrollOutcome},
        feedback, project,
    },
    view::{Action, Page},
};

/// Routes that need a logged-in user
pub fn member_handler(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/courses/{course_id}/enroll", post(enroll))
        .route(
            "/internships/{internship_id}/apply",
            get(apply_page)
                .post(apply)
                .layer(DefaultBodyLimit::max(app_state.env.max_content_length)),
        )
        .route("/projects/{project_id}/request", get(request_project))
        .route("/feedback", get(feedback_page).post(submit_feedback))
        .route_layer(axum::middleware::from_fn(auth))
}

pub async fn dashboard(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    jar: CookieJar,
) -> Result<Response, HttpError> {
    let mut tx = app_state.db_client.begin().await?;
    let view = overview::dashboard(Ctx::new(&identity, &mut tx)).await?;
    tx.commit().await?;

    match view {
        Dashboard::Admin => Ok(Redirect::to("/admin/dashboard").into_response()),
        Dashboard::Member(member) => Ok(Page::new("My Dashboard")
            .viewer(&identity)
            .action(Action::link("Browse Courses", "/courses"))
            .action(Action::link("Find Internships", "/internships"))
            .context(&member)
            .with_flash(jar)
            .into_response()),
    }
}

#[instrument(skip_all)]
pub async fn enroll(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(raw_id): Path<String>,
    jar: CookieJar,
) -> Result<impl IntoResponse, HttpError> {
    let course_id = parse_id(&raw_id)?;

    let mut tx = app_state.db_client.begin().await?;
    let outcome = enrollment::enroll(Ctx::new(&identity, &mut tx), course_id).await?;
    tx.commit().await?;

    let notice = match outcome {
        EnrollOutcome::Enrolled(_) => Notice::Enrolled,
        EnrollOutcome::AlreadyEnrolled => Notice::AlreadyEnrolled,
    };
    Ok(redirect_with(jar, notice, &format!("/courses/{course_id}")))
}

fn apply_view(identity: &Identity, internship_id: i64, title: &str, input: &ApplicationInput, errors: &FieldErrors) -> Page {
    Page::new(format!("Apply for {title}"))
        .viewer(identity)
        .form(input.form(internship_id, errors))
}

pub async fn apply_page(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(raw_id): Path<String>,
    jar: CookieJar,
) -> Result<Response, HttpError> {
    let internship_id = parse_id(&raw_id)?;

    let mut tx = app_state.db_client.begin().await?;
    let gate = application::open_application(Ctx::new(&identity, &mut tx), internship_id).await?;
    tx.commit().await?;

    match gate {
        ApplyGate::AlreadyApplied => Ok(redirect_with(
            jar,
            Notice::AlreadyApplied,
            &format!("/internships/{internship_id}"),
        )
        .into_response()),
        ApplyGate::Open(internship) => Ok(apply_view(
            &identity,
            internship_id,
            &internship.title,
            &ApplicationInput::default(),
            &FieldErrors::new(),
        )
        .with_flash(jar)
        .into_response()),
    }
}

/// Collect the `resume` file and `cover_letter` text from a multipart body.
/// A file input left empty arrives as a part with no name and no bytes.
async fn read_application(mut multipart: Multipart) -> Result<ApplicationInput, MultipartError> {
    let mut input = ApplicationInput::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                if !(filename.is_empty() && bytes.is_empty()) {
                    input.resume = Some(ResumeUpload {
                        filename,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "cover_letter" => input.cover_letter = field.text().await?,
            _ => {}
        }
    }

    Ok(input)
}

#[instrument(skip_all)]
pub async fn apply(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(raw_id): Path<String>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Response, HttpError> {
    let internship_id = parse_id(&raw_id)?;

    let input = match read_application(multipart).await {
        Ok(input) => input,
        Err(err) => {
            tracing::info!(error = %err, "rejected application body");
            return Ok(err.into_response());
        }
    };

    let mut tx = app_state.db_client.begin().await?;
    let outcome = application::submit_application(
        Ctx::new(&identity, &mut tx),
        &app_state.uploads,
        internship_id,
        &input,
    )
    .await?;
    application::settle_commit(&app_state.uploads, &outcome, tx.commit().await).await?;

    let back = format!("/internships/{internship_id}");
    match outcome {
        ApplyOutcome::Applied(_) => {
            Ok(redirect_with(jar, Notice::ApplicationSubmitted, &back).into_response())
        }
        ApplyOutcome::AlreadyApplied => {
            Ok(redirect_with(jar, Notice::AlreadyApplied, &back).into_response())
        }
        ApplyOutcome::Invalid(internship, errors) => Ok(apply_view(
            &identity,
            internship_id,
            &internship.title,
            &input,
            &errors,
        )
        .into_response()),
    }
}

#[instrument(skip_all)]
pub async fn request_project(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(raw_id): Path<String>,
    jar: CookieJar,
) -> Result<impl IntoResponse, HttpError> {
    let project_id = parse_id(&raw_id)?;

    let mut tx = app_state.db_client.begin().await?;
    project::request_project(Ctx::new(&identity, &mut tx), project_id).await?;
    tx.commit().await?;

    Ok(redirect_with(jar, Notice::ProjectRequested, "/projects"))
}

fn feedback_view(identity: &Identity, input: &FeedbackInput, errors: &FieldErrors) -> Page {
    Page::new("Share Your Feedback")
        .viewer(identity)
        .form(input.form(errors))
}

pub async fn feedback_page(Extension(identity): Extension<Identity>, jar: CookieJar) -> impl IntoResponse {
    feedback_view(&identity, &FeedbackInput::default(), &FieldErrors::new()).with_flash(jar)
}

#[instrument(skip_all)]
pub async fn submit_feedback(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    jar: CookieJar,
    Form(input): Form<FeedbackInput>,
) -> Result<Response, HttpError> {
    let mut tx = app_state.db_client.begin().await?;
    let outcome = feedback::submit_feedback(Ctx::new(&identity, &mut tx), &input).await?;
    tx.commit().await?;

    match outcome {
        Submitted::Accepted(_) => {
            Ok(redirect_with(jar, Notice::FeedbackReceived, "/feedback").into_response())
        }
        Submitted::Rejected(errors) => Ok(feedback_view(&identity, &input, &errors).into_response()),
    }
}
