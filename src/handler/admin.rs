use axum::{
    Extension, Form, Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use tracing::instrument;

use crate::{
    AppState,
    error::HttpError,
    flash::Notice,
    forms::{CertificateInput, CourseInput, FieldErrors, InternshipInput, ProjectInput},
    handler::{parse_id, redirect_with},
    middleware::{auth, role_check},
    models::UserRole,
    session::Identity,
    usecase::{
        Ctx, Submitted, admin,
        certificate::{self, CertificateDesk},
        feedback,
    },
    view::{Action, Page},
};

/// Admin-only routes. The role gate runs inside the login gate so anonymous
/// callers are asked to log in before being told they lack the role.
pub fn admin_handler() -> Router<AppState> {
    Router::new()
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/courses", get(courses))
        .route("/admin/courses/add", get(course_form).post(add_course))
        .route("/admin/internships", get(internships))
        .route(
            "/admin/internships/add",
            get(internship_form).post(add_internship),
        )
        .route("/admin/projects", get(projects))
        .route("/admin/projects/add", get(project_form).post(add_project))
        .route(
            "/admin/certificates",
            get(certificates).post(issue_certificate),
        )
        .route("/admin/feedback", get(feedback_queue))
        .route("/admin/feedback/{feedback_id}/approve", post(approve_feedback))
        .route_layer(axum::middleware::from_fn(|req, next| {
            role_check(req, next, UserRole::Admin)
        }))
        .route_layer(axum::middleware::from_fn(auth))
}

#[derive(Serialize)]
struct Listing<T> {
    items: Vec<T>,
}

pub async fn dashboard(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    jar: CookieJar,
) -> Result<impl IntoResponse, HttpError> {
    let mut tx = app_state.db_client.begin().await?;
    let counts = admin::stats(Ctx::new(&identity, &mut tx)).await?;
    tx.commit().await?;

    Ok(Page::new("Admin Dashboard")
        .viewer(&identity)
        .action(Action::link("Manage Courses", "/admin/courses"))
        .action(Action::link("Manage Internships", "/admin/internships"))
        .action(Action::link("Manage Projects", "/admin/projects"))
        .action(Action::link("Certificates", "/admin/certificates"))
        .action(Action::link("Feedback", "/admin/feedback"))
        .context(&counts)
        .with_flash(jar))
}

// ============================================================================
// Courses
// ============================================================================

pub async fn courses(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    jar: CookieJar,
) -> Result<impl IntoResponse, HttpError> {
    let mut tx = app_state.db_client.begin().await?;
    let items = admin::courses(Ctx::new(&identity, &mut tx)).await?;
    tx.commit().await?;

    Ok(Page::new("Manage Courses")
        .viewer(&identity)
        .action(Action::link("Add Course", "/admin/courses/add"))
        .context(Listing { items })
        .with_flash(jar))
}

fn course_view(identity: &Identity, input: &CourseInput, errors: &FieldErrors) -> Page {
    Page::new("Add Course").viewer(identity).form(input.form(errors))
}

pub async fn course_form(Extension(identity): Extension<Identity>, jar: CookieJar) -> impl IntoResponse {
    course_view(&identity, &CourseInput::default(), &FieldErrors::new()).with_flash(jar)
}

#[instrument(skip_all, fields(title = %input.title))]
pub async fn add_course(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    jar: CookieJar,
    Form(input): Form<CourseInput>,
) -> Result<Response, HttpError> {
    let mut tx = app_state.db_client.begin().await?;
    let outcome = admin::add_course(Ctx::new(&identity, &mut tx), &input).await?;
    tx.commit().await?;

    match outcome {
        Submitted::Accepted(_) => {
            Ok(redirect_with(jar, Notice::CourseAdded, "/admin/courses").into_response())
        }
        Submitted::Rejected(errors) => Ok(course_view(&identity, &input, &errors).into_response()),
    }
}

// ============================================================================
// Internships
// ============================================================================

pub async fn internships(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    jar: CookieJar,
) -> Result<impl IntoResponse, HttpError> {
    let mut tx = app_state.db_client.begin().await?;
    let items = admin::internships(Ctx::new(&identity, &mut tx)).await?;
    tx.commit().await?;

    Ok(Page::new("Manage Internships")
        .viewer(&identity)
        .action(Action::link("Add Internship", "/admin/internships/add"))
        .context(Listing { items })
        .with_flash(jar))
}

fn internship_view(identity: &Identity, input: &InternshipInput, errors: &FieldErrors) -> Page {
    Page::new("Add Internship").viewer(identity).form(input.form(errors))
}

pub async fn internship_form(Extension(identity): Extension<Identity>, jar: CookieJar) -> impl IntoResponse {
    internship_view(&identity, &InternshipInput::default(), &FieldErrors::new()).with_flash(jar)
}

#[instrument(skip_all, fields(title = %input.title))]
pub async fn add_internship(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    jar: CookieJar,
    Form(input): Form<InternshipInput>,
) -> Result<Response, HttpError> {
    let mut tx = app_state.db_client.begin().await?;
    let outcome = admin::add_internship(Ctx::new(&identity, &mut tx), &input).await?;
    tx.commit().await?;

    match outcome {
        Submitted::Accepted(_) => {
            Ok(redirect_with(jar, Notice::InternshipAdded, "/admin/internships").into_response())
        }
        Submitted::Rejected(errors) => {
            Ok(internship_view(&identity, &input, &errors).into_response())
        }
    }
}

// ============================================================================
// Projects
// ============================================================================

pub async fn projects(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    jar: CookieJar,
) -> Result<impl IntoResponse, HttpError> {
    let mut tx = app_state.db_client.begin().await?;
    let items = admin::projects(Ctx::new(&identity, &mut tx)).await?;
    tx.commit().await?;

    Ok(Page::new("Manage Projects")
        .viewer(&identity)
        .action(Action::link("Add Project", "/admin/projects/add"))
        .context(Listing { items })
        .with_flash(jar))
}

fn project_view(identity: &Identity, input: &ProjectInput, errors: &FieldErrors) -> Page {
    Page::new("Add Project").viewer(identity).form(input.form(errors))
}

pub async fn project_form(Extension(identity): Extension<Identity>, jar: CookieJar) -> impl IntoResponse {
    project_view(&identity, &ProjectInput::default(), &FieldErrors::new()).with_flash(jar)
}

#[instrument(skip_all, fields(title = %input.title))]
pub async fn add_project(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    jar: CookieJar,
    Form(input): Form<ProjectInput>,
) -> Result<Response, HttpError> {
    let mut tx = app_state.db_client.begin().await?;
    let outcome = admin::add_project(Ctx::new(&identity, &mut tx), &input).await?;
    tx.commit().await?;

    match outcome {
        Submitted::Accepted(_) => {
            Ok(redirect_with(jar, Notice::ProjectAdded, "/admin/projects").into_response())
        }
        Submitted::Rejected(errors) => Ok(project_view(&identity, &input, &errors).into_response()),
    }
}

// ============================================================================
// Certificates
// ============================================================================

fn certificate_view(
    identity: &Identity,
    desk: &CertificateDesk,
    input: &CertificateInput,
    errors: &FieldErrors,
) -> Page {
    Page::new("Certificates")
        .viewer(identity)
        .form(input.form(&desk.users, errors))
        .context(desk)
}

pub async fn certificates(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    jar: CookieJar,
) -> Result<impl IntoResponse, HttpError> {
    let mut tx = app_state.db_client.begin().await?;
    let desk = certificate::certificate_desk(Ctx::new(&identity, &mut tx)).await?;
    tx.commit().await?;

    Ok(certificate_view(&identity, &desk, &CertificateInput::default(), &FieldErrors::new())
        .with_flash(jar))
}

#[instrument(skip_all, fields(user_id = %input.user_id))]
pub async fn issue_certificate(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    jar: CookieJar,
    Form(input): Form<CertificateInput>,
) -> Result<Response, HttpError> {
    let mut tx = app_state.db_client.begin().await?;
    let outcome = certificate::issue_certificate(Ctx::new(&identity, &mut tx), &input).await?;

    match outcome {
        Submitted::Accepted(issued) => {
            tx.commit().await?;
            Ok(redirect_with(
                jar,
                Notice::CertificateIssued(issued.certificate_code),
                "/admin/certificates",
            )
            .into_response())
        }
        Submitted::Rejected(errors) => {
            let desk = certificate::certificate_desk(Ctx::new(&identity, &mut tx)).await?;
            tx.commit().await?;
            Ok(certificate_view(&identity, &desk, &input, &errors).into_response())
        }
    }
}

// ============================================================================
// Feedback moderation
// ============================================================================

pub async fn feedback_queue(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    jar: CookieJar,
) -> Result<impl IntoResponse, HttpError> {
    let mut tx = app_state.db_client.begin().await?;
    let queue = feedback::moderation_queue(Ctx::new(&identity, &mut tx)).await?;
    tx.commit().await?;

    let mut page = Page::new("Feedback Moderation").viewer(&identity);
    for entry in &queue.pending {
        page = page.action(Action::post(
            format!("Approve #{} from {}", entry.feedback.id, entry.author_name),
            format!("/admin/feedback/{}/approve", entry.feedback.id),
        ));
    }

    Ok(page.context(&queue).with_flash(jar))
}

#[instrument(skip_all)]
pub async fn approve_feedback(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(raw_id): Path<String>,
    jar: CookieJar,
) -> Result<impl IntoResponse, HttpError> {
    let feedback_id = parse_id(&raw_id)?;

    let mut tx = app_state.db_client.begin().await?;
    feedback::approve_feedback(Ctx::new(&identity, &mut tx), feedback_id).await?;
    tx.commit().await?;

    Ok(redirect_with(jar, Notice::FeedbackApproved, "/admin/feedback"))
}
