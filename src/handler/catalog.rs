use axum::{
    Extension, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::{
    AppState,
    error::HttpError,
    handler::parse_id,
    models::CourseLevel,
    session::Identity,
    usecase::{Ctx, catalog},
    view::{Action, Page},
};

/// Public browsing: landing page, courses, internships and projects
pub fn catalog_handler() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/courses", get(courses))
        .route("/courses/{course_id}", get(course_detail))
        .route("/internships", get(internships))
        .route("/internships/{internship_id}", get(internship_detail))
        .route("/projects", get(projects))
}

/// Listing query. Values stay raw so a malformed page number degrades to page 1
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub level: Option<String>,
}

fn paged(mut page: Page, base: &str, current: i64, has_prev: bool, has_next: bool, extra: &str) -> Page {
    if has_prev {
        page = page.action(Action::link(
            "Previous",
            format!("{base}?page={}{extra}", current - 1),
        ));
    }
    if has_next {
        page = page.action(Action::link(
            "Next",
            format!("{base}?page={}{extra}", current + 1),
        ));
    }
    page
}

/// `&level=` suffix for pagination links. Only a known level is carried over.
fn level_param(selected: &str) -> String {
    selected
        .parse::<CourseLevel>()
        .map(|level| format!("&level={}", level.to_str()))
        .unwrap_or_default()
}

pub async fn home(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    jar: CookieJar,
) -> Result<impl IntoResponse, HttpError> {
    let mut tx = app_state.db_client.begin().await?;
    let view = catalog::home(Ctx::new(&identity, &mut tx)).await?;
    tx.commit().await?;

    Ok(Page::new("Build My Skillset")
        .viewer(&identity)
        .context(&view)
        .with_flash(jar))
}

pub async fn courses(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, HttpError> {
    let mut tx = app_state.db_client.begin().await?;
    let listing = catalog::list_courses(
        Ctx::new(&identity, &mut tx),
        query.page.as_deref(),
        query.level.as_deref(),
    )
    .await?;
    tx.commit().await?;

    let mut page = Page::new("Courses").viewer(&identity);
    page = page.action(Action::link("All levels", "/courses"));
    for level in CourseLevel::ALL {
        page = page.action(Action::link(
            level.label(),
            format!("/courses?level={}", level.to_str()),
        ));
    }
    let extra = level_param(&listing.selected_level);
    page = paged(
        page,
        "/courses",
        listing.courses.page,
        listing.courses.has_prev(),
        listing.courses.has_next(),
        &extra,
    );

    Ok(page.context(&listing).with_flash(jar))
}

pub async fn course_detail(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(raw_id): Path<String>,
    jar: CookieJar,
) -> Result<impl IntoResponse, HttpError> {
    let course_id = parse_id(&raw_id)?;

    let mut tx = app_state.db_client.begin().await?;
    let detail = catalog::course_detail(Ctx::new(&identity, &mut tx), course_id).await?;
    tx.commit().await?;

    let mut page = Page::new(detail.course.title.clone()).viewer(&identity);
    if !detail.is_enrolled {
        page = page.action(Action::post(
            "Enroll Now",
            format!("/courses/{course_id}/enroll"),
        ));
    }

    Ok(page.context(&detail).with_flash(jar))
}

pub async fn internships(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, HttpError> {
    let mut tx = app_state.db_client.begin().await?;
    let listing = catalog::list_internships(Ctx::new(&identity, &mut tx), query.page.as_deref()).await?;
    tx.commit().await?;

    let mut page = Page::new("Internships").viewer(&identity);
    page = paged(
        page,
        "/internships",
        listing.page,
        listing.has_prev(),
        listing.has_next(),
        "",
    );

    Ok(page.context(&listing).with_flash(jar))
}

pub async fn internship_detail(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(raw_id): Path<String>,
    jar: CookieJar,
) -> Result<Response, HttpError> {
    let internship_id = parse_id(&raw_id)?;

    let mut tx = app_state.db_client.begin().await?;
    let detail = catalog::internship_detail(Ctx::new(&identity, &mut tx), internship_id).await?;
    tx.commit().await?;

    let mut page = Page::new(detail.internship.title.clone()).viewer(&identity);
    if !detail.has_applied {
        page = page.action(Action::link(
            "Apply Now",
            format!("/internships/{internship_id}/apply"),
        ));
    }

    Ok(page.context(&detail).with_flash(jar).into_response())
}

pub async fn projects(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, HttpError> {
    let mut tx = app_state.db_client.begin().await?;
    let listing = catalog::list_projects(Ctx::new(&identity, &mut tx), query.page.as_deref()).await?;
    tx.commit().await?;

    let mut page = Page::new("Projects").viewer(&identity);
    for project in &listing.items {
        page = page.action(Action::link(
            format!("Request \"{}\"", project.title),
            format!("/projects/{}/request", project.id),
        ));
    }
    page = paged(
        page,
        "/projects",
        listing.page,
        listing.has_prev(),
        listing.has_next(),
        "",
    );

    Ok(page.context(&listing).with_flash(jar))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_keeps_only_known_levels() {
        assert_eq!(level_param("advanced"), "&level=advanced");
        assert_eq!(level_param(""), "");
        assert_eq!(level_param("beginner&page=9"), "");
        assert_eq!(level_param("\"><script>"), "");
    }
}
