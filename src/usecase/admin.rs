use serde::Serialize;

use super::{Ctx, Submitted};
use crate::{
    db::Store,
    error::HttpError,
    forms::{CourseInput, InternshipInput, ProjectInput},
    models::{Course, Internship, Project, UserRole},
};

#[derive(Debug, Serialize, PartialEq)]
pub struct AdminStats {
    pub total_users: i64,
    pub total_courses: i64,
    pub total_internships: i64,
    pub total_applications: i64,
    pub pending_feedback: i64,
    pub pending_contacts: i64,
}

/// Read-only counts for the admin dashboard.
pub async fn stats<S: Store>(ctx: Ctx<'_, S>) -> Result<AdminStats, HttpError> {
    ctx.identity.require_role(UserRole::Admin)?;

    Ok(AdminStats {
        total_users: ctx.store.get_user_count().await?,
        total_courses: ctx.store.get_course_count().await?,
        total_internships: ctx.store.get_internship_count().await?,
        total_applications: ctx.store.get_application_count().await?,
        pending_feedback: ctx.store.get_pending_feedback_count().await?,
        pending_contacts: ctx.store.get_pending_contact_count().await?,
    })
}

pub async fn courses<S: Store>(ctx: Ctx<'_, S>) -> Result<Vec<Course>, HttpError> {
    ctx.identity.require_role(UserRole::Admin)?;
    Ok(ctx.store.all_courses().await?)
}

pub async fn add_course<S: Store>(
    ctx: Ctx<'_, S>,
    input: &CourseInput,
) -> Result<Submitted<Course>, HttpError> {
    let admin = ctx.identity.require_role(UserRole::Admin)?;

    let new_course = match input.validated() {
        Ok(course) => course,
        Err(errors) => return Ok(Submitted::Rejected(errors)),
    };

    let course = ctx.store.save_course(&new_course).await?;
    tracing::info!(admin_id = admin.id, course_id = course.id, "course added");
    Ok(Submitted::Accepted(course))
}

pub async fn internships<S: Store>(ctx: Ctx<'_, S>) -> Result<Vec<Internship>, HttpError> {
    ctx.identity.require_role(UserRole::Admin)?;
    Ok(ctx.store.all_internships().await?)
}

pub async fn add_internship<S: Store>(
    ctx: Ctx<'_, S>,
    input: &InternshipInput,
) -> Result<Submitted<Internship>, HttpError> {
    let admin = ctx.identity.require_role(UserRole::Admin)?;

    let new_internship = match input.validated() {
        Ok(internship) => internship,
        Err(errors) => return Ok(Submitted::Rejected(errors)),
    };

    let internship = ctx.store.save_internship(&new_internship).await?;
    tracing::info!(admin_id = admin.id, internship_id = internship.id, "internship added");
    Ok(Submitted::Accepted(internship))
}

pub async fn projects<S: Store>(ctx: Ctx<'_, S>) -> Result<Vec<Project>, HttpError> {
    ctx.identity.require_role(UserRole::Admin)?;
    Ok(ctx.store.all_projects().await?)
}

pub async fn add_project<S: Store>(
    ctx: Ctx<'_, S>,
    input: &ProjectInput,
) -> Result<Submitted<Project>, HttpError> {
    let admin = ctx.identity.require_role(UserRole::Admin)?;

    let new_project = match input.validated() {
        Ok(project) => project,
        Err(errors) => return Ok(Submitted::Rejected(errors)),
    };

    let project = ctx.store.save_project(&new_project).await?;
    tracing::info!(admin_id = admin.id, project_id = project.id, "project added");
    Ok(Submitted::Accepted(project))
}
