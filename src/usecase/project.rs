use super::Ctx;
use crate::{
    db::Store,
    error::HttpError,
    models::{Contact, NewContact},
};

/// Register interest in a project. No project record changes; the request is
/// filed as a contact message from the current user.
pub async fn request_project<S: Store>(
    ctx: Ctx<'_, S>,
    project_id: i64,
) -> Result<Contact, HttpError> {
    let user = ctx.identity.require_authenticated()?;

    let project = ctx
        .store
        .get_project(project_id)
        .await?
        .ok_or(HttpError::NotFound)?;

    let contact = ctx
        .store
        .save_contact(&NewContact {
            name: user.name.clone(),
            email: user.email.clone(),
            subject: format!("Project Request: {}", project.title),
            message: format!(
                "I am interested in the project: {}. Please contact me for further discussion.",
                project.title
            ),
        })
        .await?;

    tracing::info!(user_id = user.id, project_id, contact_id = contact.id, "project requested");
    Ok(contact)
}
