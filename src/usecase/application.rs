use super::Ctx;
use crate::{
    db::Store,
    error::HttpError,
    forms::{ApplicationInput, FieldErrors},
    models::{Application, Internship, NewApplication},
    uploads::UploadDir,
};

#[derive(Debug, PartialEq)]
pub enum ApplyGate {
    Open(Internship),
    AlreadyApplied,
}

/// Decide whether the application form is shown at all.
pub async fn open_application<S: Store>(
    ctx: Ctx<'_, S>,
    internship_id: i64,
) -> Result<ApplyGate, HttpError> {
    let user = ctx.identity.require_authenticated()?;

    let internship = ctx
        .store
        .get_internship(internship_id)
        .await?
        .ok_or(HttpError::NotFound)?;

    if ctx
        .store
        .get_application(user.id, internship_id)
        .await?
        .is_some()
    {
        return Ok(ApplyGate::AlreadyApplied);
    }

    Ok(ApplyGate::Open(internship))
}

#[derive(Debug, PartialEq)]
pub enum ApplyOutcome {
    Applied(Application),
    AlreadyApplied,
    Invalid(Internship, FieldErrors),
}

/// Validate, store the resume if one was sent, then record a pending application.
///
/// A resume written for an application that ends up not being recorded is
/// removed again.
pub async fn submit_application<S: Store>(
    ctx: Ctx<'_, S>,
    uploads: &UploadDir,
    internship_id: i64,
    input: &ApplicationInput,
) -> Result<ApplyOutcome, HttpError> {
    let user = ctx.identity.require_authenticated()?;

    let internship = ctx
        .store
        .get_internship(internship_id)
        .await?
        .ok_or(HttpError::NotFound)?;

    if ctx
        .store
        .get_application(user.id, internship_id)
        .await?
        .is_some()
    {
        return Ok(ApplyOutcome::AlreadyApplied);
    }

    let cover_letter = match input.validated() {
        Ok(cover_letter) => cover_letter,
        Err(errors) => return Ok(ApplyOutcome::Invalid(internship, errors)),
    };

    let resume_path = match &input.resume {
        Some(resume) => Some(uploads.save_resume(user.id, internship_id, resume).await?),
        None => None,
    };

    let new_application = NewApplication {
        user_id: user.id,
        internship_id,
        resume_path: resume_path.clone(),
        cover_letter,
    };

    let saved = ctx.store.save_application(&new_application).await;
    match saved {
        Ok(Some(application)) => {
            tracing::info!(
                user_id = user.id,
                internship_id,
                with_resume = resume_path.is_some(),
                "application submitted"
            );
            Ok(ApplyOutcome::Applied(application))
        }
        Ok(None) => {
            if let Some(stored) = &resume_path {
                uploads.discard(stored).await;
            }
            Ok(ApplyOutcome::AlreadyApplied)
        }
        Err(err) => {
            if let Some(stored) = &resume_path {
                uploads.discard(stored).await;
            }
            Err(err.into())
        }
    }
}

/// Settle a submission once the request transaction has been committed or
/// has failed to. A resume stored for an application whose row did not commit
/// is removed so it cannot be served from the upload folder.
pub async fn settle_commit(
    uploads: &UploadDir,
    outcome: &ApplyOutcome,
    committed: Result<(), sqlx::Error>,
) -> Result<(), HttpError> {
    let Err(err) = committed else {
        return Ok(());
    };
    if let ApplyOutcome::Applied(Application {
        resume_path: Some(stored),
        ..
    }) = outcome
    {
        uploads.discard(stored).await;
    }
    Err(err.into())
}
