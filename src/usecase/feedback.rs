use serde::Serialize;

use super::{Ctx, Submitted};
use crate::{
    db::Store,
    error::HttpError,
    forms::FeedbackInput,
    models::{Feedback, FeedbackEntry, UserRole},
};

/// Stored unapproved; it stays off public pages until an admin approves it.
pub async fn submit_feedback<S: Store>(
    ctx: Ctx<'_, S>,
    input: &FeedbackInput,
) -> Result<Submitted<Feedback>, HttpError> {
    let user = ctx.identity.require_authenticated()?;

    let new_feedback = match input.validated(user.id) {
        Ok(feedback) => feedback,
        Err(errors) => return Ok(Submitted::Rejected(errors)),
    };

    let feedback = ctx.store.save_feedback(&new_feedback).await?;
    tracing::info!(user_id = user.id, feedback_id = feedback.id, "feedback submitted");
    Ok(Submitted::Accepted(feedback))
}

#[derive(Debug, Serialize)]
pub struct ModerationQueue {
    pub pending: Vec<FeedbackEntry>,
    pub approved: Vec<FeedbackEntry>,
}

pub async fn moderation_queue<S: Store>(ctx: Ctx<'_, S>) -> Result<ModerationQueue, HttpError> {
    ctx.identity.require_role(UserRole::Admin)?;

    Ok(ModerationQueue {
        pending: ctx.store.get_feedback_entries(false, None).await?,
        approved: ctx.store.get_feedback_entries(true, None).await?,
    })
}

/// Idempotent: an already approved item is returned untouched.
pub async fn approve_feedback<S: Store>(
    ctx: Ctx<'_, S>,
    feedback_id: i64,
) -> Result<Feedback, HttpError> {
    let admin = ctx.identity.require_role(UserRole::Admin)?;

    let feedback = ctx
        .store
        .get_feedback(feedback_id)
        .await?
        .ok_or(HttpError::NotFound)?;
    if feedback.approved {
        return Ok(feedback);
    }

    let approved = ctx
        .store
        .approve_feedback(feedback_id)
        .await?
        .ok_or(HttpError::NotFound)?;
    tracing::info!(admin_id = admin.id, feedback_id, "feedback approved");
    Ok(approved)
}
