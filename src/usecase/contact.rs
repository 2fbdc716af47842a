use super::{Ctx, Submitted};
use crate::{
    db::Store,
    error::HttpError,
    forms::ContactInput,
    models::Contact,
};

pub async fn send_message<S: Store>(
    ctx: Ctx<'_, S>,
    input: &ContactInput,
) -> Result<Submitted<Contact>, HttpError> {
    let new_contact = match input.validated() {
        Ok(contact) => contact,
        Err(errors) => return Ok(Submitted::Rejected(errors)),
    };

    let contact = ctx.store.save_contact(&new_contact).await?;
    tracing::info!(contact_id = contact.id, "contact message received");
    Ok(Submitted::Accepted(contact))
}
