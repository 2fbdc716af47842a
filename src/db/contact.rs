use super::DBTx;
use crate::models::{Contact, NewContact};

/// Contact inbox operations
pub trait ContactExt {
    async fn save_contact(&mut self, contact: &NewContact) -> Result<Contact, sqlx::Error>;

    async fn get_pending_contact_count(&mut self) -> Result<i64, sqlx::Error>;
}

impl ContactExt for DBTx {
    async fn save_contact(&mut self, contact: &NewContact) -> Result<Contact, sqlx::Error> {
        sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (name, email, subject, message, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING id, name, email, subject, message, created_at, status
            "#,
        )
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.subject)
        .bind(&contact.message)
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn get_pending_contact_count(&mut self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM contacts WHERE status = 'pending'"#)
            .fetch_one(&mut *self.tx)
            .await
    }
}
