use super::DBTx;
use crate::models::{Feedback, FeedbackEntry, NewFeedback};

/// Feedback submission and moderation operations
pub trait FeedbackExt {
    async fn save_feedback(&mut self, feedback: &NewFeedback) -> Result<Feedback, sqlx::Error>;

    async fn get_feedback(&mut self, feedback_id: i64) -> Result<Option<Feedback>, sqlx::Error>;

    /// Feedback filtered by moderation state, newest first. `limit` of `None`
    /// returns every row.
    async fn get_feedback_entries(
        &mut self,
        approved: bool,
        limit: Option<i64>,
    ) -> Result<Vec<FeedbackEntry>, sqlx::Error>;

    /// Set `approved = true`. Approving twice leaves the row unchanged.
    async fn approve_feedback(&mut self, feedback_id: i64)
    -> Result<Option<Feedback>, sqlx::Error>;

    async fn get_pending_feedback_count(&mut self) -> Result<i64, sqlx::Error>;
}

impl FeedbackExt for DBTx {
    async fn save_feedback(&mut self, feedback: &NewFeedback) -> Result<Feedback, sqlx::Error> {
        sqlx::query_as::<_, Feedback>(
            r#"
            INSERT INTO feedback (user_id, course_name, rating, message, approved)
            VALUES ($1, $2, $3, $4, FALSE)
            RETURNING id, user_id, course_name, rating, message, created_at, approved
            "#,
        )
        .bind(feedback.user_id)
        .bind(&feedback.course_name)
        .bind(feedback.rating)
        .bind(&feedback.message)
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn get_feedback(&mut self, feedback_id: i64) -> Result<Option<Feedback>, sqlx::Error> {
        sqlx::query_as::<_, Feedback>(
            r#"
            SELECT id, user_id, course_name, rating, message, created_at, approved
            FROM feedback WHERE id = $1
            "#,
        )
        .bind(feedback_id)
        .fetch_optional(&mut *self.tx)
        .await
    }

    async fn get_feedback_entries(
        &mut self,
        approved: bool,
        limit: Option<i64>,
    ) -> Result<Vec<FeedbackEntry>, sqlx::Error> {
        // LIMIT NULL means no limit in PostgreSQL
        sqlx::query_as::<_, FeedbackEntry>(
            r#"
            SELECT f.id, f.user_id, f.course_name, f.rating, f.message, f.created_at, f.approved,
                   u.name AS author_name
            FROM feedback f
            INNER JOIN users u ON u.id = f.user_id
            WHERE f.approved = $1
            ORDER BY f.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(approved)
        .bind(limit)
        .fetch_all(&mut *self.tx)
        .await
    }

    async fn approve_feedback(
        &mut self,
        feedback_id: i64,
    ) -> Result<Option<Feedback>, sqlx::Error> {
        sqlx::query_as::<_, Feedback>(
            r#"
            UPDATE feedback SET approved = TRUE
            WHERE id = $1
            RETURNING id, user_id, course_name, rating, message, created_at, approved
            "#,
        )
        .bind(feedback_id)
        .fetch_optional(&mut *self.tx)
        .await
    }

    async fn get_pending_feedback_count(&mut self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM feedback WHERE approved = FALSE"#)
            .fetch_one(&mut *self.tx)
            .await
    }
}
