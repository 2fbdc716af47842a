use super::{DBTx, PageRequest, Paginated};
use crate::models::{Application, Internship, NewApplication, NewInternship, SubmittedApplication};

const INTERNSHIP_COLUMNS: &str =
    "id, title, description, duration, requirements, location, stipend, created_at";
const APPLICATION_COLUMNS: &str =
    "id, user_id, internship_id, resume_path, cover_letter, applied_at, status";

/// Internship listing and application operations
pub trait InternshipExt {
    async fn get_internship(&mut self, internship_id: i64)
    -> Result<Option<Internship>, sqlx::Error>;

    async fn get_internships(
        &mut self,
        page: PageRequest,
    ) -> Result<Paginated<Internship>, sqlx::Error>;

    async fn sample_internships(&mut self, limit: i64) -> Result<Vec<Internship>, sqlx::Error>;

    async fn all_internships(&mut self) -> Result<Vec<Internship>, sqlx::Error>;

    async fn save_internship(
        &mut self,
        internship: &NewInternship,
    ) -> Result<Internship, sqlx::Error>;

    async fn get_internship_count(&mut self) -> Result<i64, sqlx::Error>;

    async fn get_application(
        &mut self,
        user_id: i64,
        internship_id: i64,
    ) -> Result<Option<Application>, sqlx::Error>;

    /// Insert a pending application. Returns `None` when the user already
    /// applied to this internship.
    async fn save_application(
        &mut self,
        application: &NewApplication,
    ) -> Result<Option<Application>, sqlx::Error>;

    async fn get_user_applications(
        &mut self,
        user_id: i64,
    ) -> Result<Vec<SubmittedApplication>, sqlx::Error>;

    async fn get_application_count(&mut self) -> Result<i64, sqlx::Error>;
}

impl InternshipExt for DBTx {
    async fn get_internship(
        &mut self,
        internship_id: i64,
    ) -> Result<Option<Internship>, sqlx::Error> {
        sqlx::query_as::<_, Internship>(&format!(
            "SELECT {INTERNSHIP_COLUMNS} FROM internships WHERE id = $1"
        ))
        .bind(internship_id)
        .fetch_optional(&mut *self.tx)
        .await
    }

    async fn get_internships(
        &mut self,
        page: PageRequest,
    ) -> Result<Paginated<Internship>, sqlx::Error> {
        let internships = sqlx::query_as::<_, Internship>(&format!(
            "SELECT {INTERNSHIP_COLUMNS} FROM internships ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(&mut *self.tx)
        .await?;

        let total = self.get_internship_count().await?;

        Ok(Paginated::new(internships, page, total))
    }

    async fn sample_internships(&mut self, limit: i64) -> Result<Vec<Internship>, sqlx::Error> {
        sqlx::query_as::<_, Internship>(&format!(
            "SELECT {INTERNSHIP_COLUMNS} FROM internships ORDER BY id LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&mut *self.tx)
        .await
    }

    async fn all_internships(&mut self) -> Result<Vec<Internship>, sqlx::Error> {
        sqlx::query_as::<_, Internship>(&format!(
            "SELECT {INTERNSHIP_COLUMNS} FROM internships ORDER BY id"
        ))
        .fetch_all(&mut *self.tx)
        .await
    }

    async fn save_internship(
        &mut self,
        internship: &NewInternship,
    ) -> Result<Internship, sqlx::Error> {
        sqlx::query_as::<_, Internship>(&format!(
            r#"
            INSERT INTO internships (title, description, duration, requirements, location, stipend)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {INTERNSHIP_COLUMNS}
            "#
        ))
        .bind(&internship.title)
        .bind(&internship.description)
        .bind(&internship.duration)
        .bind(&internship.requirements)
        .bind(&internship.location)
        .bind(&internship.stipend)
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn get_internship_count(&mut self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM internships"#)
            .fetch_one(&mut *self.tx)
            .await
    }

    async fn get_application(
        &mut self,
        user_id: i64,
        internship_id: i64,
    ) -> Result<Option<Application>, sqlx::Error> {
        sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE user_id = $1 AND internship_id = $2"
        ))
        .bind(user_id)
        .bind(internship_id)
        .fetch_optional(&mut *self.tx)
        .await
    }

    async fn save_application(
        &mut self,
        application: &NewApplication,
    ) -> Result<Option<Application>, sqlx::Error> {
        sqlx::query_as::<_, Application>(&format!(
            r#"
            INSERT INTO applications (user_id, internship_id, resume_path, cover_letter, status)
            VALUES ($1, $2, $3, $4, 'pending')
            ON CONFLICT (user_id, internship_id) DO NOTHING
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(application.user_id)
        .bind(application.internship_id)
        .bind(&application.resume_path)
        .bind(&application.cover_letter)
        .fetch_optional(&mut *self.tx)
        .await
    }

    async fn get_user_applications(
        &mut self,
        user_id: i64,
    ) -> Result<Vec<SubmittedApplication>, sqlx::Error> {
        sqlx::query_as::<_, SubmittedApplication>(
            r#"
            SELECT a.id, a.user_id, a.internship_id, a.resume_path, a.cover_letter, a.applied_at,
                   a.status, i.title AS internship_title
            FROM applications a
            INNER JOIN internships i ON i.id = a.internship_id
            WHERE a.user_id = $1
            ORDER BY a.applied_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.tx)
        .await
    }

    async fn get_application_count(&mut self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM applications"#)
            .fetch_one(&mut *self.tx)
            .await
    }
}
