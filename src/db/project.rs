use super::{DBTx, PageRequest, Paginated};
use crate::models::{NewProject, Project};

const PROJECT_COLUMNS: &str =
    "id, title, description, tech_stack, budget_range, timeline, created_at";

/// Freelance project catalogue operations
pub trait ProjectExt {
    async fn get_project(&mut self, project_id: i64) -> Result<Option<Project>, sqlx::Error>;

    async fn get_projects(&mut self, page: PageRequest)
    -> Result<Paginated<Project>, sqlx::Error>;

    async fn sample_projects(&mut self, limit: i64) -> Result<Vec<Project>, sqlx::Error>;

    async fn all_projects(&mut self) -> Result<Vec<Project>, sqlx::Error>;

    async fn save_project(&mut self, project: &NewProject) -> Result<Project, sqlx::Error>;
}

impl ProjectExt for DBTx {
    async fn get_project(&mut self, project_id: i64) -> Result<Option<Project>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(project_id)
        .fetch_optional(&mut *self.tx)
        .await
    }

    async fn get_projects(
        &mut self,
        page: PageRequest,
    ) -> Result<Paginated<Project>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(&mut *self.tx)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM projects"#)
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(Paginated::new(projects, page, total))
    }

    async fn sample_projects(&mut self, limit: i64) -> Result<Vec<Project>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY id LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&mut *self.tx)
        .await
    }

    async fn all_projects(&mut self) -> Result<Vec<Project>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY id"
        ))
        .fetch_all(&mut *self.tx)
        .await
    }

    async fn save_project(&mut self, project: &NewProject) -> Result<Project, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (title, description, tech_stack, budget_range, timeline)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.tech_stack)
        .bind(&project.budget_range)
        .bind(&project.timeline)
        .fetch_one(&mut *self.tx)
        .await
    }
}
