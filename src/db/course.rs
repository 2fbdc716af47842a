use super::{DBTx, PageRequest, Paginated};
use crate::models::{Course, CourseLevel, EnrolledCourse, Enrollment, NewCourse};

const COURSE_COLUMNS: &str = "id, title, description, duration, level, price, created_at";

/// Course catalogue and enrollment operations
pub trait CourseExt {
    async fn get_course(&mut self, course_id: i64) -> Result<Option<Course>, sqlx::Error>;

    /// One page of courses in insertion order, optionally restricted to one level.
    async fn get_courses(
        &mut self,
        level: Option<CourseLevel>,
        page: PageRequest,
    ) -> Result<Paginated<Course>, sqlx::Error>;

    /// The first `limit` courses, for the landing page.
    async fn sample_courses(&mut self, limit: i64) -> Result<Vec<Course>, sqlx::Error>;

    async fn all_courses(&mut self) -> Result<Vec<Course>, sqlx::Error>;

    async fn save_course(&mut self, course: &NewCourse) -> Result<Course, sqlx::Error>;

    async fn get_course_count(&mut self) -> Result<i64, sqlx::Error>;

    async fn get_active_enrollment(
        &mut self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>, sqlx::Error>;

    /// Insert an active enrollment. Returns `None` when an active enrollment for
    /// the pair already exists.
    async fn save_enrollment(
        &mut self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>, sqlx::Error>;

    async fn get_user_enrollments(&mut self, user_id: i64)
    -> Result<Vec<EnrolledCourse>, sqlx::Error>;
}

impl CourseExt for DBTx {
    async fn get_course(&mut self, course_id: i64) -> Result<Option<Course>, sqlx::Error> {
        sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
        ))
        .bind(course_id)
        .fetch_optional(&mut *self.tx)
        .await
    }

    async fn get_courses(
        &mut self,
        level: Option<CourseLevel>,
        page: PageRequest,
    ) -> Result<Paginated<Course>, sqlx::Error> {
        let courses = sqlx::query_as::<_, Course>(&format!(
            r#"
            SELECT {COURSE_COLUMNS} FROM courses
            WHERE ($1::course_level IS NULL OR level = $1)
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(level)
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(&mut *self.tx)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM courses WHERE ($1::course_level IS NULL OR level = $1)"#,
        )
        .bind(level)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(Paginated::new(courses, page, total))
    }

    async fn sample_courses(&mut self, limit: i64) -> Result<Vec<Course>, sqlx::Error> {
        sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses ORDER BY id LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&mut *self.tx)
        .await
    }

    async fn all_courses(&mut self) -> Result<Vec<Course>, sqlx::Error> {
        sqlx::query_as::<_, Course>(&format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY id"))
            .fetch_all(&mut *self.tx)
            .await
    }

    async fn save_course(&mut self, course: &NewCourse) -> Result<Course, sqlx::Error> {
        sqlx::query_as::<_, Course>(&format!(
            r#"
            INSERT INTO courses (title, description, duration, level, price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.duration)
        .bind(course.level)
        .bind(course.price)
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn get_course_count(&mut self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM courses"#)
            .fetch_one(&mut *self.tx)
            .await
    }

    async fn get_active_enrollment(
        &mut self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        sqlx::query_as::<_, Enrollment>(
            r#"
            SELECT id, user_id, course_id, enrolled_at, status
            FROM enrollments
            WHERE user_id = $1 AND course_id = $2 AND status = 'active'
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&mut *self.tx)
        .await
    }

    async fn save_enrollment(
        &mut self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        sqlx::query_as::<_, Enrollment>(
            r#"
            INSERT INTO enrollments (user_id, course_id, status)
            VALUES ($1, $2, 'active')
            ON CONFLICT (user_id, course_id) WHERE status = 'active' DO NOTHING
            RETURNING id, user_id, course_id, enrolled_at, status
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&mut *self.tx)
        .await
    }

    async fn get_user_enrollments(
        &mut self,
        user_id: i64,
    ) -> Result<Vec<EnrolledCourse>, sqlx::Error> {
        sqlx::query_as::<_, EnrolledCourse>(
            r#"
            SELECT e.id, e.user_id, e.course_id, e.enrolled_at, e.status, c.title AS course_title
            FROM enrollments e
            INNER JOIN courses c ON c.id = e.course_id
            WHERE e.user_id = $1
            ORDER BY e.enrolled_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.tx)
        .await
    }
}
