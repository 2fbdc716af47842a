use super::Ctx;
use crate::{
    db::Store,
    error::HttpError,
    models::Enrollment,
};

#[derive(Debug, PartialEq)]
pub enum EnrollOutcome {
    Enrolled(Enrollment),
    /// An active enrollment already existed; nothing was written.
    AlreadyEnrolled,
}

pub async fn enroll<S: Store>(ctx: Ctx<'_, S>, course_id: i64) -> Result<EnrollOutcome, HttpError> {
    let user = ctx.identity.require_authenticated()?;

    ctx.store
        .get_course(course_id)
        .await?
        .ok_or(HttpError::NotFound)?;

    if ctx
        .store
        .get_active_enrollment(user.id, course_id)
        .await?
        .is_some()
    {
        return Ok(EnrollOutcome::AlreadyEnrolled);
    }

    // the partial unique index turns a lost race into `None`
    match ctx.store.save_enrollment(user.id, course_id).await? {
        Some(enrollment) => {
            tracing::info!(user_id = user.id, course_id, "enrolled");
            Ok(EnrollOutcome::Enrolled(enrollment))
        }
        None => Ok(EnrollOutcome::AlreadyEnrolled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{CourseExt, memory::MemoryStore},
        models::{CourseLevel, EnrollmentStatus},
        session::Identity,
        usecase::testing,
    };

    #[tokio::test]
    async fn enrolling_twice_keeps_one_active_row() {
        let mut store = MemoryStore::new();
        let course = store.seed_course("Rust", CourseLevel::Beginner);
        let member = testing::member(&mut store);

        let first = enroll(Ctx::new(&member, &mut store), course.id).await.unwrap();
        assert!(matches!(first, EnrollOutcome::Enrolled(ref e) if e.status == EnrollmentStatus::Active));

        let second = enroll(Ctx::new(&member, &mut store), course.id).await.unwrap();
        assert_eq!(second, EnrollOutcome::AlreadyEnrolled);
        assert_eq!(store.enrollments.len(), 1);
    }

    #[tokio::test]
    async fn store_conflict_reports_already_enrolled() {
        let mut store = MemoryStore::new();
        let course = store.seed_course("Rust", CourseLevel::Beginner);
        let member = testing::member(&mut store);
        let user_id = member.user().unwrap().id;
        // a concurrent request won the insert
        store.save_enrollment(user_id, course.id).await.unwrap();

        assert_eq!(
            store.save_enrollment(user_id, course.id).await.unwrap(),
            None
        );
        let outcome = enroll(Ctx::new(&member, &mut store), course.id).await.unwrap();
        assert_eq!(outcome, EnrollOutcome::AlreadyEnrolled);
    }

    #[tokio::test]
    async fn anonymous_and_missing_course() {
        let mut store = MemoryStore::new();
        let course = store.seed_course("Rust", CourseLevel::Beginner);

        let anon = Identity::Anonymous;
        assert_eq!(
            enroll(Ctx::new(&anon, &mut store), course.id).await.unwrap_err(),
            HttpError::Unauthenticated { next: None }
        );

        let member = testing::member(&mut store);
        assert_eq!(
            enroll(Ctx::new(&member, &mut store), 404).await.unwrap_err(),
            HttpError::NotFound
        );
        assert!(store.enrollments.is_empty());
    }
}
