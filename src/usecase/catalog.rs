use serde::Serialize;

use super::Ctx;
use crate::{
    db::{PageRequest, Paginated, Store},
    error::HttpError,
    models::{Course, CourseLevel, FeedbackEntry, Internship, Project},
};

pub const COURSES_PER_PAGE: i64 = 9;
pub const INTERNSHIPS_PER_PAGE: i64 = 6;
pub const PROJECTS_PER_PAGE: i64 = 6;

#[derive(Debug, Serialize)]
pub struct HomeView {
    pub courses: Vec<Course>,
    pub internships: Vec<Internship>,
    pub projects: Vec<Project>,
    pub feedback: Vec<FeedbackEntry>,
}

/// Landing page samples. Only approved feedback is ever included.
pub async fn home<S: Store>(ctx: Ctx<'_, S>) -> Result<HomeView, HttpError> {
    Ok(HomeView {
        courses: ctx.store.sample_courses(6).await?,
        internships: ctx.store.sample_internships(3).await?,
        projects: ctx.store.sample_projects(3).await?,
        feedback: ctx.store.get_feedback_entries(true, Some(4)).await?,
    })
}

#[derive(Debug, Serialize)]
pub struct CourseListing {
    pub courses: Paginated<Course>,
    pub selected_level: String,
}

/// An unknown level matches nothing, so it yields an empty page rather than an error.
pub async fn list_courses<S: Store>(
    ctx: Ctx<'_, S>,
    page: Option<&str>,
    level: Option<&str>,
) -> Result<CourseListing, HttpError> {
    let request = PageRequest::from_query(page, COURSES_PER_PAGE);
    let selected_level = level.unwrap_or_default().to_string();

    let courses = if selected_level.is_empty() {
        ctx.store.get_courses(None, request).await?
    } else {
        match selected_level.parse::<CourseLevel>() {
            Ok(level) => ctx.store.get_courses(Some(level), request).await?,
            Err(_) => Paginated::empty(request),
        }
    };

    Ok(CourseListing {
        courses,
        selected_level,
    })
}

#[derive(Debug, Serialize)]
pub struct CourseDetail {
    pub course: Course,
    pub is_enrolled: bool,
}

pub async fn course_detail<S: Store>(
    ctx: Ctx<'_, S>,
    course_id: i64,
) -> Result<CourseDetail, HttpError> {
    let course = ctx
        .store
        .get_course(course_id)
        .await?
        .ok_or(HttpError::NotFound)?;

    let is_enrolled = match ctx.identity.user() {
        Some(user) => ctx
            .store
            .get_active_enrollment(user.id, course_id)
            .await?
            .is_some(),
        None => false,
    };

    Ok(CourseDetail {
        course,
        is_enrolled,
    })
}

pub async fn list_internships<S: Store>(
    ctx: Ctx<'_, S>,
    page: Option<&str>,
) -> Result<Paginated<Internship>, HttpError> {
    let request = PageRequest::from_query(page, INTERNSHIPS_PER_PAGE);
    Ok(ctx.store.get_internships(request).await?)
}

#[derive(Debug, Serialize)]
pub struct InternshipDetail {
    pub internship: Internship,
    pub has_applied: bool,
}

pub async fn internship_detail<S: Store>(
    ctx: Ctx<'_, S>,
    internship_id: i64,
) -> Result<InternshipDetail, HttpError> {
    let internship = ctx
        .store
        .get_internship(internship_id)
        .await?
        .ok_or(HttpError::NotFound)?;

    let has_applied = match ctx.identity.user() {
        Some(user) => ctx
            .store
            .get_application(user.id, internship_id)
            .await?
            .is_some(),
        None => false,
    };

    Ok(InternshipDetail {
        internship,
        has_applied,
    })
}

pub async fn list_projects<S: Store>(
    ctx: Ctx<'_, S>,
    page: Option<&str>,
) -> Result<Paginated<Project>, HttpError> {
    let request = PageRequest::from_query(page, PROJECTS_PER_PAGE);
    Ok(ctx.store.get_projects(request).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{FeedbackExt, memory::MemoryStore},
        models::NewFeedback,
        session::Identity,
        usecase::testing,
    };

    #[tokio::test]
    async fn course_pages_hold_nine_and_overflow_is_empty() {
        let mut store = MemoryStore::new();
        for n in 0..11 {
            store.seed_course(&format!("Course {n}"), CourseLevel::Beginner);
        }
        let anon = Identity::Anonymous;

        let first = list_courses(Ctx::new(&anon, &mut store), None, None).await.unwrap();
        assert_eq!(first.courses.items.len(), 9);
        assert_eq!(first.courses.pages, 2);

        let second = list_courses(Ctx::new(&anon, &mut store), Some("2"), None).await.unwrap();
        assert_eq!(second.courses.items.len(), 2);

        let beyond = list_courses(Ctx::new(&anon, &mut store), Some("7"), None).await.unwrap();
        assert!(beyond.courses.items.is_empty());
        assert_eq!(beyond.courses.page, 7);

        let garbage = list_courses(Ctx::new(&anon, &mut store), Some("x"), None).await.unwrap();
        assert_eq!(garbage.courses.page, 1);
    }

    #[tokio::test]
    async fn level_filter() {
        let mut store = MemoryStore::new();
        store.seed_course("Intro", CourseLevel::Beginner);
        store.seed_course("Deep Dive", CourseLevel::Advanced);
        let anon = Identity::Anonymous;

        let advanced = list_courses(Ctx::new(&anon, &mut store), None, Some("advanced"))
            .await
            .unwrap();
        assert_eq!(advanced.courses.items.len(), 1);
        assert_eq!(advanced.courses.items[0].title, "Deep Dive");

        let unknown = list_courses(Ctx::new(&anon, &mut store), None, Some("expert"))
            .await
            .unwrap();
        assert!(unknown.courses.items.is_empty());
        assert_eq!(unknown.selected_level, "expert");
    }

    #[tokio::test]
    async fn home_shows_only_approved_feedback() {
        let mut store = MemoryStore::new();
        let member = testing::member(&mut store);
        let user_id = member.user().unwrap().id;
        for approved in [true, false, true] {
            let saved = store
                .save_feedback(&NewFeedback {
                    user_id,
                    course_name: "Rust".into(),
                    rating: 5,
                    message: "Great".into(),
                })
                .await
                .unwrap();
            if approved {
                store.approve_feedback(saved.id).await.unwrap();
            }
        }

        let view = home(Ctx::new(&member, &mut store)).await.unwrap();
        assert_eq!(view.feedback.len(), 2);
        assert!(view.feedback.iter().all(|f| f.feedback.approved));
        assert_eq!(view.feedback[0].author_name, "Mia Member");
    }

    #[tokio::test]
    async fn missing_detail_is_not_found() {
        let mut store = MemoryStore::new();
        let anon = Identity::Anonymous;
        assert_eq!(
            course_detail(Ctx::new(&anon, &mut store), 99).await.unwrap_err(),
            HttpError::NotFound
        );
        assert_eq!(
            internship_detail(Ctx::new(&anon, &mut store), 99)
                .await
                .unwrap_err(),
            HttpError::NotFound
        );
    }
}
