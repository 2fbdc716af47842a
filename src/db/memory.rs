//! In-memory store used by use case tests. Mirrors the uniqueness rules of the
//! PostgreSQL schema so conflict handling can be exercised without a database.

use chrono::Utc;

use super::{
    CertificateExt, ContactExt, CourseExt, FeedbackExt, InternshipExt, PageRequest, Paginated,
    ProjectExt, UserExt,
};
use crate::models::*;

#[derive(Debug, Default)]
pub struct MemoryStore {
    pub users: Vec<User>,
    pub courses: Vec<Course>,
    pub enrollments: Vec<Enrollment>,
    pub internships: Vec<Internship>,
    pub applications: Vec<Application>,
    pub projects: Vec<Project>,
    pub certificates: Vec<Certificate>,
    pub feedback: Vec<Feedback>,
    pub contacts: Vec<Contact>,
}

fn next_id(len: usize) -> i64 {
    len as i64 + 1
}

fn page_of<T: Clone>(rows: Vec<T>, page: PageRequest) -> Paginated<T> {
    let total = rows.len() as i64;
    let items = rows
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.per_page as usize)
        .collect();
    Paginated::new(items, page, total)
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Insert a user with a placeholder hash and return it.
    pub fn seed_user(&mut self, name: &str, email: &str, role: UserRole) -> User {
        let user = User {
            id: next_id(self.users.len()),
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
        };
        self.users.push(user.clone());
        user
    }

    pub fn seed_course(&mut self, title: &str, level: CourseLevel) -> Course {
        let course = Course {
            id: next_id(self.courses.len()),
            title: title.to_string(),
            description: format!("About {title}"),
            duration: "8 weeks".to_string(),
            level,
            price: 0.0,
            created_at: Utc::now(),
        };
        self.courses.push(course.clone());
        course
    }

    pub fn seed_internship(&mut self, title: &str) -> Internship {
        let internship = Internship {
            id: next_id(self.internships.len()),
            title: title.to_string(),
            description: format!("About {title}"),
            duration: "3 months".to_string(),
            requirements: "Curiosity".to_string(),
            location: None,
            stipend: None,
            created_at: Utc::now(),
        };
        self.internships.push(internship.clone());
        internship
    }

    pub fn seed_project(&mut self, title: &str) -> Project {
        let project = Project {
            id: next_id(self.projects.len()),
            title: title.to_string(),
            description: format!("About {title}"),
            tech_stack: "Rust".to_string(),
            budget_range: None,
            timeline: None,
            created_at: Utc::now(),
        };
        self.projects.push(project.clone());
        project
    }

    fn holder_name(&self, user_id: i64) -> String {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.name.clone())
            .unwrap_or_default()
    }
}

impl UserExt for MemoryStore {
    async fn get_user(
        &mut self,
        user_id: Option<i64>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let found = match (user_id, email) {
            (Some(id), _) => self.users.iter().find(|u| u.id == id),
            (None, Some(email)) => self.users.iter().find(|u| u.email == email),
            (None, None) => None,
        };
        Ok(found.cloned())
    }

    async fn get_users(&mut self) -> Result<Vec<User>, sqlx::Error> {
        Ok(self.users.clone())
    }

    async fn save_user(&mut self, user: &NewUser) -> Result<Option<User>, sqlx::Error> {
        if self.users.iter().any(|u| u.email == user.email) {
            return Ok(None);
        }
        let saved = User {
            id: next_id(self.users.len()),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            created_at: Utc::now(),
        };
        self.users.push(saved.clone());
        Ok(Some(saved))
    }

    async fn get_user_count(&mut self) -> Result<i64, sqlx::Error> {
        Ok(self.users.len() as i64)
    }
}

impl CourseExt for MemoryStore {
    async fn get_course(&mut self, course_id: i64) -> Result<Option<Course>, sqlx::Error> {
        Ok(self.courses.iter().find(|c| c.id == course_id).cloned())
    }

    async fn get_courses(
        &mut self,
        level: Option<CourseLevel>,
        page: PageRequest,
    ) -> Result<Paginated<Course>, sqlx::Error> {
        let rows = self
            .courses
            .iter()
            .filter(|c| level.is_none_or(|l| c.level == l))
            .cloned()
            .collect();
        Ok(page_of(rows, page))
    }

    async fn sample_courses(&mut self, limit: i64) -> Result<Vec<Course>, sqlx::Error> {
        Ok(self.courses.iter().take(limit as usize).cloned().collect())
    }

    async fn all_courses(&mut self) -> Result<Vec<Course>, sqlx::Error> {
        Ok(self.courses.clone())
    }

    async fn save_course(&mut self, course: &NewCourse) -> Result<Course, sqlx::Error> {
        let saved = Course {
            id: next_id(self.courses.len()),
            title: course.title.clone(),
            description: course.description.clone(),
            duration: course.duration.clone(),
            level: course.level,
            price: course.price,
            created_at: Utc::now(),
        };
        self.courses.push(saved.clone());
        Ok(saved)
    }

    async fn get_course_count(&mut self) -> Result<i64, sqlx::Error> {
        Ok(self.courses.len() as i64)
    }

    async fn get_active_enrollment(
        &mut self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        Ok(self
            .enrollments
            .iter()
            .find(|e| {
                e.user_id == user_id
                    && e.course_id == course_id
                    && e.status == EnrollmentStatus::Active
            })
            .cloned())
    }

    async fn save_enrollment(
        &mut self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        if self.get_active_enrollment(user_id, course_id).await?.is_some() {
            return Ok(None);
        }
        let saved = Enrollment {
            id: next_id(self.enrollments.len()),
            user_id,
            course_id,
            enrolled_at: Utc::now(),
            status: EnrollmentStatus::Active,
        };
        self.enrollments.push(saved.clone());
        Ok(Some(saved))
    }

    async fn get_user_enrollments(
        &mut self,
        user_id: i64,
    ) -> Result<Vec<EnrolledCourse>, sqlx::Error> {
        Ok(self
            .enrollments
            .iter()
            .filter(|e| e.user_id == user_id)
            .filter_map(|e| {
                let course = self.courses.iter().find(|c| c.id == e.course_id)?;
                Some(EnrolledCourse {
                    enrollment: e.clone(),
                    course_title: course.title.clone(),
                })
            })
            .collect())
    }
}

impl InternshipExt for MemoryStore {
    async fn get_internship(
        &mut self,
        internship_id: i64,
    ) -> Result<Option<Internship>, sqlx::Error> {
        Ok(self
            .internships
            .iter()
            .find(|i| i.id == internship_id)
            .cloned())
    }

    async fn get_internships(
        &mut self,
        page: PageRequest,
    ) -> Result<Paginated<Internship>, sqlx::Error> {
        Ok(page_of(self.internships.clone(), page))
    }

    async fn sample_internships(&mut self, limit: i64) -> Result<Vec<Internship>, sqlx::Error> {
        Ok(self
            .internships
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn all_internships(&mut self) -> Result<Vec<Internship>, sqlx::Error> {
        Ok(self.internships.clone())
    }

    async fn save_internship(
        &mut self,
        internship: &NewInternship,
    ) -> Result<Internship, sqlx::Error> {
        let saved = Internship {
            id: next_id(self.internships.len()),
            title: internship.title.clone(),
            description: internship.description.clone(),
            duration: internship.duration.clone(),
            requirements: internship.requirements.clone(),
            location: internship.location.clone(),
            stipend: internship.stipend.clone(),
            created_at: Utc::now(),
        };
        self.internships.push(saved.clone());
        Ok(saved)
    }

    async fn get_internship_count(&mut self) -> Result<i64, sqlx::Error> {
        Ok(self.internships.len() as i64)
    }

    async fn get_application(
        &mut self,
        user_id: i64,
        internship_id: i64,
    ) -> Result<Option<Application>, sqlx::Error> {
        Ok(self
            .applications
            .iter()
            .find(|a| a.user_id == user_id && a.internship_id == internship_id)
            .cloned())
    }

    async fn save_application(
        &mut self,
        application: &NewApplication,
    ) -> Result<Option<Application>, sqlx::Error> {
        if self
            .get_application(application.user_id, application.internship_id)
            .await?
            .is_some()
        {
            return Ok(None);
        }
        let saved = Application {
            id: next_id(self.applications.len()),
            user_id: application.user_id,
            internship_id: application.internship_id,
            resume_path: application.resume_path.clone(),
            cover_letter: application.cover_letter.clone(),
            applied_at: Utc::now(),
            status: ApplicationStatus::Pending,
        };
        self.applications.push(saved.clone());
        Ok(Some(saved))
    }

    async fn get_user_applications(
        &mut self,
        user_id: i64,
    ) -> Result<Vec<SubmittedApplication>, sqlx::Error> {
        Ok(self
            .applications
            .iter()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| {
                let internship = self.internships.iter().find(|i| i.id == a.internship_id)?;
                Some(SubmittedApplication {
                    application: a.clone(),
                    internship_title: internship.title.clone(),
                })
            })
            .collect())
    }

    async fn get_application_count(&mut self) -> Result<i64, sqlx::Error> {
        Ok(self.applications.len() as i64)
    }
}

impl ProjectExt for MemoryStore {
    async fn get_project(&mut self, project_id: i64) -> Result<Option<Project>, sqlx::Error> {
        Ok(self.projects.iter().find(|p| p.id == project_id).cloned())
    }

    async fn get_projects(
        &mut self,
        page: PageRequest,
    ) -> Result<Paginated<Project>, sqlx::Error> {
        Ok(page_of(self.projects.clone(), page))
    }

    async fn sample_projects(&mut self, limit: i64) -> Result<Vec<Project>, sqlx::Error> {
        Ok(self.projects.iter().take(limit as usize).cloned().collect())
    }

    async fn all_projects(&mut self) -> Result<Vec<Project>, sqlx::Error> {
        Ok(self.projects.clone())
    }

    async fn save_project(&mut self, project: &NewProject) -> Result<Project, sqlx::Error> {
        let saved = Project {
            id: next_id(self.projects.len()),
            title: project.title.clone(),
            description: project.description.clone(),
            tech_stack: project.tech_stack.clone(),
            budget_range: project.budget_range.clone(),
            timeline: project.timeline.clone(),
            created_at: Utc::now(),
        };
        self.projects.push(saved.clone());
        Ok(saved)
    }
}

impl CertificateExt for MemoryStore {
    async fn save_certificate(
        &mut self,
        certificate: &NewCertificate,
    ) -> Result<Option<Certificate>, sqlx::Error> {
        if self
            .certificates
            .iter()
            .any(|c| c.certificate_code == certificate.certificate_code)
        {
            return Ok(None);
        }
        let saved = Certificate {
            id: next_id(self.certificates.len()),
            user_id: certificate.user_id,
            course_name: certificate.course_name.clone(),
            certificate_code: certificate.certificate_code.clone(),
            issue_date: Utc::now(),
            status: CertificateStatus::Valid,
        };
        self.certificates.push(saved.clone());
        Ok(Some(saved))
    }

    async fn get_certificate_by_code(
        &mut self,
        code: &str,
    ) -> Result<Option<IssuedCertificate>, sqlx::Error> {
        Ok(self
            .certificates
            .iter()
            .find(|c| c.certificate_code == code)
            .map(|c| IssuedCertificate {
                certificate: c.clone(),
                holder_name: self.holder_name(c.user_id),
            }))
    }

    async fn get_certificates(&mut self) -> Result<Vec<IssuedCertificate>, sqlx::Error> {
        Ok(self
            .certificates
            .iter()
            .rev()
            .map(|c| IssuedCertificate {
                certificate: c.clone(),
                holder_name: self.holder_name(c.user_id),
            })
            .collect())
    }

    async fn get_user_certificates(
        &mut self,
        user_id: i64,
    ) -> Result<Vec<Certificate>, sqlx::Error> {
        Ok(self
            .certificates
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }
}

impl FeedbackExt for MemoryStore {
    async fn save_feedback(&mut self, feedback: &NewFeedback) -> Result<Feedback, sqlx::Error> {
        let saved = Feedback {
            id: next_id(self.feedback.len()),
            user_id: feedback.user_id,
            course_name: feedback.course_name.clone(),
            rating: feedback.rating,
            message: feedback.message.clone(),
            created_at: Utc::now(),
            approved: false,
        };
        self.feedback.push(saved.clone());
        Ok(saved)
    }

    async fn get_feedback(&mut self, feedback_id: i64) -> Result<Option<Feedback>, sqlx::Error> {
        Ok(self.feedback.iter().find(|f| f.id == feedback_id).cloned())
    }

    async fn get_feedback_entries(
        &mut self,
        approved: bool,
        limit: Option<i64>,
    ) -> Result<Vec<FeedbackEntry>, sqlx::Error> {
        let limit = limit.map_or(usize::MAX, |l| l as usize);
        Ok(self
            .feedback
            .iter()
            .rev()
            .filter(|f| f.approved == approved)
            .take(limit)
            .map(|f| FeedbackEntry {
                feedback: f.clone(),
                author_name: self.holder_name(f.user_id),
            })
            .collect())
    }

    async fn approve_feedback(
        &mut self,
        feedback_id: i64,
    ) -> Result<Option<Feedback>, sqlx::Error> {
        Ok(self
            .feedback
            .iter_mut()
            .find(|f| f.id == feedback_id)
            .map(|f| {
                f.approved = true;
                f.clone()
            }))
    }

    async fn get_pending_feedback_count(&mut self) -> Result<i64, sqlx::Error> {
        Ok(self.feedback.iter().filter(|f| !f.approved).count() as i64)
    }
}

impl ContactExt for MemoryStore {
    async fn save_contact(&mut self, contact: &NewContact) -> Result<Contact, sqlx::Error> {
        let saved = Contact {
            id: next_id(self.contacts.len()),
            name: contact.name.clone(),
            email: contact.email.clone(),
            subject: contact.subject.clone(),
            message: contact.message.clone(),
            created_at: Utc::now(),
            status: ContactStatus::Pending,
        };
        self.contacts.push(saved.clone());
        Ok(saved)
    }

    async fn get_pending_contact_count(&mut self) -> Result<i64, sqlx::Error> {
        Ok(self
            .contacts
            .iter()
            .filter(|c| c.status == ContactStatus::Pending)
            .count() as i64)
    }
}
