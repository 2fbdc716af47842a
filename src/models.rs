use std::{fmt, str::FromStr};

use chrono::prelude::*;
use serde::{Deserialize, Serialize};

/// User role for role-based access control.
///
/// Stored in PostgreSQL as the `user_role` ENUM, so an invalid role can never be
/// constructed or persisted.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "course_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    pub const ALL: [CourseLevel; 3] = [
        CourseLevel::Beginner,
        CourseLevel::Intermediate,
        CourseLevel::Advanced,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            CourseLevel::Beginner => "beginner",
            CourseLevel::Intermediate => "intermediate",
            CourseLevel::Advanced => "advanced",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CourseLevel::Beginner => "Beginner",
            CourseLevel::Intermediate => "Intermediate",
            CourseLevel::Advanced => "Advanced",
        }
    }
}

impl FromStr for CourseLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CourseLevel::ALL
            .into_iter()
            .find(|level| level.to_str() == s)
            .ok_or(UnknownVariant)
    }
}

impl fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Returned when a string names no variant of a closed enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownVariant;

// Enrollment and application transitions past creation are modelled but no route
// drives them yet.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "enrollment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "certificate_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    #[default]
    Valid,
    Revoked,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "contact_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    Pending,
    Responded,
    Closed,
}

/// Registered account. `password_hash` is an argon2 PHC string and is never
/// serialized into a page.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub level: CourseLevel,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct Enrollment {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    pub enrolled_at: DateTime<Utc>,
    pub status: EnrollmentStatus,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct Internship {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub requirements: String,
    pub location: Option<String>,
    pub stipend: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// `resume_path` holds the stored file name under the upload directory and is
/// only set when a file was uploaded.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct Application {
    pub id: i64,
    pub user_id: i64,
    pub internship_id: i64,
    pub resume_path: Option<String>,
    pub cover_letter: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub status: ApplicationStatus,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub tech_stack: String,
    pub budget_range: Option<String>,
    pub timeline: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct Certificate {
    pub id: i64,
    pub user_id: i64,
    pub course_name: String,
    pub certificate_code: String,
    pub issue_date: DateTime<Utc>,
    pub status: CertificateStatus,
}

/// Only rows with `approved = true` are ever shown on public pages.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct Feedback {
    pub id: i64,
    pub user_id: i64,
    pub course_name: String,
    pub rating: i32,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub approved: bool,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub status: ContactStatus,
}

// ============================================================================
// Insert records
// ============================================================================

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub level: CourseLevel,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewInternship {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub requirements: String,
    pub location: Option<String>,
    pub stipend: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub user_id: i64,
    pub internship_id: i64,
    pub resume_path: Option<String>,
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub tech_stack: String,
    pub budget_range: Option<String>,
    pub timeline: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCertificate {
    pub user_id: i64,
    pub course_name: String,
    pub certificate_code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedback {
    pub user_id: i64,
    pub course_name: String,
    pub rating: i32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

// ============================================================================
// Joined read models
// ============================================================================

#[derive(Debug, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct EnrolledCourse {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub course_title: String,
}

#[derive(Debug, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct SubmittedApplication {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub application: Application,
    pub internship_title: String,
}

#[derive(Debug, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct FeedbackEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub feedback: Feedback,
    pub author_name: String,
}

#[derive(Debug, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct IssuedCertificate {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub certificate: Certificate,
    pub holder_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_level_parses_only_known_values() {
        assert_eq!("beginner".parse(), Ok(CourseLevel::Beginner));
        assert_eq!("advanced".parse(), Ok(CourseLevel::Advanced));
        assert_eq!("Advanced".parse::<CourseLevel>(), Err(UnknownVariant));
        assert_eq!("expert".parse::<CourseLevel>(), Err(UnknownVariant));
    }

    #[test]
    fn role_defaults_to_user() {
        assert_eq!(UserRole::default(), UserRole::User);
        assert_eq!(UserRole::Admin.to_str(), "admin");
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let user = User {
            id: 1,
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: None,
            password_hash: "$argon2id$secret".into(),
            role: UserRole::User,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("\"role\":\"user\""));
    }
}
