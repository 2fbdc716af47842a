//! One-shot notices carried across a redirect in the `flash` cookie.
//!
//! Only a short key (plus an optional argument) is stored client side; the text
//! is looked up when the next page renders, so a tampered cookie can at worst
//! select another canned message.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    LoginRequired,
    AccessDenied,
    LoginSuccessful,
    InvalidCredentials,
    Registered,
    LoggedOut,
    Enrolled,
    AlreadyEnrolled,
    ApplicationSubmitted,
    AlreadyApplied,
    ProjectRequested,
    CertificateNotFound,
    CertificateIssued(String),
    FeedbackReceived,
    FeedbackApproved,
    MessageSent,
    CourseAdded,
    InternshipAdded,
    ProjectAdded,
}

impl Notice {
    pub fn level(&self) -> Level {
        match self {
            Notice::LoginRequired
            | Notice::LoggedOut
            | Notice::AlreadyEnrolled
            | Notice::AlreadyApplied => Level::Info,
            Notice::AccessDenied | Notice::InvalidCredentials | Notice::CertificateNotFound => {
                Level::Danger
            }
            _ => Level::Success,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Notice::LoginRequired => "Please log in to access this page.".into(),
            Notice::AccessDenied => "Access denied.".into(),
            Notice::LoginSuccessful => "Login successful!".into(),
            Notice::InvalidCredentials => "Invalid email or password.".into(),
            Notice::Registered => "Registration successful! Please log in.".into(),
            Notice::LoggedOut => "You have been logged out.".into(),
            Notice::Enrolled => "Successfully enrolled in the course!".into(),
            Notice::AlreadyEnrolled => "You are already enrolled in this course.".into(),
            Notice::ApplicationSubmitted => "Application submitted successfully!".into(),
            Notice::AlreadyApplied => "You have already applied for this internship.".into(),
            Notice::ProjectRequested => {
                "Project request sent successfully! We will contact you soon.".into()
            }
            Notice::CertificateNotFound => {
                "Certificate not found. Please check the code and try again.".into()
            }
            Notice::CertificateIssued(code) => {
                format!("Certificate generated successfully! Code: {code}")
            }
            Notice::FeedbackReceived => {
                "Thank you for your feedback! It will be reviewed before being published.".into()
            }
            Notice::FeedbackApproved => "Feedback approved successfully!".into(),
            Notice::MessageSent => {
                "Your message has been sent successfully! We will get back to you soon.".into()
            }
            Notice::CourseAdded => "Course added successfully!".into(),
            Notice::InternshipAdded => "Internship added successfully!".into(),
            Notice::ProjectAdded => "Project added successfully!".into(),
        }
    }

    fn key(&self) -> &'static str {
        match self {
            Notice::LoginRequired => "login_required",
            Notice::AccessDenied => "access_denied",
            Notice::LoginSuccessful => "login_successful",
            Notice::InvalidCredentials => "invalid_credentials",
            Notice::Registered => "registered",
            Notice::LoggedOut => "logged_out",
            Notice::Enrolled => "enrolled",
            Notice::AlreadyEnrolled => "already_enrolled",
            Notice::ApplicationSubmitted => "application_submitted",
            Notice::AlreadyApplied => "already_applied",
            Notice::ProjectRequested => "project_requested",
            Notice::CertificateNotFound => "certificate_not_found",
            Notice::CertificateIssued(_) => "certificate_issued",
            Notice::FeedbackReceived => "feedback_received",
            Notice::FeedbackApproved => "feedback_approved",
            Notice::MessageSent => "message_sent",
            Notice::CourseAdded => "course_added",
            Notice::InternshipAdded => "internship_added",
            Notice::ProjectAdded => "project_added",
        }
    }

    /// Cookie representation: `key` or `key:argument`.
    pub fn encode(&self) -> String {
        match self {
            Notice::CertificateIssued(code) => format!("{}:{}", self.key(), code),
            other => other.key().to_string(),
        }
    }

    pub fn decode(raw: &str) -> Option<Notice> {
        let (key, arg) = match raw.split_once(':') {
            Some((key, arg)) => (key, Some(arg)),
            None => (raw, None),
        };

        let notice = match (key, arg) {
            ("certificate_issued", Some(code)) if is_cookie_safe(code) => {
                Notice::CertificateIssued(code.to_string())
            }
            (_, Some(_)) => return None,
            ("login_required", None) => Notice::LoginRequired,
            ("access_denied", None) => Notice::AccessDenied,
            ("login_successful", None) => Notice::LoginSuccessful,
            ("invalid_credentials", None) => Notice::InvalidCredentials,
            ("registered", None) => Notice::Registered,
            ("logged_out", None) => Notice::LoggedOut,
            ("enrolled", None) => Notice::Enrolled,
            ("already_enrolled", None) => Notice::AlreadyEnrolled,
            ("application_submitted", None) => Notice::ApplicationSubmitted,
            ("already_applied", None) => Notice::AlreadyApplied,
            ("project_requested", None) => Notice::ProjectRequested,
            ("certificate_not_found", None) => Notice::CertificateNotFound,
            ("feedback_received", None) => Notice::FeedbackReceived,
            ("feedback_approved", None) => Notice::FeedbackApproved,
            ("message_sent", None) => Notice::MessageSent,
            ("course_added", None) => Notice::CourseAdded,
            ("internship_added", None) => Notice::InternshipAdded,
            ("project_added", None) => Notice::ProjectAdded,
            _ => return None,
        };
        Some(notice)
    }
}

fn is_cookie_safe(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Queue a notice for the next rendered page.
pub fn push(jar: CookieJar, notice: Notice) -> CookieJar {
    let cookie = Cookie::build((FLASH_COOKIE, notice.encode()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Consume the pending notice, if any. Unknown values are dropped silently.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Notice>) {
    let Some(raw) = jar.get(FLASH_COOKIE).map(|c| c.value().to_string()) else {
        return (jar, None);
    };
    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    (jar, Notice::decode(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_and_decodes_argument() {
        let notice = Notice::CertificateIssued("BMS-0A1B2C3D".into());
        assert_eq!(notice.encode(), "certificate_issued:BMS-0A1B2C3D");
        assert_eq!(Notice::decode(&notice.encode()), Some(notice));
        assert_eq!(Notice::decode("enrolled"), Some(Notice::Enrolled));
    }

    #[test]
    fn rejects_unknown_or_malformed() {
        assert_eq!(Notice::decode("nope"), None);
        assert_eq!(Notice::decode("enrolled:extra"), None);
        assert_eq!(Notice::decode("certificate_issued:<script>"), None);
    }

    #[test]
    fn take_consumes_cookie() {
        let jar = push(CookieJar::new(), Notice::AlreadyEnrolled);
        let (jar, notice) = take(jar);
        assert_eq!(notice, Some(Notice::AlreadyEnrolled));
        assert_eq!(notice.map(|n| n.level()), Some(Level::Info));
        assert!(jar.get(FLASH_COOKIE).is_none());
    }
}
