//! Submitted input for every use case, validated with `validator`.
//!
//! Browser forms deliver every field as text, so inputs keep `String` fields and
//! typed values (level, price, rating, user id) are checked by custom rules and
//! parsed once more when the insert record is built. Each field reports a
//! single message; all failing fields are reported together.

use std::collections::BTreeMap;

use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    models::{CourseLevel, NewContact, NewCourse, NewFeedback, NewInternship, NewProject, User},
    uploads,
    view::{Field, FormView, Widget},
};

pub const REQUIRED: &str = "This field is required.";
pub const EMAIL_TAKEN: &str = "Email already registered.";
pub const NOT_A_CHOICE: &str = "Not a valid choice.";
pub const BAD_RESUME: &str = "Only PDF and DOC files allowed!";

/// Per-field error messages, one per field.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        FieldErrors::default()
    }

    /// Keeps the first message recorded for a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            // presence is reported before any shape or length rule
            let chosen = errs
                .iter()
                .find(|e| e.code == "required")
                .or_else(|| errs.first());
            if let Some(err) = chosen {
                out.add(&field, message_of(err));
            }
        }
        out
    }
}

fn message_of(err: &ValidationError) -> String {
    if let Some(message) = &err.message {
        return message.to_string();
    }
    match err.code.as_ref() {
        "email" => "Invalid email address.".to_string(),
        "must_match" => "Passwords must match.".to_string(),
        _ => "Invalid value.".to_string(),
    }
}

fn check<T: Validate>(input: &T) -> FieldErrors {
    match input.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors.into(),
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| value.to_string())
}

// ============================================================================
// Custom rules
// ============================================================================

fn required(value: &String) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(REQUIRED.into()));
    }
    Ok(())
}

fn not_a_choice() -> ValidationError {
    ValidationError::new("choice").with_message(NOT_A_CHOICE.into())
}

fn known_level(value: &String) -> Result<(), ValidationError> {
    required(value)?;
    value.parse::<CourseLevel>().map(|_| ()).map_err(|_| not_a_choice())
}

fn parse_price(value: &str) -> Result<f64, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0.0);
    }
    let price = value
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or_else(|| {
            ValidationError::new("float").with_message("Not a valid float value.".into())
        })?;
    if price < 0.0 {
        return Err(ValidationError::new("range").with_message("Number must be at least 0.".into()));
    }
    Ok(price)
}

fn non_negative_price(value: &String) -> Result<(), ValidationError> {
    parse_price(value).map(|_| ())
}

fn parse_rating(value: &str) -> Option<i32> {
    value.trim().parse::<i32>().ok().filter(|r| (1..=5).contains(r))
}

fn star_rating(value: &String) -> Result<(), ValidationError> {
    required(value)?;
    parse_rating(value).map(|_| ()).ok_or_else(not_a_choice)
}

fn parse_id(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

fn positive_id(value: &String) -> Result<(), ValidationError> {
    required(value)?;
    parse_id(value).map(|_| ()).ok_or_else(not_a_choice)
}

// ============================================================================
// Identity
// ============================================================================

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct LoginInput {
    #[validate(
        custom(function = "required"),
        email(message = "Invalid email address.")
    )]
    pub email: String,
    #[validate(custom(function = "required"))]
    pub password: String,
}

impl LoginInput {
    pub fn validated(&self) -> Result<(), FieldErrors> {
        check(self).into_result()
    }

    pub fn form(&self, action: &str, errors: &FieldErrors) -> FormView {
        FormView::new(action, "Login")
            .field(
                Field::new("email", "Email", Widget::Email)
                    .value(&self.email)
                    .error(errors.get("email")),
            )
            .field(Field::new("password", "Password", Widget::Password).error(errors.get("password")))
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterInput {
    #[validate(
        custom(function = "required"),
        length(min = 2, max = 100, message = "Field must be between 2 and 100 characters long.")
    )]
    pub name: String,
    #[validate(
        custom(function = "required"),
        email(message = "Invalid email address.")
    )]
    pub email: String,
    #[validate(length(min = 10, max = 20, message = "Field must be between 10 and 20 characters long."))]
    pub phone: String,
    #[validate(
        custom(function = "required"),
        length(min = 6, message = "Field must be at least 6 characters long.")
    )]
    pub password: String,
    #[validate(
        custom(function = "required"),
        must_match(other = "password", message = "Passwords must match.")
    )]
    pub confirm_password: String,
}

/// A registration that passed syntactic validation. Email uniqueness is
/// checked against the store by the use case.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

impl RegisterInput {
    pub fn validated(&self) -> Result<Registration, FieldErrors> {
        check(self).into_result()?;
        Ok(Registration {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: optional(&self.phone),
            password: self.password.clone(),
        })
    }

    pub fn form(&self, errors: &FieldErrors) -> FormView {
        FormView::new("/register", "Register")
            .field(
                Field::new("name", "Full Name", Widget::Text)
                    .value(&self.name)
                    .error(errors.get("name")),
            )
            .field(
                Field::new("email", "Email", Widget::Email)
                    .value(&self.email)
                    .error(errors.get("email")),
            )
            .field(
                Field::new("phone", "Phone Number", Widget::Text)
                    .value(&self.phone)
                    .error(errors.get("phone")),
            )
            .field(Field::new("password", "Password", Widget::Password).error(errors.get("password")))
            .field(
                Field::new("confirm_password", "Confirm Password", Widget::Password)
                    .error(errors.get("confirm_password")),
            )
    }
}

// ============================================================================
// Catalogue administration
// ============================================================================

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct CourseInput {
    #[validate(
        custom(function = "required"),
        length(max = 200, message = "Field cannot be longer than 200 characters.")
    )]
    pub title: String,
    #[validate(custom(function = "required"))]
    pub description: String,
    #[validate(
        custom(function = "required"),
        length(max = 50, message = "Field cannot be longer than 50 characters.")
    )]
    pub duration: String,
    #[validate(custom(function = "known_level"))]
    pub level: String,
    #[validate(custom(function = "non_negative_price"))]
    pub price: String,
}

impl CourseInput {
    pub fn validated(&self) -> Result<NewCourse, FieldErrors> {
        let mut errors = check(self);
        let level = self.level.parse::<CourseLevel>().ok();
        let price = parse_price(&self.price).ok();

        match (level, price) {
            (Some(level), Some(price)) if errors.is_empty() => Ok(NewCourse {
                title: self.title.clone(),
                description: self.description.clone(),
                duration: self.duration.clone(),
                level,
                price,
            }),
            _ => {
                if level.is_none() {
                    errors.add("level", NOT_A_CHOICE);
                }
                Err(errors)
            }
        }
    }

    pub fn form(&self, errors: &FieldErrors) -> FormView {
        let levels = CourseLevel::ALL
            .iter()
            .map(|l| (l.to_str().to_string(), l.label().to_string()))
            .collect();
        FormView::new("/admin/courses/add", "Add Course")
            .field(
                Field::new("title", "Course Title", Widget::Text)
                    .value(&self.title)
                    .error(errors.get("title")),
            )
            .field(
                Field::new("description", "Description", Widget::TextArea)
                    .value(&self.description)
                    .error(errors.get("description")),
            )
            .field(
                Field::new("duration", "Duration", Widget::Text)
                    .value(&self.duration)
                    .error(errors.get("duration")),
            )
            .field(
                Field::new("level", "Level", Widget::Select(levels))
                    .value(&self.level)
                    .error(errors.get("level")),
            )
            .field(
                Field::new("price", "Price", Widget::Number)
                    .value(&self.price)
                    .error(errors.get("price")),
            )
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct InternshipInput {
    #[validate(
        custom(function = "required"),
        length(max = 200, message = "Field cannot be longer than 200 characters.")
    )]
    pub title: String,
    #[validate(custom(function = "required"))]
    pub description: String,
    #[validate(
        custom(function = "required"),
        length(max = 50, message = "Field cannot be longer than 50 characters.")
    )]
    pub duration: String,
    #[validate(custom(function = "required"))]
    pub requirements: String,
    #[validate(length(max = 100, message = "Field cannot be longer than 100 characters."))]
    pub location: String,
    #[validate(length(max = 50, message = "Field cannot be longer than 50 characters."))]
    pub stipend: String,
}

impl InternshipInput {
    pub fn validated(&self) -> Result<NewInternship, FieldErrors> {
        check(self).into_result()?;
        Ok(NewInternship {
            title: self.title.clone(),
            description: self.description.clone(),
            duration: self.duration.clone(),
            requirements: self.requirements.clone(),
            location: optional(&self.location),
            stipend: optional(&self.stipend),
        })
    }

    pub fn form(&self, errors: &FieldErrors) -> FormView {
        FormView::new("/admin/internships/add", "Add Internship")
            .field(
                Field::new("title", "Internship Title", Widget::Text)
                    .value(&self.title)
                    .error(errors.get("title")),
            )
            .field(
                Field::new("description", "Description", Widget::TextArea)
                    .value(&self.description)
                    .error(errors.get("description")),
            )
            .field(
                Field::new("duration", "Duration", Widget::Text)
                    .value(&self.duration)
                    .error(errors.get("duration")),
            )
            .field(
                Field::new("requirements", "Requirements", Widget::TextArea)
                    .value(&self.requirements)
                    .error(errors.get("requirements")),
            )
            .field(
                Field::new("location", "Location", Widget::Text)
                    .value(&self.location)
                    .error(errors.get("location")),
            )
            .field(
                Field::new("stipend", "Stipend", Widget::Text)
                    .value(&self.stipend)
                    .error(errors.get("stipend")),
            )
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct ProjectInput {
    #[validate(
        custom(function = "required"),
        length(max = 200, message = "Field cannot be longer than 200 characters.")
    )]
    pub title: String,
    #[validate(custom(function = "required"))]
    pub description: String,
    #[validate(
        custom(function = "required"),
        length(max = 200, message = "Field cannot be longer than 200 characters.")
    )]
    pub tech_stack: String,
    #[validate(length(max = 50, message = "Field cannot be longer than 50 characters."))]
    pub budget_range: String,
    #[validate(length(max = 50, message = "Field cannot be longer than 50 characters."))]
    pub timeline: String,
}

impl ProjectInput {
    pub fn validated(&self) -> Result<NewProject, FieldErrors> {
        check(self).into_result()?;
        Ok(NewProject {
            title: self.title.clone(),
            description: self.description.clone(),
            tech_stack: self.tech_stack.clone(),
            budget_range: optional(&self.budget_range),
            timeline: optional(&self.timeline),
        })
    }

    pub fn form(&self, errors: &FieldErrors) -> FormView {
        FormView::new("/admin/projects/add", "Add Project")
            .field(
                Field::new("title", "Project Title", Widget::Text)
                    .value(&self.title)
                    .error(errors.get("title")),
            )
            .field(
                Field::new("description", "Description", Widget::TextArea)
                    .value(&self.description)
                    .error(errors.get("description")),
            )
            .field(
                Field::new("tech_stack", "Technology Stack", Widget::Text)
                    .value(&self.tech_stack)
                    .error(errors.get("tech_stack")),
            )
            .field(
                Field::new("budget_range", "Budget Range", Widget::Text)
                    .value(&self.budget_range)
                    .error(errors.get("budget_range")),
            )
            .field(
                Field::new("timeline", "Timeline", Widget::Text)
                    .value(&self.timeline)
                    .error(errors.get("timeline")),
            )
    }
}

// ============================================================================
// Applications
// ============================================================================

/// An uploaded resume as received. `filename` is untrusted.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default, Clone, Validate)]
pub struct ApplicationInput {
    pub resume: Option<ResumeUpload>,
    #[validate(length(max = 1000, message = "Field cannot be longer than 1000 characters."))]
    pub cover_letter: String,
}

impl ApplicationInput {
    /// Returns the cover letter to store, `None` when left blank.
    pub fn validated(&self) -> Result<Option<String>, FieldErrors> {
        let mut errors = check(self);
        if let Some(resume) = &self.resume {
            match uploads::sanitize_filename(&resume.filename) {
                Some(name) if uploads::has_allowed_extension(&name) => {}
                _ => errors.add("resume", BAD_RESUME),
            }
        }
        errors.into_result()?;
        Ok(optional(&self.cover_letter))
    }

    pub fn form(&self, internship_id: i64, errors: &FieldErrors) -> FormView {
        FormView::new(format!("/internships/{internship_id}/apply"), "Submit Application")
            .multipart()
            .field(Field::new("resume", "Resume", Widget::File).error(errors.get("resume")))
            .field(
                Field::new("cover_letter", "Cover Letter", Widget::TextArea)
                    .value(&self.cover_letter)
                    .error(errors.get("cover_letter")),
            )
    }
}

// ============================================================================
// Certificates
// ============================================================================

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct CertificateInput {
    #[validate(custom(function = "positive_id"))]
    pub user_id: String,
    #[validate(
        custom(function = "required"),
        length(max = 200, message = "Field cannot be longer than 200 characters.")
    )]
    pub course_name: String,
}

impl CertificateInput {
    /// Returns `(user_id, course_name)`. Whether the user exists is decided by
    /// the use case against the current user list.
    pub fn validated(&self) -> Result<(i64, String), FieldErrors> {
        let mut errors = check(self);
        match parse_id(&self.user_id) {
            Some(user_id) if errors.is_empty() => Ok((user_id, self.course_name.clone())),
            parsed => {
                if parsed.is_none() {
                    errors.add("user_id", NOT_A_CHOICE);
                }
                Err(errors)
            }
        }
    }

    pub fn form(&self, users: &[User], errors: &FieldErrors) -> FormView {
        let choices = users
            .iter()
            .map(|u| (u.id.to_string(), format!("{} ({})", u.name, u.email)))
            .collect();
        FormView::new("/admin/certificates", "Generate Certificate")
            .field(
                Field::new("user_id", "User", Widget::Select(choices))
                    .value(&self.user_id)
                    .error(errors.get("user_id")),
            )
            .field(
                Field::new("course_name", "Course Name", Widget::Text)
                    .value(&self.course_name)
                    .error(errors.get("course_name")),
            )
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct CertificateVerifyInput {
    #[validate(
        custom(function = "required"),
        length(max = 50, message = "Field cannot be longer than 50 characters.")
    )]
    pub certificate_code: String,
}

impl CertificateVerifyInput {
    /// The code exactly as submitted; lookups are case-sensitive.
    pub fn validated(&self) -> Result<&str, FieldErrors> {
        check(self).into_result()?;
        Ok(&self.certificate_code)
    }

    pub fn form(&self, errors: &FieldErrors) -> FormView {
        FormView::new("/verify-certificate", "Verify").field(
            Field::new("certificate_code", "Certificate Code", Widget::Text)
                .value(&self.certificate_code)
                .error(errors.get("certificate_code")),
        )
    }
}

// ============================================================================
// Feedback and contact
// ============================================================================

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct FeedbackInput {
    #[validate(
        custom(function = "required"),
        length(max = 200, message = "Field cannot be longer than 200 characters.")
    )]
    pub course_name: String,
    #[validate(custom(function = "star_rating"))]
    pub rating: String,
    #[validate(
        custom(function = "required"),
        length(max = 1000, message = "Field cannot be longer than 1000 characters.")
    )]
    pub message: String,
}

impl FeedbackInput {
    pub fn validated(&self, user_id: i64) -> Result<NewFeedback, FieldErrors> {
        let mut errors = check(self);
        match parse_rating(&self.rating) {
            Some(rating) if errors.is_empty() => Ok(NewFeedback {
                user_id,
                course_name: self.course_name.clone(),
                rating,
                message: self.message.clone(),
            }),
            parsed => {
                if parsed.is_none() {
                    errors.add("rating", NOT_A_CHOICE);
                }
                Err(errors)
            }
        }
    }

    pub fn form(&self, errors: &FieldErrors) -> FormView {
        let ratings = (1..=5)
            .rev()
            .map(|n| {
                let label = if n == 1 { "1 Star".to_string() } else { format!("{n} Stars") };
                (n.to_string(), label)
            })
            .collect();
        FormView::new("/feedback", "Submit Feedback")
            .field(
                Field::new("course_name", "Course Name", Widget::Text)
                    .value(&self.course_name)
                    .error(errors.get("course_name")),
            )
            .field(
                Field::new("rating", "Rating", Widget::Select(ratings))
                    .value(&self.rating)
                    .error(errors.get("rating")),
            )
            .field(
                Field::new("message", "Review", Widget::TextArea)
                    .value(&self.message)
                    .error(errors.get("message")),
            )
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct ContactInput {
    #[validate(
        custom(function = "required"),
        length(max = 100, message = "Field cannot be longer than 100 characters.")
    )]
    pub name: String,
    #[validate(
        custom(function = "required"),
        email(message = "Invalid email address.")
    )]
    pub email: String,
    #[validate(
        custom(function = "required"),
        length(max = 200, message = "Field cannot be longer than 200 characters.")
    )]
    pub subject: String,
    #[validate(
        custom(function = "required"),
        length(max = 1000, message = "Field cannot be longer than 1000 characters.")
    )]
    pub message: String,
}

impl ContactInput {
    pub fn validated(&self) -> Result<NewContact, FieldErrors> {
        check(self).into_result()?;
        Ok(NewContact {
            name: self.name.clone(),
            email: self.email.clone(),
            subject: self.subject.clone(),
            message: self.message.clone(),
        })
    }

    pub fn form(&self, errors: &FieldErrors) -> FormView {
        FormView::new("/contact", "Send Message")
            .field(
                Field::new("name", "Name", Widget::Text)
                    .value(&self.name)
                    .error(errors.get("name")),
            )
            .field(
                Field::new("email", "Email", Widget::Email)
                    .value(&self.email)
                    .error(errors.get("email")),
            )
            .field(
                Field::new("subject", "Subject", Widget::Text)
                    .value(&self.subject)
                    .error(errors.get("subject")),
            )
            .field(
                Field::new("message", "Message", Widget::TextArea)
                    .value(&self.message)
                    .error(errors.get("message")),
            )
    }
}
