//! Minimal server-side HTML rendering.
//!
//! Pages are assembled from a title, pending notices, an optional form, some
//! action buttons and a serializable context that is rendered generically.
//! Every piece of dynamic text goes through [`escape`].

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    flash::{self, Notice},
    session::Identity,
};

pub fn escape(raw: &str) -> String {
    ammonia::clean_text(raw)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Text,
    Email,
    Password,
    TextArea,
    Number,
    File,
    Select(Vec<(String, String)>),
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub widget: Widget,
    pub value: String,
    pub error: Option<String>,
}

impl Field {
    pub fn new(name: &'static str, label: &'static str, widget: Widget) -> Self {
        Field {
            name,
            label,
            widget,
            value: String::new(),
            error: None,
        }
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn error(mut self, error: Option<&str>) -> Self {
        self.error = error.map(str::to_string);
        self
    }

    fn render(&self, out: &mut String) {
        let name = self.name;
        out.push_str(&format!(
            r#"<div class="field"><label for="{name}">{}</label>"#,
            escape(self.label)
        ));
        let value = escape(&self.value);
        match &self.widget {
            Widget::Text => out.push_str(&format!(
                r#"<input type="text" id="{name}" name="{name}" value="{value}">"#
            )),
            Widget::Email => out.push_str(&format!(
                r#"<input type="email" id="{name}" name="{name}" value="{value}">"#
            )),
            // never echo a password back
            Widget::Password => out.push_str(&format!(
                r#"<input type="password" id="{name}" name="{name}">"#
            )),
            Widget::Number => out.push_str(&format!(
                r#"<input type="number" step="any" id="{name}" name="{name}" value="{value}">"#
            )),
            Widget::TextArea => out.push_str(&format!(
                r#"<textarea id="{name}" name="{name}">{value}</textarea>"#
            )),
            Widget::File => out.push_str(&format!(
                r#"<input type="file" id="{name}" name="{name}" accept=".pdf,.doc,.docx">"#
            )),
            Widget::Select(options) => {
                out.push_str(&format!(r#"<select id="{name}" name="{name}">"#));
                for (option, label) in options {
                    let selected = if *option == self.value { " selected" } else { "" };
                    out.push_str(&format!(
                        r#"<option value="{}"{selected}>{}</option>"#,
                        escape(option),
                        escape(label)
                    ));
                }
                out.push_str("</select>");
            }
        }
        if let Some(error) = &self.error {
            out.push_str(&format!(r#"<span class="error">{}</span>"#, escape(error)));
        }
        out.push_str("</div>");
    }
}

#[derive(Debug, Clone)]
pub struct FormView {
    pub action: String,
    pub submit: &'static str,
    pub multipart: bool,
    pub fields: Vec<Field>,
}

impl FormView {
    pub fn new(action: impl Into<String>, submit: &'static str) -> Self {
        FormView {
            action: action.into(),
            submit,
            multipart: false,
            fields: Vec::new(),
        }
    }

    pub fn multipart(mut self) -> Self {
        self.multipart = true;
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    fn render(&self, out: &mut String) {
        let enctype = if self.multipart {
            r#" enctype="multipart/form-data""#
        } else {
            ""
        };
        out.push_str(&format!(
            r#"<form method="post" action="{}"{enctype}>"#,
            escape(&self.action)
        ));
        for field in &self.fields {
            field.render(out);
        }
        out.push_str(&format!(
            r#"<button type="submit">{}</button></form>"#,
            escape(self.submit)
        ));
    }
}

/// A link, or a button posting to `href` when `post` is set.
#[derive(Debug, Clone)]
pub struct Action {
    pub label: String,
    pub href: String,
    pub post: bool,
}

impl Action {
    pub fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Action {
            label: label.into(),
            href: href.into(),
            post: false,
        }
    }

    pub fn post(label: impl Into<String>, href: impl Into<String>) -> Self {
        Action {
            label: label.into(),
            href: href.into(),
            post: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    title: String,
    status: StatusCode,
    viewer: Option<(String, bool)>,
    notices: Vec<Notice>,
    form: Option<FormView>,
    actions: Vec<Action>,
    context: Value,
}

impl Page {
    pub fn new(title: impl Into<String>) -> Self {
        Page {
            title: title.into(),
            status: StatusCode::OK,
            viewer: None,
            notices: Vec::new(),
            form: None,
            actions: Vec::new(),
            context: Value::Null,
        }
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Navigation depends on who is looking.
    pub fn viewer(mut self, identity: &Identity) -> Self {
        self.viewer = identity.user().map(|u| (u.name.clone(), u.is_admin()));
        self
    }

    pub fn notice(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }

    pub fn form(mut self, form: FormView) -> Self {
        self.form = Some(form);
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn context(mut self, context: impl Serialize) -> Self {
        self.context = serde_json::to_value(context).unwrap_or_default();
        self
    }

    /// Attach the notice queued by the previous request and consume it.
    pub fn with_flash(self, jar: CookieJar) -> (CookieJar, Page) {
        let (jar, notice) = flash::take(jar);
        let page = match notice {
            Some(notice) => self.notice(notice),
            None => self,
        };
        (jar, page)
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity(2048);
        out.push_str(r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8">"#);
        out.push_str(&format!(
            "<title>{} | BuildMySkillset</title>",
            escape(&self.title)
        ));
        out.push_str(r#"</head><body><nav><a href="/">Home</a> <a href="/courses">Courses</a> <a href="/internships">Internships</a> <a href="/projects">Projects</a> <a href="/verify-certificate">Verify Certificate</a> <a href="/contact">Contact</a>"#);
        match &self.viewer {
            None => out.push_str(r#" <a href="/login">Login</a> <a href="/register">Register</a>"#),
            Some((name, is_admin)) => {
                if *is_admin {
                    out.push_str(r#" <a href="/admin/dashboard">Admin</a>"#);
                }
                out.push_str(&format!(
                    r#" <a href="/dashboard">{}</a> <a href="/feedback">Feedback</a> <a href="/logout">Logout</a>"#,
                    escape(name)
                ));
            }
        }
        out.push_str("</nav><main>");

        for notice in &self.notices {
            let level = match notice.level() {
                flash::Level::Success => "success",
                flash::Level::Info => "info",
                flash::Level::Danger => "danger",
            };
            out.push_str(&format!(
                r#"<div class="alert alert-{level}">{}</div>"#,
                escape(&notice.message())
            ));
        }

        out.push_str(&format!("<h1>{}</h1>", escape(&self.title)));

        if let Some(form) = &self.form {
            form.render(&mut out);
        }

        for action in &self.actions {
            let href = escape(&action.href);
            let label = escape(&action.label);
            if action.post {
                out.push_str(&format!(
                    r#"<form method="post" action="{href}"><button type="submit">{label}</button></form>"#
                ));
            } else {
                out.push_str(&format!(r#"<a class="action" href="{href}">{label}</a>"#));
            }
        }

        if !self.context.is_null() {
            render_value(&mut out, &self.context);
        }

        out.push_str("</main></body></html>");
        out
    }
}

fn render_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push('-'),
        Value::Bool(flag) => out.push_str(if *flag { "yes" } else { "no" }),
        Value::Number(number) => out.push_str(&number.to_string()),
        Value::String(text) => out.push_str(&escape(text)),
        Value::Array(items) if items.is_empty() => out.push_str("<p>Nothing here yet.</p>"),
        Value::Array(items) => {
            out.push_str("<ul>");
            for item in items {
                out.push_str("<li>");
                render_value(out, item);
                out.push_str("</li>");
            }
            out.push_str("</ul>");
        }
        Value::Object(fields) => {
            out.push_str("<dl>");
            for (key, item) in fields {
                out.push_str(&format!("<dt>{}</dt><dd>", escape(key)));
                render_value(out, item);
                out.push_str("</dd>");
            }
            out.push_str("</dl>");
        }
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        (self.status, Html(self.render())).into_response()
    }
}

pub fn not_found() -> Page {
    Page::new("Page Not Found")
        .status(StatusCode::NOT_FOUND)
        .context(json!({ "message": "The page you are looking for does not exist." }))
}

pub fn internal_error() -> Page {
    Page::new("Something Went Wrong")
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .context(json!({ "message": "An unexpected error occurred. Please try again later." }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_context_and_title() {
        let html = Page::new("<b>Title</b>")
            .context(json!({ "message": "<script>alert(1)</script>" }))
            .render();
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>Title</b>"));
    }

    #[test]
    fn password_values_are_not_rendered() {
        let form = FormView::new("/login", "Login")
            .field(Field::new("email", "Email", Widget::Email).value("ada@example.com"))
            .field(Field::new("password", "Password", Widget::Password).value("hunter22"));
        let html = Page::new("Login").form(form).render();
        assert!(!html.contains("hunter22"));
        assert!(html.contains("ada@example.com"));
    }

    #[test]
    fn field_errors_and_selection_render() {
        let field = Field::new("level", "Level", Widget::Select(vec![
            ("beginner".into(), "Beginner".into()),
            ("advanced".into(), "Advanced".into()),
        ]))
        .value("advanced")
        .error(Some("Not a valid choice."));
        let html = Page::new("Add").form(FormView::new("/x", "Save").field(field)).render();
        assert!(html.contains(r#"<option value="advanced" selected>"#));
        assert!(html.contains(r#"class="error""#));
    }

    #[test]
    fn error_pages_carry_status() {
        assert_eq!(not_found().into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            internal_error().into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
