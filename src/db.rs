use serde::Serialize;
use sqlx::{Pool, Postgres, Transaction};

use crate::models::User;

mod user;
pub use user::UserExt;

mod course;
pub use course::CourseExt;

mod internship;
pub use internship::InternshipExt;

mod project;
pub use project::ProjectExt;

mod certificate;
pub use certificate::CertificateExt;

mod feedback;
pub use feedback::FeedbackExt;

mod contact;
pub use contact::ContactExt;

#[cfg(test)]
pub mod memory;


/// Every persistence capability a use case may need.
///
/// Implemented by the request transaction [`DBTx`] and, in tests, by the
/// in-memory store.
pub trait Store:
    UserExt + CourseExt + InternshipExt + ProjectExt + CertificateExt + FeedbackExt + ContactExt
{
}

impl<T> Store for T where
    T: UserExt + CourseExt + InternshipExt + ProjectExt + CertificateExt + FeedbackExt + ContactExt
{
}

#[derive(Debug, Clone)]
pub struct DBClient {
    pool: Pool<Postgres>,
}

impl DBClient {
    pub fn new(pool: Pool<Postgres>) -> Self {
        DBClient { pool }
    }

    /// Open the single transaction a request works in.
    pub async fn begin(&self) -> Result<DBTx, sqlx::Error> {
        let tx = self.pool.begin().await?;
        Ok(DBTx { tx })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Load the user a session cookie points at. Runs outside the request
    /// transaction because identity is resolved before routing.
    pub async fn session_user(&self, user_id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, name, email, phone, password_hash, role, created_at FROM users WHERE id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// A request-scoped transaction. Dropping it without [`DBTx::commit`] rolls
/// back every write made through it.
pub struct DBTx {
    tx: Transaction<'static, Postgres>,
}

impl DBTx {
    pub async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }
}

/// 1-based page selection. Pages below 1 are clamped to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub fn new(page: i64, per_page: i64) -> Self {
        PageRequest {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Parse a `?page=` query value the lenient way: anything unparsable is page 1.
    pub fn from_query(raw: Option<&str>, per_page: i64) -> Self {
        let page = raw.and_then(|p| p.trim().parse::<i64>().ok()).unwrap_or(1);
        PageRequest::new(page, per_page)
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// One page of a listing. Out-of-range pages carry no items but are still valid.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        let pages = (total + request.per_page - 1) / request.per_page;
        Paginated {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
            pages,
        }
    }

    pub fn empty(request: PageRequest) -> Self {
        Paginated::new(Vec::new(), request, 0)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_query_is_lenient() {
        assert_eq!(PageRequest::from_query(None, 9).page, 1);
        assert_eq!(PageRequest::from_query(Some("abc"), 9).page, 1);
        assert_eq!(PageRequest::from_query(Some("-4"), 9).page, 1);
        assert_eq!(PageRequest::from_query(Some("3"), 9).offset(), 18);
    }

    #[test]
    fn pagination_counts_pages() {
        let page: Paginated<i32> = Paginated::new(vec![1, 2], PageRequest::new(2, 9), 11);
        assert_eq!(page.pages, 2);
        assert!(!page.has_next());
        assert!(page.has_prev());

        let beyond: Paginated<i32> = Paginated::new(vec![], PageRequest::new(40, 6), 7);
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.pages, 2);
    }
}
