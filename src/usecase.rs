//! One function per user-initiated operation.
//!
//! Every use case receives the resolved identity and the request's store
//! explicitly through [`Ctx`], checks authorization before touching state and
//! reports validation problems and duplicates as values. Only missing entities,
//! failed authorization and infrastructure faults come back as [`HttpError`].
//!
//! [`HttpError`]: crate::error::HttpError

pub mod admin;
pub mod application;
pub mod auth;
pub mod catalog;
pub mod certificate;
pub mod contact;
pub mod dashboard;
pub mod enrollment;
pub mod feedback;
pub mod project;

use crate::{db::Store, forms::FieldErrors, session::Identity};

/// Request-scoped context: who is acting, and the transaction they act in.
pub struct Ctx<'a, S> {
    pub identity: &'a Identity,
    pub store: &'a mut S,
}

impl<'a, S: Store> Ctx<'a, S> {
    pub fn new(identity: &'a Identity, store: &'a mut S) -> Self {
        Ctx { identity, store }
    }
}

/// Result of a form submission.
#[derive(Debug, PartialEq)]
pub enum Submitted<T> {
    Accepted(T),
    Rejected(FieldErrors),
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::{db::memory::MemoryStore, models::UserRole, session::Identity};

    pub fn member(store: &mut MemoryStore) -> Identity {
        Identity::User(store.seed_user("Mia Member", "mia@example.com", UserRole::User))
    }

    pub fn admin(store: &mut MemoryStore) -> Identity {
        Identity::User(store.seed_user("Ann Admin", "ann@example.com", UserRole::Admin))
    }
}
