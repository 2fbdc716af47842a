pub mod admin;
pub mod auth;
pub mod catalog;
pub mod member;
pub mod public;

use axum::response::Redirect;
use axum_extra::extract::cookie::CookieJar;

use crate::{
    error::HttpError,
    flash::{self, Notice},
};

/// Path ids that are not positive integers name nothing.
pub fn parse_id(raw: &str) -> Result<i64, HttpError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(HttpError::NotFound)
}

/// Post/redirect/get with a notice for the next page.
pub fn redirect_with(jar: CookieJar, notice: Notice, to: &str) -> (CookieJar, Redirect) {
    (flash::push(jar, notice), Redirect::to(to))
}
