use serde::Serialize;

use super::Ctx;
use crate::{
    db::Store,
    error::HttpError,
    models::{Certificate, EnrolledCourse, SubmittedApplication},
};

#[derive(Debug, Serialize)]
pub struct MemberDashboard {
    pub enrollments: Vec<EnrolledCourse>,
    pub applications: Vec<SubmittedApplication>,
    pub certificates: Vec<Certificate>,
}

#[derive(Debug)]
pub enum Dashboard {
    /// Admins have their own dashboard.
    Admin,
    Member(MemberDashboard),
}

pub async fn dashboard<S: Store>(ctx: Ctx<'_, S>) -> Result<Dashboard, HttpError> {
    let user = ctx.identity.require_authenticated()?;
    if user.is_admin() {
        return Ok(Dashboard::Admin);
    }

    Ok(Dashboard::Member(MemberDashboard {
        enrollments: ctx.store.get_user_enrollments(user.id).await?,
        applications: ctx.store.get_user_applications(user.id).await?,
        certificates: ctx.store.get_user_certificates(user.id).await?,
    }))
}
