use serde::Serialize;
use uuid::Uuid;

use super::{Ctx, Submitted};
use crate::{
    db::Store,
    error::HttpError,
    forms::{CertificateInput, CertificateVerifyInput, FieldErrors, NOT_A_CHOICE},
    models::{Certificate, IssuedCertificate, NewCertificate, User, UserRole},
};

const MAX_CODE_ATTEMPTS: usize = 5;

/// `BMS-` followed by 8 uppercase hex digits from a random UUID.
pub fn generate_certificate_code() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("BMS-{}", hex[..8].to_uppercase())
}

#[derive(Debug, Serialize)]
pub struct CertificateDesk {
    #[serde(skip)]
    pub users: Vec<User>,
    pub certificates: Vec<IssuedCertificate>,
}

/// Admin view: every user as a recipient choice and every issued certificate.
pub async fn certificate_desk<S: Store>(ctx: Ctx<'_, S>) -> Result<CertificateDesk, HttpError> {
    ctx.identity.require_role(UserRole::Admin)?;

    Ok(CertificateDesk {
        users: ctx.store.get_users().await?,
        certificates: ctx.store.get_certificates().await?,
    })
}

pub async fn issue_certificate<S: Store>(
    ctx: Ctx<'_, S>,
    input: &CertificateInput,
) -> Result<Submitted<Certificate>, HttpError> {
    issue_with_codes(ctx, input, generate_certificate_code).await
}

async fn issue_with_codes<S: Store>(
    ctx: Ctx<'_, S>,
    input: &CertificateInput,
    mut next_code: impl FnMut() -> String,
) -> Result<Submitted<Certificate>, HttpError> {
    let admin = ctx.identity.require_role(UserRole::Admin)?;

    let (user_id, course_name) = match input.validated() {
        Ok(valid) => valid,
        Err(errors) => return Ok(Submitted::Rejected(errors)),
    };

    // the choice set is the current user list
    let users = ctx.store.get_users().await?;
    if !users.iter().any(|u| u.id == user_id) {
        let mut errors = FieldErrors::new();
        errors.add("user_id", NOT_A_CHOICE);
        return Ok(Submitted::Rejected(errors));
    }

    for attempt in 1..=MAX_CODE_ATTEMPTS {
        let new_certificate = NewCertificate {
            user_id,
            course_name: course_name.clone(),
            certificate_code: next_code(),
        };
        if let Some(certificate) = ctx.store.save_certificate(&new_certificate).await? {
            tracing::info!(
                admin_id = admin.id,
                user_id,
                code = %certificate.certificate_code,
                "certificate issued"
            );
            return Ok(Submitted::Accepted(certificate));
        }
        tracing::warn!(attempt, "certificate code collision, regenerating");
    }

    Err(HttpError::server_error(format!(
        "no unique certificate code after {MAX_CODE_ATTEMPTS} attempts"
    )))
}

#[derive(Debug, PartialEq)]
pub enum Verification {
    Found(IssuedCertificate),
    NotFound,
    Invalid(FieldErrors),
}

/// Public lookup by exact code. An unknown code is an ordinary outcome.
pub async fn verify_certificate<S: Store>(
    ctx: Ctx<'_, S>,
    input: &CertificateVerifyInput,
) -> Result<Verification, HttpError> {
    let code = match input.validated() {
        Ok(code) => code,
        Err(errors) => return Ok(Verification::Invalid(errors)),
    };

    Ok(match ctx.store.get_certificate_by_code(code).await? {
        Some(certificate) => Verification::Found(certificate),
        None => Verification::NotFound,
    })
}
