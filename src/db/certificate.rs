use super::DBTx;
use crate::models::{Certificate, IssuedCertificate, NewCertificate};

/// Certificate issuing and lookup operations
pub trait CertificateExt {
    /// Insert a valid certificate. Returns `None` when the code is already taken,
    /// so the caller can draw a fresh one.
    async fn save_certificate(
        &mut self,
        certificate: &NewCertificate,
    ) -> Result<Option<Certificate>, sqlx::Error>;

    /// Exact, case-sensitive code match.
    async fn get_certificate_by_code(
        &mut self,
        code: &str,
    ) -> Result<Option<IssuedCertificate>, sqlx::Error>;

    async fn get_certificates(&mut self) -> Result<Vec<IssuedCertificate>, sqlx::Error>;

    async fn get_user_certificates(&mut self, user_id: i64)
    -> Result<Vec<Certificate>, sqlx::Error>;
}

impl CertificateExt for DBTx {
    async fn save_certificate(
        &mut self,
        certificate: &NewCertificate,
    ) -> Result<Option<Certificate>, sqlx::Error> {
        sqlx::query_as::<_, Certificate>(
            r#"
            INSERT INTO certificates (user_id, course_name, certificate_code, status)
            VALUES ($1, $2, $3, 'valid')
            ON CONFLICT (certificate_code) DO NOTHING
            RETURNING id, user_id, course_name, certificate_code, issue_date, status
            "#,
        )
        .bind(certificate.user_id)
        .bind(&certificate.course_name)
        .bind(&certificate.certificate_code)
        .fetch_optional(&mut *self.tx)
        .await
    }

    async fn get_certificate_by_code(
        &mut self,
        code: &str,
    ) -> Result<Option<IssuedCertificate>, sqlx::Error> {
        sqlx::query_as::<_, IssuedCertificate>(
            r#"
            SELECT c.id, c.user_id, c.course_name, c.certificate_code, c.issue_date, c.status,
                   u.name AS holder_name
            FROM certificates c
            INNER JOIN users u ON u.id = c.user_id
            WHERE c.certificate_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&mut *self.tx)
        .await
    }

    async fn get_certificates(&mut self) -> Result<Vec<IssuedCertificate>, sqlx::Error> {
        sqlx::query_as::<_, IssuedCertificate>(
            r#"
            SELECT c.id, c.user_id, c.course_name, c.certificate_code, c.issue_date, c.status,
                   u.name AS holder_name
            FROM certificates c
            INNER JOIN users u ON u.id = c.user_id
            ORDER BY c.issue_date DESC
            "#,
        )
        .fetch_all(&mut *self.tx)
        .await
    }

    async fn get_user_certificates(
        &mut self,
        user_id: i64,
    ) -> Result<Vec<Certificate>, sqlx::Error> {
        sqlx::query_as::<_, Certificate>(
            r#"
            SELECT id, user_id, course_name, certificate_code, issue_date, status
            FROM certificates
            WHERE user_id = $1
            ORDER BY issue_date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.tx)
        .await
    }
}
