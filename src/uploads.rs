use std::{
    io,
    path::{Path, PathBuf},
};

use crate::forms::ResumeUpload;

const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

/// Reduce an untrusted client file name to `[A-Za-z0-9._-]`.
///
/// Path separators and whitespace become `_`, everything else outside the safe
/// set is dropped and leading or trailing dots and underscores are stripped, so
/// `../../etc/passwd` turns into `etc_passwd`. Returns `None` when nothing is
/// left.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let spaced: String = raw
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');

    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn has_allowed_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// The shared directory resumes are written to and served from.
#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        UploadDir { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Store a resume as `{user_id}_{internship_id}_{sanitized name}` and return
    /// that name. A user applies to an internship at most once, so the name
    /// does not collide with another applicant's file.
    pub async fn save_resume(
        &self,
        user_id: i64,
        internship_id: i64,
        upload: &ResumeUpload,
    ) -> io::Result<String> {
        let name = sanitize_filename(&upload.filename).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "resume file name is empty")
        })?;
        let stored = format!("{user_id}_{internship_id}_{name}");

        tokio::fs::write(self.root.join(&stored), &upload.bytes).await?;
        tracing::debug!(file = %stored, bytes = upload.bytes.len(), "resume stored");

        Ok(stored)
    }

    /// Best effort removal of a file whose application was not recorded.
    pub async fn discard(&self, stored: &str) {
        if let Err(err) = tokio::fs::remove_file(self.root.join(stored)).await {
            tracing::warn!(file = %stored, error = %err, "failed to remove orphaned resume");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_like_secure_filename() {
        assert_eq!(sanitize_filename("My CV.pdf").as_deref(), Some("My_CV.pdf"));
        assert_eq!(sanitize_filename("../../etc/passwd").as_deref(), Some("etc_passwd"));
        assert_eq!(
            sanitize_filename("..\\..\\win\\cv.docx").as_deref(),
            Some("win_cv.docx")
        );
        assert_eq!(sanitize_filename("résumé.pdf").as_deref(), Some("rsum.pdf"));
        assert_eq!(sanitize_filename("../.."), None);
        assert_eq!(sanitize_filename(""), None);
    }

    #[test]
    fn extension_allow_list_is_case_insensitive() {
        assert!(has_allowed_extension("cv.pdf"));
        assert!(has_allowed_extension("cv.DOCX"));
        assert!(has_allowed_extension("cv.doc"));
        assert!(!has_allowed_extension("cv.pdf.exe"));
        assert!(!has_allowed_extension("pdf"));
    }

    #[tokio::test]
    async fn saves_under_derived_name() {
        let dir = UploadDir::new(std::env::temp_dir().join(format!(
            "skillset-uploads-{}",
            uuid::Uuid::new_v4()
        )));
        dir.ensure().await.unwrap();

        let upload = ResumeUpload {
            filename: "../My CV.pdf".into(),
            bytes: b"%PDF-1.4".to_vec(),
        };
        let stored = dir.save_resume(3, 7, &upload).await.unwrap();
        assert_eq!(stored, "3_7_My_CV.pdf");
        assert_eq!(
            tokio::fs::read(dir.root().join(&stored)).await.unwrap(),
            b"%PDF-1.4"
        );

        dir.discard(&stored).await;
        assert!(!dir.root().join(&stored).exists());
        tokio::fs::remove_dir_all(dir.root()).await.unwrap();
    }
}
