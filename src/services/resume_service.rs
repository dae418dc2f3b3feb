use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use tokio::fs;
use uuid::Uuid;

use crate::database::{ResumeStore, Store};
use crate::error::{Error, Result};
use crate::models::resume::{NewResume, Resume};

pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;
const RESUME_SUBDIR: &str = "resumes";

const PDF_MAGIC: &[u8] = b"%PDF";
const DOCX_MAGIC: &[u8] = b"PK\x03\x04";
const DOC_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

#[derive(Clone)]
pub struct ResumeService {
    store: Arc<dyn Store>,
    uploads_dir: PathBuf,
}

impl ResumeService {
    pub fn new(store: Arc<dyn Store>, uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            uploads_dir: uploads_dir.into(),
        }
    }

    pub async fn upload(
        &self,
        candidate_id: Uuid,
        filename: &str,
        data: Bytes,
        version_label: Option<String>,
    ) -> Result<Resume> {
        let ext = check_resume_file(filename, &data)?;

        let dir = self.uploads_dir.join(RESUME_SUBDIR);
        fs::create_dir_all(&dir).await?;
        let path = dir.join(format!("{}.{}", Uuid::new_v4(), ext));
        fs::write(&path, &data).await.map_err(|e| {
            tracing::error!(error = %e, path = %path.display(), "failed to write resume");
            Error::Internal(format!("Failed to save file: {}", e))
        })?;

        let inserted = self
            .store
            .insert_resume(NewResume {
                candidate_id,
                storage_path: path.to_string_lossy().into_owned(),
                version_label: version_label
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty()),
                source: "upload".to_string(),
            })
            .await;
        let resume = match inserted {
            Ok(resume) => resume,
            Err(e) => {
                if let Err(rm) = fs::remove_file(&path).await {
                    tracing::warn!(error = %rm, path = %path.display(), "failed to remove orphaned resume");
                }
                return Err(e);
            }
        };
        tracing::info!(resume_id = %resume.id, %candidate_id, bytes = data.len(), "resume stored");
        Ok(resume)
    }

    pub async fn list(&self, candidate_id: Uuid) -> Result<Vec<Resume>> {
        self.store.list_resumes(candidate_id).await
    }
}

/// Returns the normalized extension when the file is an acceptable resume.
fn check_resume_file(filename: &str, data: &[u8]) -> Result<&'static str> {
    if data.is_empty() {
        return Err(Error::BadRequest("Resume file is empty".into()));
    }
    if data.len() > MAX_RESUME_BYTES {
        return Err(Error::BadRequest("Resume must be at most 5 MiB".into()));
    }
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let (ext, magic): (&'static str, &[u8]) = match ext.as_str() {
        "pdf" => ("pdf", PDF_MAGIC),
        "docx" => ("docx", DOCX_MAGIC),
        "doc" => ("doc", DOC_MAGIC),
        other => {
            return Err(Error::BadRequest(format!(
                "File type .{} is not allowed; use PDF, DOC or DOCX",
                other
            )))
        }
    };
    if !data.starts_with(magic) {
        return Err(Error::BadRequest(format!("Invalid {} file content", ext.to_uppercase())));
    }
    Ok(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    #[test]
    fn only_documents_with_matching_content_pass() {
        assert_eq!(check_resume_file("cv.PDF", b"%PDF-1.7 ...").unwrap(), "pdf");
        assert_eq!(check_resume_file("cv.docx", b"PK\x03\x04rest").unwrap(), "docx");
        assert!(check_resume_file("cv.pdf", b"GIF89a").is_err());
        assert!(check_resume_file("cv.exe", b"MZ").is_err());
        assert!(check_resume_file("cv.pdf", b"").is_err());
        let huge = vec![b'%'; MAX_RESUME_BYTES + 1];
        assert!(check_resume_file("cv.pdf", &huge).is_err());
    }

    #[tokio::test]
    async fn upload_writes_under_resumes_and_labels_versions() {
        let dir = std::env::temp_dir().join(format!("jobboard-resumes-{}", Uuid::new_v4()));
        let service = ResumeService::new(Arc::new(MemoryStore::new()), &dir);
        let candidate = Uuid::new_v4();

        let first = service
            .upload(candidate, "cv.pdf", Bytes::from_static(b"%PDF-1.4 body"), None)
            .await
            .unwrap();
        let second = service
            .upload(candidate, "cv.pdf", Bytes::from_static(b"%PDF-1.4 body"), None)
            .await
            .unwrap();

        assert_eq!(first.version_label, "v1");
        assert_eq!(second.version_label, "v2");
        assert!(first.storage_path.starts_with(dir.join("resumes").to_string_lossy().as_ref()));
        assert!(fs::metadata(&first.storage_path).await.is_ok());
        assert_eq!(service.list(candidate).await.unwrap().len(), 2);

        let _ = fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn failed_insert_leaves_no_file_behind() {
        let dir = std::env::temp_dir().join(format!("jobboard-resumes-{}", Uuid::new_v4()));
        let store = Arc::new(MemoryStore::new());
        let service = ResumeService::new(store.clone(), &dir);
        store.fail_resume_writes(true);

        let err = service
            .upload(Uuid::new_v4(), "cv.pdf", Bytes::from_static(b"%PDF-1.4 body"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Internal(_)));

        let mut entries = fs::read_dir(dir.join("resumes")).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());

        let _ = fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn concurrent_uploads_get_distinct_labels() {
        let dir = std::env::temp_dir().join(format!("jobboard-resumes-{}", Uuid::new_v4()));
        let service = ResumeService::new(Arc::new(MemoryStore::new()), &dir);
        let candidate = Uuid::new_v4();

        let uploads = (0..8).map(|_| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .upload(candidate, "cv.pdf", Bytes::from_static(b"%PDF-1.4 body"), None)
                    .await
            })
        });
        let mut labels = Vec::new();
        for handle in uploads.collect::<Vec<_>>() {
            labels.push(handle.await.unwrap().unwrap().version_label);
        }
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), 8);

        let _ = fs::remove_dir_all(&dir).await;
    }
}
