//! Image Upload Pipeline
//!
//! Turns local image references into durable URLs. Each image goes through:
//!
//! 1. remote not configured → local copy
//! 2. remote unreachable → local copy
//! 3. read bytes (file path first, HTTP fetch as fallback)
//! 4. upload to `<entity>-images/<parentId>_<index>_<epochMillis>.jpg`
//! 5. return the public URL
//!
//! Any failure in steps 3 to 5 falls back to a local copy under
//! `<data_dir>/<entity>-images/`. If the bytes cannot be read at all the
//! original reference is returned unchanged. The pipeline never fails.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use shared::util::now_millis;

use crate::backend::{Backend, RemoteBackend};
use crate::remote::buckets;
use crate::{ClientError, ClientResult};

/// Per-image progress checkpoints (percent)
pub const PROGRESS_CHECKPOINTS: [u8; 5] = [10, 30, 50, 80, 100];

const IMAGE_CONTENT_TYPE: &str = "image/jpeg";
const FILE_SCHEME: &str = "file://";

/// Progress callback, called with a cumulative 0-100 value
pub type ProgressFn = dyn Fn(u8) + Send + Sync;

/// Record type an image belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Sale,
    FieldVisit,
    Complaint,
}

impl AttachmentKind {
    pub fn bucket(self) -> &'static str {
        match self {
            Self::Sale | Self::FieldVisit => buckets::WARRANTY_IMAGES,
            Self::Complaint => buckets::COMPLAINT_IMAGES,
        }
    }

    /// Folder used both in the bucket and in the local data directory
    pub fn folder(self) -> &'static str {
        match self {
            Self::Sale => "sale-images",
            Self::FieldVisit => "visit-images",
            Self::Complaint => "complaint-images",
        }
    }
}

/// Object / file name for one image
pub fn object_name(parent_id: &str, index: usize, epoch_millis: i64) -> String {
    format!("{parent_id}_{index}_{epoch_millis}.jpg")
}

/// Overall progress after `checkpoint` of image `index` out of `total`
fn cumulative_progress(index: usize, total: usize, checkpoint: u8) -> u8 {
    if total == 0 {
        return 100;
    }
    let done = index * 100 + usize::from(checkpoint);
    (done / total).min(100) as u8
}

/// Shared upload pipeline
#[derive(Clone)]
pub struct ImageUploadPipeline {
    backend: Backend,
    http: reqwest::Client,
    data_dir: PathBuf,
}

impl ImageUploadPipeline {
    pub fn new(backend: Backend, data_dir: impl Into<PathBuf>, timeout_secs: u64) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            backend,
            http,
            data_dir: data_dir.into(),
        })
    }

    /// Upload images one after another, reporting cumulative progress
    pub async fn upload_all(
        &self,
        kind: AttachmentKind,
        parent_id: &str,
        references: &[String],
        progress: Option<&ProgressFn>,
    ) -> Vec<String> {
        let total = references.len();
        let mut urls = Vec::with_capacity(total);
        for (index, reference) in references.iter().enumerate() {
            let report = |checkpoint: u8| {
                if let Some(cb) = progress {
                    cb(cumulative_progress(index, total, checkpoint));
                }
            };
            urls.push(self.upload_one(kind, parent_id, index, reference, &report).await);
        }
        urls
    }

    /// Upload one image, falling back to a local copy
    pub async fn upload_one(
        &self,
        kind: AttachmentKind,
        parent_id: &str,
        index: usize,
        reference: &str,
        report: &(dyn Fn(u8) + Send + Sync),
    ) -> String {
        let name = object_name(parent_id, index, now_millis());
        report(PROGRESS_CHECKPOINTS[0]);

        let remote = match &self.backend {
            Backend::Remote(remote) => {
                if remote.reachability.is_reachable().await {
                    Some(remote)
                } else {
                    debug!(reference, "Remote unreachable, saving image locally");
                    None
                }
            }
            Backend::LocalOnly => None,
        };

        let bytes = match self.read_image(reference).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(reference, error = %e, "Failed to read image, keeping original reference");
                report(PROGRESS_CHECKPOINTS[4]);
                return reference.to_string();
            }
        };
        report(PROGRESS_CHECKPOINTS[1]);

        if let Some(remote) = remote {
            match self.upload_bytes(remote, kind, &name, bytes.clone(), report).await {
                Ok(url) => {
                    report(PROGRESS_CHECKPOINTS[4]);
                    return url;
                }
                Err(e) => {
                    warn!(reference, error = %e, "Image upload failed, saving locally");
                }
            }
        }

        let result = match self.save_locally(kind, &name, &bytes).await {
            Ok(path) => path.to_string_lossy().into_owned(),
            Err(e) => {
                warn!(reference, error = %e, "Failed to save image locally, keeping original reference");
                reference.to_string()
            }
        };
        report(PROGRESS_CHECKPOINTS[4]);
        result
    }

    async fn upload_bytes(
        &self,
        remote: &RemoteBackend,
        kind: AttachmentKind,
        name: &str,
        bytes: Vec<u8>,
        report: &(dyn Fn(u8) + Send + Sync),
    ) -> ClientResult<String> {
        let path = format!("{}/{}", kind.folder(), name);
        report(PROGRESS_CHECKPOINTS[2]);
        let url = remote
            .blobs
            .upload(kind.bucket(), &path, bytes, IMAGE_CONTENT_TYPE)
            .await?;
        report(PROGRESS_CHECKPOINTS[3]);
        Ok(url)
    }

    /// Read image bytes from a local path (`file://` allowed), falling back
    /// to fetching the reference over HTTP
    pub async fn read_image(&self, reference: &str) -> ClientResult<Vec<u8>> {
        let path = reference.strip_prefix(FILE_SCHEME).unwrap_or(reference);
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(bytes),
            Err(read_err) => {
                if !(reference.starts_with("http://") || reference.starts_with("https://")) {
                    return Err(read_err.into());
                }
                debug!(reference, "Not a local file, fetching as blob");
                let response = self.http.get(reference).send().await?;
                if !response.status().is_success() {
                    return Err(ClientError::NotFound(format!(
                        "{reference}: HTTP {}",
                        response.status()
                    )));
                }
                Ok(response.bytes().await?.to_vec())
            }
        }
    }

    /// Copy bytes into `<data_dir>/<folder>/<name>`
    pub async fn save_locally(
        &self,
        kind: AttachmentKind,
        name: &str,
        bytes: &[u8],
    ) -> ClientResult<PathBuf> {
        let dir = self.local_dir(kind);
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(name);
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), size = bytes.len(), "Image saved locally");
        Ok(path)
    }

    pub fn local_dir(&self, kind: AttachmentKind) -> PathBuf {
        self.data_dir.join(kind.folder())
    }

    /// Whether `url` points into this pipeline's local image directories
    pub fn is_local_copy(&self, url: &str) -> bool {
        Path::new(url).starts_with(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_cumulative_progress() {
        assert_eq!(cumulative_progress(0, 1, 10), 10);
        assert_eq!(cumulative_progress(0, 1, 100), 100);
        assert_eq!(cumulative_progress(0, 2, 100), 50);
        assert_eq!(cumulative_progress(1, 2, 10), 55);
        assert_eq!(cumulative_progress(1, 2, 100), 100);
        assert_eq!(cumulative_progress(0, 0, 10), 100);
    }

    #[test]
    fn test_object_name_and_folders() {
        assert_eq!(object_name("abc", 1, 1700000000000), "abc_1_1700000000000.jpg");
        assert_eq!(AttachmentKind::Complaint.bucket(), buckets::COMPLAINT_IMAGES);
        assert_eq!(AttachmentKind::FieldVisit.bucket(), buckets::WARRANTY_IMAGES);
        assert!(AttachmentKind::Sale.folder().ends_with("-images"));
    }

    #[tokio::test]
    async fn test_local_only_copies_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("photo.jpg");
        tokio::fs::write(&source, b"\xFF\xD8jpeg-bytes").await.unwrap();

        let data_dir = dir.path().join("data");
        let pipeline = ImageUploadPipeline::new(Backend::LocalOnly, &data_dir, 5).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let cb = move |p: u8| sink.lock().push(p);

        let reference = format!("file://{}", source.display());
        let urls = pipeline
            .upload_all(AttachmentKind::Sale, "sale-1", &[reference], Some(&cb))
            .await;

        assert_eq!(urls.len(), 1);
        assert!(pipeline.is_local_copy(&urls[0]));
        assert!(urls[0].contains("sale-images"));
        assert_eq!(tokio::fs::read(&urls[0]).await.unwrap(), b"\xFF\xD8jpeg-bytes");

        let seen = seen.lock().clone();
        assert_eq!(seen.first(), Some(&10));
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_unreadable_reference_is_returned_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = ImageUploadPipeline::new(Backend::LocalOnly, dir.path(), 5).unwrap();
        let missing = "file:///definitely/not/here.jpg".to_string();
        let urls = pipeline
            .upload_all(AttachmentKind::Complaint, "c1", &[missing.clone()], None)
            .await;
        assert_eq!(urls, vec![missing]);
    }
}
