//! Sequential publish of a build directory.
//!
//! Uploads every scanned file in order, keeps the successes, and reports
//! failures through logs and events without stopping the run.

use std::path::Path;
use std::sync::Arc;

use docwalrus_protocol::UploadEntry;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::error::PublishError;
use crate::scanner::scan_build_dir;
use crate::types::PublishEvent;
use crate::uploader::ContentUploader;

/// Publishes a build directory through a [`ContentUploader`].
pub struct PublishPipeline {
    uploader: Arc<dyn ContentUploader>,
    events_tx: Option<mpsc::Sender<PublishEvent>>,
}

impl PublishPipeline {
    pub fn new(uploader: Arc<dyn ContentUploader>) -> Self {
        Self {
            uploader,
            events_tx: None,
        }
    }

    /// Streams progress events to `tx`.
    pub fn with_events(mut self, tx: mpsc::Sender<PublishEvent>) -> Self {
        self.events_tx = Some(tx);
        self
    }

    /// Uploads every file under `build_dir`.
    ///
    /// Returns one entry per accepted file, in scan order. Per-file failures
    /// are skipped; only a failure to scan the root is an error. An empty
    /// result means nothing was published.
    pub async fn publish(&self, build_dir: &Path) -> Result<Vec<UploadEntry>, PublishError> {
        let files = scan_build_dir(build_dir).map_err(|source| PublishError::Scan {
            path: build_dir.display().to_string(),
            source,
        })?;

        info!(dir = %build_dir.display(), files = files.len(), "publishing build output");
        self.emit(PublishEvent::Started { total: files.len() }).await;

        let mut entries = Vec::with_capacity(files.len());
        for file in &files {
            match self.uploader.upload(&file.absolute_path).await {
                Ok(blob_id) => {
                    info!(path = %file.relative_path, blob_id = %blob_id, "uploaded");
                    self.emit(PublishEvent::FileUploaded {
                        path: file.relative_path.clone(),
                        blob_id: blob_id.clone(),
                    })
                    .await;
                    entries.push(UploadEntry::new(file.relative_path.clone(), blob_id));
                }
                Err(e) => {
                    error!(path = %file.relative_path, error = %e, "upload failed, skipping");
                    self.emit(PublishEvent::FileFailed {
                        path: file.relative_path.clone(),
                        error: e.to_string(),
                    })
                    .await;
                }
            }
        }

        info!(
            uploaded = entries.len(),
            failed = files.len() - entries.len(),
            "publish complete"
        );
        Ok(entries)
    }

    async fn emit(&self, event: PublishEvent) {
        if let Some(tx) = &self.events_tx {
            let _ = tx.send(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::future::Future;
    use std::path::PathBuf;
    use std::pin::Pin;
    use std::sync::Mutex;

    use crate::error::UploadError;

    /// Fails for files whose name is listed, answers `blob-<name>` otherwise.
    struct MockUploader {
        failing: Vec<&'static str>,
        calls: Mutex<Vec<PathBuf>>,
    }

    impl MockUploader {
        fn new(failing: Vec<&'static str>) -> Self {
            Self {
                failing,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl ContentUploader for MockUploader {
        fn upload<'a>(
            &'a self,
            path: &'a Path,
        ) -> Pin<Box<dyn Future<Output = Result<String, UploadError>> + Send + 'a>> {
            Box::pin(async move {
                self.calls.lock().unwrap().push(path.to_path_buf());
                let name = path.file_name().unwrap().to_string_lossy().into_owned();
                if self.failing.contains(&name.as_str()) {
                    Err(UploadError::Status {
                        status: 500,
                        body: "boom".into(),
                    })
                } else {
                    Ok(format!("blob-{name}"))
                }
            })
        }
    }

    #[tokio::test]
    async fn failing_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), vec![b'x'; 500]).unwrap();
        fs::create_dir_all(dir.path().join("img")).unwrap();
        fs::write(dir.path().join("img").join("logo.png"), b"PNG").unwrap();

        let uploader = Arc::new(MockUploader::new(vec!["logo.png"]));
        let (tx, mut rx) = mpsc::channel(16);
        let pipeline = PublishPipeline::new(uploader.clone()).with_events(tx);

        let entries = pipeline.publish(dir.path()).await.unwrap();
        assert_eq!(
            entries,
            vec![UploadEntry::new("index.html", "blob-index.html")]
        );
        assert_eq!(uploader.calls.lock().unwrap().len(), 2);

        drop(pipeline);
        let mut events = Vec::new();
        while let Some(e) = rx.recv().await {
            events.push(e);
        }
        assert_eq!(events[0], PublishEvent::Started { total: 2 });
        assert!(events.iter().any(|e| matches!(
            e,
            PublishEvent::FileFailed { path, .. } if path == "img/logo.png"
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            PublishEvent::FileUploaded { path, .. } if path == "index.html"
        )));
    }

    #[tokio::test]
    async fn returns_successes_in_scan_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.js", "a.html", "b.css"] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs").join("intro.html"), b"intro").unwrap();

        let pipeline = PublishPipeline::new(Arc::new(MockUploader::new(vec!["b.css"])));
        let entries = pipeline.publish(dir.path()).await.unwrap();

        let paths: Vec<&str> = entries.iter().map(|e| e.relative_path.as_str()).collect();
        assert_eq!(paths, vec!["a.html", "c.js", "docs/intro.html"]);
        assert_eq!(entries[2].content_id, "blob-intro.html");
    }

    #[tokio::test]
    async fn all_failures_yield_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("only.html"), b"x").unwrap();

        let pipeline = PublishPipeline::new(Arc::new(MockUploader::new(vec!["only.html"])));
        assert!(pipeline.publish(dir.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_build_dir_is_error() {
        let pipeline = PublishPipeline::new(Arc::new(MockUploader::new(vec![])));
        let err = pipeline
            .publish(Path::new("/nonexistent/build"))
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Scan { .. }));
    }
}
