//! Deploy orchestrator.
//!
//! Runs the deploy stages in order and stops at the first unrecoverable
//! failure: key → build → wallet gate → publish → anchor.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use docwalrus_anchor::{LedgerClient, ManifestAnchor, SuiRpcClient, SuiSigner, decode_private_key};
use docwalrus_protocol::{AnchorResult, Manifest, UploadEntry};
use docwalrus_wallet_auth::AuthOrchestrator;
use docwalrus_walrus::{ContentUploader, PublishEvent, PublishPipeline, WalrusUploader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::build::run_build_command;
use crate::config::SiteConfig;
use crate::error::DeployError;

/// What a successful deploy produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReport {
    /// Address derived from the deploy key.
    pub deployer: String,
    pub build_dir: PathBuf,
    pub entries: Vec<UploadEntry>,
    pub anchor: AnchorResult,
}

/// Deploys a built site.
pub struct DeployCommand {
    config: SiteConfig,
    project_dir: PathBuf,
    auth: AuthOrchestrator,
    uploader: Option<Arc<dyn ContentUploader>>,
    ledger: Option<Arc<dyn LedgerClient>>,
    events_tx: Option<mpsc::Sender<PublishEvent>>,
    cancel: CancellationToken,
}

impl DeployCommand {
    pub fn new(config: SiteConfig, project_dir: impl Into<PathBuf>, auth: AuthOrchestrator) -> Self {
        Self {
            config,
            project_dir: project_dir.into(),
            auth,
            uploader: None,
            ledger: None,
            events_tx: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the Walrus publisher client.
    pub fn with_uploader(mut self, uploader: Arc<dyn ContentUploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    /// Replaces the Sui JSON-RPC client.
    pub fn with_ledger(mut self, ledger: Arc<dyn LedgerClient>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn with_events(mut self, tx: mpsc::Sender<PublishEvent>) -> Self {
        self.events_tx = Some(tx);
        self
    }

    /// Returns a token that aborts the wallet handshake.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Runs the deploy with the given private key.
    ///
    /// With `build` set the configured build command runs first.
    pub async fn run(&self, private_key: &str, build: bool) -> Result<DeployReport, DeployError> {
        let key = decode_private_key(private_key)?;
        let signer = SuiSigner::new(key.clone());
        let deployer = signer.address();
        let ledger = self.ledger()?;
        let uploader = self.uploader(&deployer, private_key)?;

        if build {
            run_build_command(&self.config.build_command, &self.project_dir).await?;
        }

        let build_dir = self.config.build_path(&self.project_dir);
        if !build_dir.is_dir() {
            return Err(DeployError::BuildMissing(build_dir));
        }

        let authorized = self.auth.authorize(self.cancel.clone()).await?;
        if authorized != deployer {
            warn!(
                authorized = %authorized,
                deployer = %deployer,
                "connected wallet differs from the deploy key's address"
            );
        }

        let entries = self.publish(uploader, &build_dir).await?;
        let manifest = Manifest::new(
            self.config.title.clone(),
            self.config.tagline.clone(),
            entries.clone(),
        )
        .map_err(|_| DeployError::PipelineExhausted)?;

        let anchor = ManifestAnchor::new(ledger, self.config.sui.clone());
        match anchor.anchor(&manifest, &key).await {
            Ok(result) => {
                info!(
                    object_id = %result.manifest_object_id,
                    files = entries.len(),
                    "deploy completed"
                );
                Ok(DeployReport {
                    deployer,
                    build_dir,
                    entries,
                    anchor: result,
                })
            }
            Err(source) => {
                error!(error = %source, files = entries.len(), "anchoring failed after upload");
                Err(DeployError::Anchor { source, entries })
            }
        }
    }

    async fn publish(
        &self,
        uploader: Arc<dyn ContentUploader>,
        build_dir: &Path,
    ) -> Result<Vec<UploadEntry>, DeployError> {
        let mut pipeline = PublishPipeline::new(uploader);
        if let Some(tx) = &self.events_tx {
            pipeline = pipeline.with_events(tx.clone());
        }

        let entries = pipeline.publish(build_dir).await?;
        if entries.is_empty() {
            error!(dir = %build_dir.display(), "every upload failed");
            return Err(DeployError::PipelineExhausted);
        }
        Ok(entries)
    }

    fn uploader(
        &self,
        deployer: &str,
        private_key: &str,
    ) -> Result<Arc<dyn ContentUploader>, DeployError> {
        if let Some(uploader) = &self.uploader {
            return Ok(Arc::clone(uploader));
        }
        let uploader = WalrusUploader::new(self.config.walrus.clone())?
            .with_wallet_address(deployer)
            .with_bearer_token(private_key.trim());
        Ok(Arc::new(uploader))
    }

    fn ledger(&self) -> Result<Arc<dyn LedgerClient>, DeployError> {
        if let Some(ledger) = &self.ledger {
            return Ok(Arc::clone(ledger));
        }
        let client =
            SuiRpcClient::new(self.config.sui.endpoint.clone()).map_err(DeployError::Ledger)?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use docwalrus_anchor::{MemoryLedger, derive_address};
    use docwalrus_protocol::{AuthorizationRecord, Network};
    use docwalrus_wallet_auth::BrowserLauncher;
    use docwalrus_wallet_state::{ConnectionValidator, MemoryAuthStore};
    use docwalrus_walrus::UploadError;
    use tempfile::TempDir;

    const KEY_HEX: &str = "0707070707070707070707070707070707070707070707070707070707070707";
    const KEY_ADDRESS: &str = "0xa0ccc8bcc83f6c628340134f8546a21e0618fd1aaa02432bba454c4a2c2233da";

    /// Fails for the listed file names, answers `blob-<name>` otherwise.
    struct MockUploader {
        failing: Vec<&'static str>,
        calls: AtomicUsize,
    }

    impl MockUploader {
        fn new(failing: Vec<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                failing,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl ContentUploader for MockUploader {
        fn upload<'a>(
            &'a self,
            path: &'a Path,
        ) -> Pin<Box<dyn Future<Output = Result<String, UploadError>> + Send + 'a>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                let name = path.file_name().unwrap().to_string_lossy().into_owned();
                if self.failing.contains(&name.as_str()) {
                    Err(UploadError::Status {
                        status: 503,
                        body: "unavailable".into(),
                    })
                } else {
                    Ok(format!("blob-{name}"))
                }
            })
        }
    }

    struct NoBrowser;

    impl BrowserLauncher for NoBrowser {
        fn open(&self, _url: &str) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Project with `build/index.html` (500 bytes) and `build/logo.png`.
    fn project() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let build = dir.path().join("build");
        fs::create_dir_all(&build).unwrap();
        fs::write(build.join("index.html"), vec![b'a'; 500]).unwrap();
        fs::write(build.join("logo.png"), b"PNG").unwrap();
        dir
    }

    fn config() -> SiteConfig {
        SiteConfig {
            title: "Scenario Site".into(),
            tagline: "Deployed in a test".into(),
            ..SiteConfig::default()
        }
    }

    fn connected_auth() -> AuthOrchestrator {
        let store = Arc::new(MemoryAuthStore::with_record(AuthorizationRecord::new(
            KEY_ADDRESS,
            Network::Mainnet,
        )));
        AuthOrchestrator::new(ConnectionValidator::new(store)).with_browser(Arc::new(NoBrowser))
    }

    #[tokio::test]
    async fn failed_file_is_left_out_of_the_manifest() {
        let dir = project();
        let uploader = MockUploader::new(vec!["logo.png"]);
        let ledger = Arc::new(MemoryLedger::new());
        let cmd = DeployCommand::new(config(), dir.path(), connected_auth())
            .with_uploader(uploader.clone())
            .with_ledger(ledger.clone());

        let report = cmd.run(KEY_HEX, false).await.unwrap();
        assert_eq!(report.deployer, KEY_ADDRESS);
        assert_eq!(
            report.entries,
            vec![UploadEntry::new("index.html", "blob-index.html")]
        );
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 2);
        assert_eq!(ledger.executed(), 1);

        let site = docwalrus_anchor::get_site_metadata(
            ledger.as_ref(),
            &report.anchor.manifest_object_id,
        )
        .await
        .unwrap();
        assert_eq!(site.name, "Scenario Site");
        assert_eq!(site.files(), report.entries.as_slice());
    }

    #[tokio::test]
    async fn zero_uploads_abort_before_anchor() {
        let dir = project();
        let ledger = Arc::new(MemoryLedger::new());
        let cmd = DeployCommand::new(config(), dir.path(), connected_auth())
            .with_uploader(MockUploader::new(vec!["index.html", "logo.png"]))
            .with_ledger(ledger.clone());

        let err = cmd.run(KEY_HEX, false).await.unwrap_err();
        assert!(matches!(err, DeployError::PipelineExhausted));
        assert_eq!(ledger.executed(), 0);
    }

    #[tokio::test]
    async fn bad_key_fails_before_any_upload() {
        let dir = project();
        let uploader = MockUploader::new(vec![]);
        let cmd = DeployCommand::new(config(), dir.path(), connected_auth())
            .with_uploader(uploader.clone())
            .with_ledger(Arc::new(MemoryLedger::new()));

        let err = cmd.run("abcd", false).await.unwrap_err();
        assert!(matches!(err, DeployError::KeyDecode(_)));
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_build_output() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = DeployCommand::new(config(), dir.path(), connected_auth())
            .with_uploader(MockUploader::new(vec![]))
            .with_ledger(Arc::new(MemoryLedger::new()));

        let err = cmd.run(KEY_HEX, false).await.unwrap_err();
        assert!(matches!(err, DeployError::BuildMissing(_)));
    }

    #[tokio::test]
    async fn anchor_failure_keeps_entries() {
        let dir = project();
        let cmd = DeployCommand::new(config(), dir.path(), connected_auth())
            .with_uploader(MockUploader::new(vec![]))
            .with_ledger(Arc::new(MemoryLedger::failing("InsufficientGas")));

        match cmd.run(KEY_HEX, false).await.unwrap_err() {
            DeployError::Anchor { entries, .. } => {
                let paths: Vec<&str> = entries.iter().map(|e| e.relative_path.as_str()).collect();
                assert_eq!(paths, vec!["index.html", "logo.png"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn bad_endpoint_fails_before_upload() {
        let dir = project();
        let mut config = config();
        config.sui.endpoint = "not a url".into();
        let uploader = MockUploader::new(vec![]);
        let cmd = DeployCommand::new(config, dir.path(), connected_auth())
            .with_uploader(uploader.clone());

        let err = cmd.run(KEY_HEX, false).await.unwrap_err();
        assert!(matches!(err, DeployError::Ledger(_)), "unexpected error: {err:?}");
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stale_wallet_without_callback_times_out() {
        let dir = project();
        let mut record = AuthorizationRecord::new(KEY_ADDRESS, Network::Mainnet);
        record.authorized_at = chrono::Utc::now() - chrono::Duration::minutes(10);
        let store = Arc::new(MemoryAuthStore::with_record(record));
        let auth = AuthOrchestrator::new(ConnectionValidator::new(store))
            .with_browser(Arc::new(NoBrowser))
            .with_timeout(Duration::from_millis(50));

        let uploader = MockUploader::new(vec![]);
        let cmd = DeployCommand::new(config(), dir.path(), auth)
            .with_uploader(uploader.clone())
            .with_ledger(Arc::new(MemoryLedger::new()));

        let err = cmd.run(KEY_HEX, false).await.unwrap_err();
        assert!(matches!(err, DeployError::AuthTimeout(_)));
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn events_are_forwarded() {
        let dir = project();
        let (tx, mut rx) = mpsc::channel(16);
        let cmd = DeployCommand::new(config(), dir.path(), connected_auth())
            .with_uploader(MockUploader::new(vec!["logo.png"]))
            .with_ledger(Arc::new(MemoryLedger::new()))
            .with_events(tx);

        cmd.run(KEY_HEX, false).await.unwrap();
        drop(cmd);

        let mut events = Vec::new();
        while let Some(e) = rx.recv().await {
            events.push(e);
        }
        assert_eq!(events.len(), 3);
        assert!(matches!(events[2], PublishEvent::FileFailed { .. }));
    }

    #[test]
    fn key_address_constant_matches_derivation() {
        let key = decode_private_key(KEY_HEX).unwrap();
        assert_eq!(derive_address(&key.verifying_key()), KEY_ADDRESS);
    }
}
