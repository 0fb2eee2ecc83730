//! Commits a manifest to the ledger in one signed transaction.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use docwalrus_protocol::{AnchorResult, Manifest};
use ed25519_dalek::SigningKey;
use serde_json::Value;
use tracing::{error, info};

use crate::error::AnchorError;
use crate::reader::{self, ManifestMetadata, SiteMetadata};
use crate::rpc::LedgerClient;
use crate::signer::SuiSigner;
use crate::types::{ExecutionState, MoveCall, SuiConfig};

/// Anchors manifests through a [`LedgerClient`].
pub struct ManifestAnchor {
    ledger: Arc<dyn LedgerClient>,
    config: SuiConfig,
}

impl ManifestAnchor {
    pub fn new(ledger: Arc<dyn LedgerClient>, config: SuiConfig) -> Self {
        Self { ledger, config }
    }

    pub fn config(&self) -> &SuiConfig {
        &self.config
    }

    /// Builds, signs and submits the manifest transaction.
    ///
    /// Exactly one transaction is submitted per call. The created object id
    /// is the manifest's address on the ledger.
    pub async fn anchor(
        &self,
        manifest: &Manifest,
        key: &SigningKey,
    ) -> Result<AnchorResult, AnchorError> {
        self.anchor_at(manifest, key, Utc::now()).await
    }

    /// Like [`anchor`](Self::anchor) with an explicit manifest timestamp.
    pub async fn anchor_at(
        &self,
        manifest: &Manifest,
        key: &SigningKey,
        timestamp: DateTime<Utc>,
    ) -> Result<AnchorResult, AnchorError> {
        let signer = SuiSigner::new(key.clone());
        let metadata = ManifestMetadata::new(manifest, timestamp).to_json()?;

        let call = MoveCall {
            sender: signer.address(),
            package: self.config.package.clone(),
            module: self.config.module.clone(),
            function: self.config.function.clone(),
            arguments: vec![
                Value::String(manifest.site_name().to_string()),
                Value::String(manifest.description().to_string()),
                Value::String(metadata),
            ],
            gas_budget: self.config.gas_budget,
        };

        info!(
            target_fn = %self.config.target(),
            sender = %call.sender,
            files = manifest.entries().len(),
            "anchoring site manifest"
        );

        let unsigned = self.ledger.move_call(&call).await?;
        let tx_bytes = BASE64.decode(&unsigned.tx_bytes)?;
        let signature = signer.sign_transaction(&tx_bytes);

        let resp = self
            .ledger
            .execute(&unsigned.tx_bytes, &[signature])
            .await?;
        let effects = resp
            .effects
            .ok_or_else(|| AnchorError::InvalidResponse("transaction response has no effects".into()))?;

        if effects.status.status == ExecutionState::Failure {
            let reason = effects
                .status
                .error
                .unwrap_or_else(|| "unknown error".to_string());
            error!(digest = %resp.digest, error = %reason, "manifest transaction failed");
            return Err(AnchorError::Execution(reason));
        }

        let object_id = effects
            .created
            .first()
            .map(|created| created.reference.object_id.clone())
            .ok_or(AnchorError::NoCreatedObject)?;

        info!(object_id = %object_id, digest = %resp.digest, "site manifest anchored");
        Ok(AnchorResult {
            manifest_object_id: object_id,
            transaction_digest: resp.digest,
        })
    }

    /// Reads an anchored manifest back.
    pub async fn get_site_metadata(&self, object_id: &str) -> Result<SiteMetadata, AnchorError> {
        reader::get_site_metadata(self.ledger.as_ref(), object_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use docwalrus_protocol::UploadEntry;

    use crate::memory::MemoryLedger;
    use crate::rpc::LedgerFuture;
    use crate::types::{
        ExecutionStatus, ObjectResponse, TransactionBlockBytes, TransactionBlockResponse,
        TransactionEffects,
    };

    fn key() -> SigningKey {
        SigningKey::from_bytes(&[7u8; 32])
    }

    fn manifest() -> Manifest {
        Manifest::new(
            "My Docs",
            "Docs for the project",
            vec![
                UploadEntry::new("index.html", "blobA"),
                UploadEntry::new("guide/intro.html", "blobB"),
            ],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn anchor_and_read_back() {
        let ledger = Arc::new(MemoryLedger::new());
        let anchor = ManifestAnchor::new(ledger.clone(), SuiConfig::default());
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap();

        let result = anchor.anchor_at(&manifest(), &key(), at).await.unwrap();
        assert!(result.manifest_object_id.starts_with("0x"));
        assert!(!result.transaction_digest.is_empty());
        assert_eq!(ledger.executed(), 1);

        let site = anchor
            .get_site_metadata(&result.manifest_object_id)
            .await
            .unwrap();
        assert_eq!(site.object_id, result.manifest_object_id);
        assert_eq!(site.name, "My Docs");
        assert_eq!(site.description, "Docs for the project");
        assert_eq!(site.files(), manifest().entries());
        assert_eq!(site.metadata.storage_provider, "walrus");
        assert_eq!(site.metadata.timestamp, "2025-06-01T08:30:00.000Z");
    }

    #[tokio::test]
    async fn execution_failure_is_reported() {
        let ledger = Arc::new(MemoryLedger::failing("InsufficientGas"));
        let anchor = ManifestAnchor::new(ledger, SuiConfig::default());

        let err = anchor.anchor(&manifest(), &key()).await.unwrap_err();
        match err {
            AnchorError::Execution(reason) => assert_eq!(reason, "InsufficientGas"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    /// Accepts any transaction but creates nothing.
    struct NoCreateLedger;

    impl LedgerClient for NoCreateLedger {
        fn move_call<'a>(&'a self, _call: &'a MoveCall) -> LedgerFuture<'a, TransactionBlockBytes> {
            Box::pin(async {
                Ok(TransactionBlockBytes {
                    tx_bytes: "AAEC".into(),
                })
            })
        }

        fn execute<'a>(
            &'a self,
            _tx_bytes: &'a str,
            _signatures: &'a [String],
        ) -> LedgerFuture<'a, TransactionBlockResponse> {
            Box::pin(async {
                Ok(TransactionBlockResponse {
                    digest: "D".into(),
                    effects: Some(TransactionEffects {
                        status: ExecutionStatus {
                            status: ExecutionState::Success,
                            error: None,
                        },
                        created: Vec::new(),
                    }),
                })
            })
        }

        fn get_object<'a>(&'a self, _object_id: &'a str) -> LedgerFuture<'a, ObjectResponse> {
            Box::pin(async {
                Ok(ObjectResponse {
                    data: None,
                    error: None,
                })
            })
        }
    }

    #[tokio::test]
    async fn missing_created_object_is_error() {
        let anchor = ManifestAnchor::new(Arc::new(NoCreateLedger), SuiConfig::default());
        let err = anchor.anchor(&manifest(), &key()).await.unwrap_err();
        assert!(matches!(err, AnchorError::NoCreatedObject));
    }

    #[tokio::test]
    async fn invalid_tx_bytes_are_rejected_before_submit() {
        struct BadBytes;
        impl LedgerClient for BadBytes {
            fn move_call<'a>(&'a self, _: &'a MoveCall) -> LedgerFuture<'a, TransactionBlockBytes> {
                Box::pin(async {
                    Ok(TransactionBlockBytes {
                        tx_bytes: "!!not base64!!".into(),
                    })
                })
            }
            fn execute<'a>(
                &'a self,
                _: &'a str,
                _: &'a [String],
            ) -> LedgerFuture<'a, TransactionBlockResponse> {
                panic!("must not submit")
            }
            fn get_object<'a>(&'a self, _: &'a str) -> LedgerFuture<'a, ObjectResponse> {
                panic!("unused")
            }
        }

        let anchor = ManifestAnchor::new(Arc::new(BadBytes), SuiConfig::default());
        let err = anchor.anchor(&manifest(), &key()).await.unwrap_err();
        assert!(matches!(err, AnchorError::TxBytes(_)));
    }
}
