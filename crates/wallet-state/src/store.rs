//! Authorization record persistence.
//!
//! The record is a small JSON document under the user's home directory.
//! Independent CLI invocations may race on it; the last writer wins.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use docwalrus_protocol::AuthorizationRecord;
use docwalrus_protocol::constants::{STATE_DIR_NAME, WALLET_FILE_NAME};
use tracing::debug;

use crate::error::StoreError;

/// Storage backend for the wallet authorization record.
pub trait AuthStore: Send + Sync {
    /// Returns the stored record, or `None` if nothing is stored.
    fn read(&self) -> Result<Option<AuthorizationRecord>, StoreError>;

    /// Replaces the stored record.
    fn write(&self, record: &AuthorizationRecord) -> Result<(), StoreError>;

    /// Deletes the stored record. Removing a missing record is not an error.
    fn remove(&self) -> Result<(), StoreError>;
}

/// File-backed store, one JSON document per machine.
#[derive(Debug, Clone)]
pub struct FileAuthStore {
    path: PathBuf,
}

impl FileAuthStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at `~/.docwalrus/wallet.json`.
    pub fn default_location() -> Result<Self, StoreError> {
        default_wallet_path()
            .map(Self::new)
            .ok_or(StoreError::NoHomeDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuthStore for FileAuthStore {
    fn read(&self) -> Result<Option<AuthorizationRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&self.path)?;
        let record: AuthorizationRecord = serde_json::from_str(&data)?;
        debug!(path = %self.path.display(), address = %record.address, "loaded wallet record");
        Ok(Some(record))
    }

    fn write(&self, record: &AuthorizationRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(record)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        debug!(path = %self.path.display(), address = %record.address, "persisted wallet record");
        Ok(())
    }

    fn remove(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "removed wallet record");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryAuthStore {
    record: RwLock<Option<AuthorizationRecord>>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: AuthorizationRecord) -> Self {
        Self {
            record: RwLock::new(Some(record)),
        }
    }
}

impl AuthStore for MemoryAuthStore {
    fn read(&self) -> Result<Option<AuthorizationRecord>, StoreError> {
        Ok(self.record.read().unwrap().clone())
    }

    fn write(&self, record: &AuthorizationRecord) -> Result<(), StoreError> {
        *self.record.write().unwrap() = Some(record.clone());
        Ok(())
    }

    fn remove(&self) -> Result<(), StoreError> {
        self.record.write().unwrap().take();
        Ok(())
    }
}

/// Returns `~/.docwalrus/wallet.json`, if a home directory is known.
pub fn default_wallet_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(STATE_DIR_NAME).join(WALLET_FILE_NAME))
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }

    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docwalrus_protocol::Network;

    fn test_store() -> (tempfile::TempDir, FileAuthStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileAuthStore::new(tmp.path().join(".docwalrus").join("wallet.json"));
        (tmp, store)
    }

    #[test]
    fn read_missing_file_returns_none() {
        let (_tmp, store) = test_store();
        assert!(store.read().unwrap().is_none());
    }

    #[test]
    fn write_creates_parent_and_reads_back() {
        let (_tmp, store) = test_store();
        let record = AuthorizationRecord::new("0xabc", Network::Testnet);
        store.write(&record).unwrap();

        assert!(store.path().exists());
        assert_eq!(store.read().unwrap(), Some(record));
    }

    #[test]
    fn write_overwrites_previous_record() {
        let (_tmp, store) = test_store();
        store
            .write(&AuthorizationRecord::new("0xold", Network::Mainnet))
            .unwrap();
        store
            .write(&AuthorizationRecord::new("0xnew", Network::Mainnet))
            .unwrap();
        assert_eq!(store.read().unwrap().unwrap().address, "0xnew");
    }

    #[test]
    fn remove_deletes_file_and_is_idempotent() {
        let (_tmp, store) = test_store();
        store
            .write(&AuthorizationRecord::new("0xabc", Network::Mainnet))
            .unwrap();
        store.remove().unwrap();
        assert!(!store.path().exists());
        store.remove().unwrap();
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let (_tmp, store) = test_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.read(), Err(StoreError::Json(_))));
    }

    #[cfg(unix)]
    #[test]
    fn written_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let (_tmp, store) = test_store();
        store
            .write(&AuthorizationRecord::new("0xabc", Network::Mainnet))
            .unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryAuthStore::new();
        assert!(store.read().unwrap().is_none());
        let record = AuthorizationRecord::new("0x1", Network::Mainnet);
        store.write(&record).unwrap();
        assert_eq!(store.read().unwrap(), Some(record));
        store.remove().unwrap();
        assert!(store.read().unwrap().is_none());
    }

    #[test]
    fn default_path_ends_with_wallet_file() {
        if let Some(path) = default_wallet_path() {
            assert!(path.ends_with(".docwalrus/wallet.json"));
        }
    }
}
