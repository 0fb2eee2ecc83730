//! Decides whether a stored authorization can still be used for signing.
//!
//! Local reads fail closed: an unreadable or corrupt record blocks
//! publishing until the user re-runs the handshake. A record older than
//! the staleness window is evicted so the next deploy re-authorizes.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use docwalrus_protocol::constants::{DEFAULT_STALENESS_WINDOW, MAX_CLOCK_SKEW};
use docwalrus_protocol::{AuthorizationRecord, Network};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::store::AuthStore;

/// Result of inspecting the stored authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// A fresh record with a non-empty address.
    Connected(AuthorizationRecord),
    /// Nothing stored, or the stored record has no address.
    NotConnected,
    /// The record was older than the staleness window and has been evicted.
    Stale { age: Duration },
    /// The record was dated too far in the future and has been evicted.
    FutureDated { ahead: Duration },
    /// The store could not be read.
    Unreadable(String),
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected(_))
    }
}

/// Validates the stored authorization against the freshness policy.
#[derive(Clone)]
pub struct ConnectionValidator {
    store: Arc<dyn AuthStore>,
    staleness_window: Duration,
}

impl ConnectionValidator {
    pub fn new(store: Arc<dyn AuthStore>) -> Self {
        Self {
            store,
            staleness_window: DEFAULT_STALENESS_WINDOW,
        }
    }

    pub fn with_staleness_window(mut self, window: Duration) -> Self {
        self.staleness_window = window;
        self
    }

    pub fn staleness_window(&self) -> Duration {
        self.staleness_window
    }

    pub fn store(&self) -> &Arc<dyn AuthStore> {
        &self.store
    }

    /// Reads the store and classifies the record.
    pub fn status(&self) -> ConnectionStatus {
        self.status_at(Utc::now())
    }

    /// Same as [`status`](Self::status) with an explicit clock.
    pub fn status_at(&self, now: DateTime<Utc>) -> ConnectionStatus {
        let record = match self.store.read() {
            Ok(Some(record)) => record,
            Ok(None) => return ConnectionStatus::NotConnected,
            Err(e) => {
                warn!(error = %e, "could not read wallet record");
                return ConnectionStatus::Unreadable(e.to_string());
            }
        };

        if !record.is_authorized() {
            return ConnectionStatus::NotConnected;
        }

        let ahead = record.ahead_of(now);
        if ahead > MAX_CLOCK_SKEW {
            warn!(
                address = %record.address,
                ahead_secs = ahead.as_secs(),
                "wallet authorization is dated in the future, evicting"
            );
            self.evict();
            return ConnectionStatus::FutureDated { ahead };
        }

        let age = record.age_at(now);
        if age > self.staleness_window {
            info!(
                address = %record.address,
                age_secs = age.as_secs(),
                "wallet authorization is stale, evicting"
            );
            self.evict();
            return ConnectionStatus::Stale { age };
        }

        ConnectionStatus::Connected(record)
    }

    /// Returns `true` if `record` is authorized and fresh.
    ///
    /// A stale record is removed from the store as a side effect.
    pub fn is_usable(&self, record: &AuthorizationRecord) -> bool {
        self.is_usable_at(record, Utc::now())
    }

    pub fn is_usable_at(&self, record: &AuthorizationRecord, now: DateTime<Utc>) -> bool {
        if !record.is_authorized() {
            return false;
        }
        if record.ahead_of(now) > MAX_CLOCK_SKEW || record.age_at(now) > self.staleness_window {
            self.evict();
            return false;
        }
        true
    }

    /// Convenience for callers that only need a yes/no answer.
    pub fn is_wallet_connected(&self) -> bool {
        self.status().is_connected()
    }

    /// Returns the usable record, if any.
    pub fn usable_record(&self) -> Option<AuthorizationRecord> {
        match self.status() {
            ConnectionStatus::Connected(record) => Some(record),
            _ => None,
        }
    }

    /// Persists a freshly authorized record (manual connect).
    ///
    /// The address is trimmed; a blank address is rejected.
    pub fn connect(
        &self,
        address: &str,
        network: Network,
    ) -> Result<AuthorizationRecord, StoreError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(StoreError::EmptyAddress);
        }
        let record = AuthorizationRecord::new(address, network);
        self.store.write(&record)?;
        info!(address = %address, network = %network, "wallet connected");
        Ok(record)
    }

    /// Removes the stored record.
    pub fn disconnect(&self) -> Result<(), StoreError> {
        self.store.remove()?;
        info!("wallet disconnected");
        Ok(())
    }

    fn evict(&self) {
        if let Err(e) = self.store.remove() {
            warn!(error = %e, "failed to evict stale wallet record");
        } else {
            debug!("stale wallet record evicted");
        }
    }
}
