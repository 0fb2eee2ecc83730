//! Sui address derivation and transaction signing.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};

use crate::key::ED25519_FLAG;

type Blake2b256 = Blake2b<U32>;

/// Intent prefix for a transaction signed by a user (scope, version, app id).
pub const TRANSACTION_INTENT: [u8; 3] = [0, 0, 0];

/// Signs transactions on behalf of one Ed25519 account.
#[derive(Clone)]
pub struct SuiSigner {
    key: SigningKey,
}

impl SuiSigner {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    /// The account address, `0x`-prefixed hex.
    pub fn address(&self) -> String {
        derive_address(&self.verifying_key())
    }

    /// Signs BCS transaction bytes and returns the serialized signature
    /// (`base64(flag ‖ signature ‖ public key)`).
    pub fn sign_transaction(&self, tx_bytes: &[u8]) -> String {
        let digest = intent_digest(tx_bytes);
        let signature = self.key.sign(&digest);

        let mut serialized = Vec::with_capacity(1 + 64 + 32);
        serialized.push(ED25519_FLAG);
        serialized.extend_from_slice(&signature.to_bytes());
        serialized.extend_from_slice(self.verifying_key().as_bytes());
        BASE64.encode(serialized)
    }
}

impl std::fmt::Debug for SuiSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiSigner")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Derives the Sui address of an Ed25519 public key.
pub fn derive_address(public_key: &VerifyingKey) -> String {
    let mut hasher = Blake2b256::new();
    hasher.update([ED25519_FLAG]);
    hasher.update(public_key.as_bytes());
    format!("0x{}", hex::encode(hasher.finalize()))
}

/// Digest actually signed for a transaction: blake2b-256 of intent ‖ bytes.
pub fn intent_digest(tx_bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(TRANSACTION_INTENT);
    hasher.update(tx_bytes);
    hasher.finalize().into()
}
