//! Private key decoding.
//!
//! Accepts the two shapes wallets export an Ed25519 key in:
//! base64 of `flag ‖ secret` (33 bytes, flag `0x00`) or hex of the
//! 32-byte secret with an optional `0x` prefix.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use ed25519_dalek::{SECRET_KEY_LENGTH, SigningKey};

use crate::error::KeyDecodeError;

/// Scheme flag prefixed to Ed25519 keys and signatures.
pub const ED25519_FLAG: u8 = 0x00;

/// Decodes a private key string into an Ed25519 signing key.
pub fn decode_private_key(input: &str) -> Result<SigningKey, KeyDecodeError> {
    decode_key_bytes(input).map(|bytes| SigningKey::from_bytes(&bytes))
}

/// Decodes a private key string into its 32 secret bytes.
pub fn decode_key_bytes(input: &str) -> Result<[u8; SECRET_KEY_LENGTH], KeyDecodeError> {
    let input = input.trim();
    let base64_bytes = BASE64.decode(input).ok();

    if let Some(raw) = &base64_bytes {
        if raw.len() == SECRET_KEY_LENGTH + 1 && raw[0] == ED25519_FLAG {
            return to_secret(&raw[1..]);
        }
    }

    let hex_str = input.strip_prefix("0x").unwrap_or(input);
    match (hex::decode(hex_str), base64_bytes) {
        (Ok(bytes), _) => to_secret(&bytes),
        (Err(_), Some(raw)) => Err(KeyDecodeError::InvalidLength(raw.len())),
        (Err(_), None) => Err(KeyDecodeError::Encoding),
    }
}

fn to_secret(bytes: &[u8]) -> Result<[u8; SECRET_KEY_LENGTH], KeyDecodeError> {
    bytes
        .try_into()
        .map_err(|_| KeyDecodeError::InvalidLength(bytes.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: [u8; 32] = [7u8; 32];

    #[test]
    fn base64_with_scheme_flag() {
        let bytes = decode_key_bytes("AAcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcH").unwrap();
        assert_eq!(bytes, SECRET);
    }

    #[test]
    fn hex_with_and_without_prefix() {
        let hex_key = hex::encode(SECRET);
        assert_eq!(decode_key_bytes(&hex_key).unwrap(), SECRET);
        assert_eq!(decode_key_bytes(&format!("0x{hex_key}")).unwrap(), SECRET);
        assert_eq!(decode_key_bytes(&format!("  {hex_key}\n")).unwrap(), SECRET);
    }

    #[test]
    fn short_hex_is_invalid_length() {
        assert_eq!(
            decode_key_bytes(&hex::encode([1u8; 16])).unwrap_err(),
            KeyDecodeError::InvalidLength(16)
        );
    }

    #[test]
    fn base64_without_flag_is_invalid_length() {
        let mut raw = vec![1u8];
        raw.extend_from_slice(&SECRET);
        let encoded = BASE64.encode(&raw);
        assert_eq!(
            decode_key_bytes(&encoded).unwrap_err(),
            KeyDecodeError::InvalidLength(33)
        );
    }

    #[test]
    fn garbage_is_encoding_error() {
        assert_eq!(
            decode_key_bytes("not a key!").unwrap_err(),
            KeyDecodeError::Encoding
        );
    }

    #[test]
    fn decodes_to_signing_key() {
        let key = decode_private_key(&hex::encode(SECRET)).unwrap();
        assert_eq!(key.to_bytes(), SECRET);
    }
}
