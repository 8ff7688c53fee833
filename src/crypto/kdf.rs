//! # Key Derivation
//!
//! Two derivations feed the encrypting providers:
//!
//! ```text
//! Sealed chunk (asymmetric scheme)
//!
//!   ephemeral_secret × recipient_public ──► DH output (32 bytes)
//!         │
//!         └──► HKDF-SHA256(salt = ephemeral_pub || recipient_pub,
//!                          info = "shredder-sealed-chunk-v1")  → chunk key
//!
//! Locked private key
//!
//!   passphrase + random salt ──► Argon2id ──► HKDF(info = "shredder-private-key-lock-v1")
//!                                                     → key-wrapping key
//! ```
//!
//! ## Security Considerations
//!
//! | Aspect | Design Choice |
//! |--------|---------------|
//! | Sealed-chunk KDF | HKDF-SHA256, both public keys as salt |
//! | Passphrase KDF | Argon2id v0x13, 19 MiB, 2 passes |
//! | Key Separation | Distinct `info` strings per purpose |
//! | Version String | "-v1" suffix |

use argon2::{Algorithm, Argon2, Params, Version};
use hkdf::Hkdf;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use super::encryption::{EncryptionKey, KEY_SIZE};
use crate::error::{Error, Result};

/// Domain separation strings for HKDF
pub mod domain {
    /// Domain for per-chunk keys of the asymmetric scheme
    pub const SEALED_CHUNK: &[u8] = b"shredder-sealed-chunk-v1";

    /// Domain for the key that wraps a private key at rest
    pub const PRIVATE_KEY_LOCK: &[u8] = b"shredder-private-key-lock-v1";
}

/// Argon2id memory cost in KiB (19 MiB)
const ARGON2_M_COST: u32 = 19 * 1024;

/// Argon2id passes
const ARGON2_T_COST: u32 = 2;

/// Argon2id lanes
const ARGON2_P_COST: u32 = 1;

/// Derive the key for one sealed chunk from an X25519 exchange.
///
/// Binding both public keys into the salt ties the key to this exact
/// sender/recipient pair.
pub fn derive_sealed_chunk_key(
    dh_output: &[u8; 32],
    ephemeral_public: &[u8; 32],
    recipient_public: &[u8; 32],
) -> Result<EncryptionKey> {
    let mut salt = [0u8; 64];
    salt[..32].copy_from_slice(ephemeral_public);
    salt[32..].copy_from_slice(recipient_public);

    let hkdf = Hkdf::<Sha256>::new(Some(&salt), dh_output);
    let mut key = [0u8; KEY_SIZE];
    hkdf.expand(domain::SEALED_CHUNK, &mut key)
        .map_err(|_| Error::encryption("HKDF expansion failed"))?;

    let derived = EncryptionKey::from_bytes(key);
    key.zeroize();
    Ok(derived)
}

/// Derive the key-wrapping key for a locked private key.
pub fn derive_passphrase_key(passphrase: &[u8], salt: &[u8]) -> Result<EncryptionKey> {
    let params = Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, Some(KEY_SIZE))
        .map_err(|e| Error::InvalidConfiguration(format!("Invalid Argon2 params: {}", e)))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut stretched = [0u8; KEY_SIZE];
    argon2
        .hash_password_into(passphrase, salt, &mut stretched)
        .map_err(|e| Error::credentials(format!("Argon2 failed: {}", e)))?;

    let hkdf = Hkdf::<Sha256>::new(None, &stretched);
    let mut key = [0u8; KEY_SIZE];
    let expanded = hkdf.expand(domain::PRIVATE_KEY_LOCK, &mut key);
    stretched.zeroize();
    expanded.map_err(|_| Error::credentials("HKDF expansion failed"))?;

    let derived = EncryptionKey::from_bytes(key);
    key.zeroize();
    Ok(derived)
}

/// Short hex fingerprint of a public key, safe to log.
pub fn compute_key_fingerprint(public_key: &[u8; 32]) -> String {
    hex::encode(&Sha256::digest(public_key)[..8])
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sealed_chunk_key_deterministic() {
        let key1 = derive_sealed_chunk_key(&[42u8; 32], &[1u8; 32], &[2u8; 32]).unwrap();
        let key2 = derive_sealed_chunk_key(&[42u8; 32], &[1u8; 32], &[2u8; 32]).unwrap();

        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_sealed_chunk_key_bound_to_public_keys() {
        let key1 = derive_sealed_chunk_key(&[42u8; 32], &[1u8; 32], &[2u8; 32]).unwrap();
        let key2 = derive_sealed_chunk_key(&[42u8; 32], &[1u8; 32], &[3u8; 32]).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_passphrase_key_depends_on_salt_and_passphrase() {
        let salt = [7u8; 16];
        let key1 = derive_passphrase_key(b"password", &salt).unwrap();
        let key2 = derive_passphrase_key(b"password", &salt).unwrap();
        let key3 = derive_passphrase_key(b"passw0rd", &salt).unwrap();
        let key4 = derive_passphrase_key(b"password", &[8u8; 16]).unwrap();

        assert_eq!(key1.as_bytes(), key2.as_bytes());
        assert_ne!(key1.as_bytes(), key3.as_bytes());
        assert_ne!(key1.as_bytes(), key4.as_bytes());
    }

    #[test]
    fn test_fingerprint_is_short_hex() {
        let fingerprint = compute_key_fingerprint(&[9u8; 32]);
        assert_eq!(fingerprint.len(), 16);
        assert_eq!(fingerprint, compute_key_fingerprint(&[9u8; 32]));
    }
}
