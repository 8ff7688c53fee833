//! # Key Management
//!
//! X25519 keypairs for the asymmetric scheme, and the passphrase-locked form
//! a private key takes at rest.
//!
//! ## Key Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            KEY TYPES                                    │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  KeyPair            X25519 secret + public, in memory only             │
//! │     │                                                                   │
//! │     ├──► PublicKey         32 bytes, shared freely, seals chunks       │
//! │     │                                                                   │
//! │     └──► LockedPrivateKey  secret wrapped under a passphrase           │
//! │                                                                         │
//! │  LockedPrivateKey layout (113 bytes)                                   │
//! │  ┌───────┬─────┬────────────┬───────────┬─────────────────────────┐    │
//! │  │ SHPK  │ ver │ public 32B │ salt 16B  │ sealed secret 60B       │    │
//! │  └───────┴─────┴────────────┴───────────┴─────────────────────────┘    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroize;

use super::encryption::{self, NONCE_SIZE, TAG_SIZE};
use super::kdf::{compute_key_fingerprint, derive_passphrase_key};
use crate::error::{Error, Result};

/// Size of an X25519 public or secret key in bytes
pub const X25519_KEY_SIZE: usize = 32;

const LOCKED_MAGIC: &[u8; 4] = b"SHPK";
const LOCKED_VERSION: u8 = 1;
const SALT_SIZE: usize = 16;
const HEADER_SIZE: usize = LOCKED_MAGIC.len() + 1 + X25519_KEY_SIZE;
const LOCKED_SIZE: usize = HEADER_SIZE + SALT_SIZE + NONCE_SIZE + X25519_KEY_SIZE + TAG_SIZE;

/// X25519 public key used to seal chunks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey([u8; X25519_KEY_SIZE]);

impl PublicKey {
    /// Parse a public key, rejecting anything but 32 bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let key: [u8; X25519_KEY_SIZE] = bytes.try_into().map_err(|_| {
            Error::InvalidKey(format!(
                "expected a {}-byte X25519 public key, got {} bytes",
                X25519_KEY_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self(key))
    }

    /// Get the raw bytes
    pub fn to_bytes(&self) -> [u8; X25519_KEY_SIZE] {
        self.0
    }

    /// Short hex fingerprint, safe to log
    pub fn fingerprint(&self) -> String {
        compute_key_fingerprint(&self.0)
    }
}

/// X25519 keypair
///
/// The secret half is zeroized by `x25519_dalek` when dropped.
pub struct KeyPair {
    secret: StaticSecret,
    public: X25519PublicKey,
}

impl KeyPair {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Create from raw secret bytes
    pub fn from_secret_bytes(bytes: [u8; X25519_KEY_SIZE]) -> Self {
        let secret = StaticSecret::from(bytes);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    /// The public half, for sealing chunks
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.public.to_bytes())
    }

    /// Wrap the secret half under `passphrase` for storage or transfer.
    pub fn lock(&self, passphrase: &[u8]) -> Result<LockedPrivateKey> {
        let mut salt = [0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut salt);

        let header = locked_header(&self.public.to_bytes());
        let wrapping_key = derive_passphrase_key(passphrase, &salt)?;

        let mut secret = self.secret.to_bytes();
        let sealed = encryption::seal(&wrapping_key, &secret, &header);
        secret.zeroize();
        let sealed = sealed?;

        let mut bytes = Vec::with_capacity(LOCKED_SIZE);
        bytes.extend_from_slice(&header);
        bytes.extend_from_slice(&salt);
        bytes.extend_from_slice(&sealed);
        Ok(LockedPrivateKey { bytes })
    }

    /// Raw X25519 exchange with `their_public`
    pub(crate) fn diffie_hellman(&self, their_public: &PublicKey) -> [u8; 32] {
        self.secret
            .diffie_hellman(&X25519PublicKey::from(their_public.0))
            .to_bytes()
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public_key().fingerprint())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

fn locked_header(public: &[u8; X25519_KEY_SIZE]) -> [u8; HEADER_SIZE] {
    let mut header = [0u8; HEADER_SIZE];
    header[..4].copy_from_slice(LOCKED_MAGIC);
    header[4] = LOCKED_VERSION;
    header[5..].copy_from_slice(public);
    header
}

/// A private key encrypted under a passphrase-derived key
///
/// Holding one grants nothing without the passphrase; [`unlock`](Self::unlock)
/// checks the passphrase and returns the usable keypair.
#[derive(Clone, PartialEq, Eq)]
pub struct LockedPrivateKey {
    bytes: Vec<u8>,
}

impl LockedPrivateKey {
    /// Parse the serialized form, checking only its structure
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != LOCKED_SIZE {
            return Err(Error::InvalidKey(format!(
                "locked private key must be {} bytes, got {}",
                LOCKED_SIZE,
                bytes.len()
            )));
        }
        if &bytes[..4] != LOCKED_MAGIC {
            return Err(Error::InvalidKey("locked private key has wrong magic".into()));
        }
        if bytes[4] != LOCKED_VERSION {
            return Err(Error::InvalidKey(format!(
                "unsupported locked private key version {}",
                bytes[4]
            )));
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Serialized form
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// Public half, readable without the passphrase
    pub fn public_key(&self) -> PublicKey {
        let mut public = [0u8; X25519_KEY_SIZE];
        public.copy_from_slice(&self.bytes[5..HEADER_SIZE]);
        PublicKey(public)
    }

    /// Recover the keypair.
    ///
    /// ## Errors
    ///
    /// - `InvalidCredentials` if `passphrase` is wrong
    /// - `DecryptionFailed` if the unlocked secret does not match the stored
    ///   public key
    pub fn unlock(&self, passphrase: &[u8]) -> Result<KeyPair> {
        let (header, rest) = self.bytes.split_at(HEADER_SIZE);
        let (salt, sealed) = rest.split_at(SALT_SIZE);

        let wrapping_key = derive_passphrase_key(passphrase, salt)?;
        let mut secret = encryption::open(&wrapping_key, sealed, header)
            .map_err(|_| Error::credentials("passphrase does not unlock the private key"))?;

        let mut secret_bytes = [0u8; X25519_KEY_SIZE];
        let copied = secret.len() == X25519_KEY_SIZE;
        if copied {
            secret_bytes.copy_from_slice(&secret);
        }
        secret.zeroize();
        if !copied {
            return Err(Error::decryption("locked private key holds a malformed secret"));
        }

        let keypair = KeyPair::from_secret_bytes(secret_bytes);
        secret_bytes.zeroize();

        if keypair.public_key() != self.public_key() {
            return Err(Error::decryption(
                "locked private key does not match its public key",
            ));
        }
        Ok(keypair)
    }
}

impl std::fmt::Debug for LockedPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockedPrivateKey")
            .field("public", &self.public_key().fingerprint())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
