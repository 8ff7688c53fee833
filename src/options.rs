//! # Options
//!
//! Configuration for one split or reassembly: the chunk size and exactly one
//! encryption scheme.
//!
//! Options are assembled field by field (builder methods, or JSON from the
//! host application) and then resolved once into an [`Encryption`] value.
//! Resolution is where conflicting or missing selections are rejected.
//!
//! ```text
//! Options { unencrypted, symmetric, asymmetric }
//!                     │
//!                     ▼  Options::encryption()
//!   exactly one set?  ── no ──► InvalidConfiguration
//!                     │
//!                    yes
//!                     ▼
//!   Encryption::{None | Symmetric | Asymmetric}
//! ```

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::encoding::{base64_bytes, base64_opt_bytes};
use crate::error::{Error, Result};

/// Default chunk size: 256 KB
pub const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

/// Shared-secret encryption settings
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricOptions {
    /// 32-byte AES-256 key
    #[serde(with = "base64_bytes")]
    pub key: Vec<u8>,
}

/// Public-key encryption settings
///
/// Sealing needs `public_key`; opening needs `private_key` (in its locked
/// form) and `passphrase`. Either half may be absent.
#[derive(Clone, Default, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct AsymmetricOptions {
    /// 32-byte X25519 public key
    #[serde(default, with = "base64_opt_bytes")]
    pub public_key: Option<Vec<u8>>,
    /// Serialized `LockedPrivateKey`
    #[serde(default, with = "base64_opt_bytes")]
    pub private_key: Option<Vec<u8>>,
    /// Passphrase unlocking `private_key`
    #[serde(default)]
    pub passphrase: Option<String>,
}

/// Resolved encryption selection, borrowing key material from [`Options`]
#[derive(Clone, Copy)]
pub enum Encryption<'a> {
    /// Chunks are stored as plaintext
    None,
    /// AES-256-GCM under a shared key
    Symmetric {
        /// Shared key
        key: &'a [u8],
    },
    /// X25519 sealed box
    Asymmetric {
        /// Recipient public key
        public_key: Option<&'a [u8]>,
        /// Locked private key
        private_key: Option<&'a [u8]>,
        /// Passphrase for the private key
        passphrase: Option<&'a [u8]>,
    },
}

/// Immutable configuration for shredding and reassembly
#[derive(Clone, Serialize, Deserialize)]
pub struct Options {
    /// Plaintext bytes per chunk; must be positive
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Explicitly select no encryption
    #[serde(default)]
    pub unencrypted: bool,
    /// Shared-secret scheme
    #[serde(default)]
    pub symmetric: Option<SymmetricOptions>,
    /// Public-key scheme
    #[serde(default)]
    pub asymmetric: Option<AsymmetricOptions>,
}

impl Default for Options {
    /// 256 KB chunks, no encryption
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            unencrypted: true,
            symmetric: None,
            asymmetric: None,
        }
    }
}

impl Options {
    /// Set the chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Select no encryption
    pub fn unencrypted(mut self) -> Self {
        self.unencrypted = true;
        self
    }

    /// Select AES-256-GCM with `key`
    pub fn with_symmetric_key(mut self, key: Vec<u8>) -> Self {
        self.unencrypted = false;
        self.symmetric = Some(SymmetricOptions { key });
        self
    }

    /// Select the public-key scheme, sealing to `public_key`
    pub fn with_public_key(mut self, public_key: Vec<u8>) -> Self {
        self.unencrypted = false;
        self.asymmetric
            .get_or_insert_with(AsymmetricOptions::default)
            .public_key = Some(public_key);
        self
    }

    /// Select the public-key scheme, opening with a locked private key
    pub fn with_private_key(mut self, private_key: Vec<u8>, passphrase: impl Into<String>) -> Self {
        self.unencrypted = false;
        let asymmetric = self.asymmetric.get_or_insert_with(AsymmetricOptions::default);
        asymmetric.private_key = Some(private_key);
        asymmetric.passphrase = Some(passphrase.into());
        self
    }

    /// Load options from JSON; key bytes are standard base64 strings.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Options = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Serialize to JSON, key material included
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check the chunk size and that exactly one scheme is selected
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfiguration(
                "chunk size must be > 0".to_string(),
            ));
        }
        self.encryption().map(|_| ())
    }

    /// Resolve the selected scheme.
    ///
    /// ## Errors
    ///
    /// `InvalidConfiguration` if more than one scheme is selected, or none is.
    pub fn encryption(&self) -> Result<Encryption<'_>> {
        let selected = [
            self.unencrypted,
            self.symmetric.is_some(),
            self.asymmetric.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count();

        match selected {
            0 => Err(Error::InvalidConfiguration(
                "no encryption scheme selected".to_string(),
            )),
            1 => Ok(self.resolve()),
            _ => Err(Error::InvalidConfiguration(
                "more than one encryption scheme selected".to_string(),
            )),
        }
    }

    fn resolve(&self) -> Encryption<'_> {
        if let Some(symmetric) = &self.symmetric {
            return Encryption::Symmetric {
                key: &symmetric.key,
            };
        }
        if let Some(asymmetric) = &self.asymmetric {
            return Encryption::Asymmetric {
                public_key: asymmetric.public_key.as_deref(),
                private_key: asymmetric.private_key.as_deref(),
                passphrase: asymmetric.passphrase.as_ref().map(|p| p.as_bytes()),
            };
        }
        Encryption::None
    }
}

impl std::fmt::Debug for Encryption<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Encryption::None => f.write_str("None"),
            Encryption::Symmetric { .. } => f
                .debug_struct("Symmetric")
                .field("key", &"[REDACTED]")
                .finish(),
            Encryption::Asymmetric {
                public_key,
                private_key,
                passphrase,
            } => f
                .debug_struct("Asymmetric")
                .field("public_key", &public_key.map(|k| k.len()))
                .field("private_key", &private_key.map(|_| "[REDACTED]"))
                .field("passphrase", &passphrase.map(|_| "[REDACTED]"))
                .finish(),
        }
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scheme = match self.encryption() {
            Ok(Encryption::None) => "none",
            Ok(Encryption::Symmetric { .. }) => "symmetric",
            Ok(Encryption::Asymmetric { .. }) => "asymmetric",
            Err(_) => "unresolved",
        };
        f.debug_struct("Options")
            .field("chunk_size", &self.chunk_size)
            .field("encryption", &scheme)
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
