//! # Error Handling
//!
//! Error types for every shred and reassemble operation.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Configuration Errors                                              │
//! │  │   ├── InvalidConfiguration  - Bad chunk size / encryption selection │
//! │  │   └── InvalidKey            - Key material of the wrong shape       │
//! │  │                                                                      │
//! │  ├── Crypto Errors                                                     │
//! │  │   ├── EncryptionFailed      - Provider could not seal a chunk       │
//! │  │   ├── DecryptionFailed      - Wrong key, tampered ciphertext        │
//! │  │   └── InvalidCredentials    - Wrong passphrase for a private key    │
//! │  │                                                                      │
//! │  ├── Chunk Set Errors                                                  │
//! │  │   ├── IncompleteChunkSet    - Missing, duplicate, stray offsets    │
//! │  │   └── InconsistentChunkSet  - Chunks from different payloads       │
//! │  │                                                                      │
//! │  ├── Context Errors                                                    │
//! │  │   ├── NotAFileContext       - Filename requested on raw bytes       │
//! │  │   └── EncodingError         - Identifier does not decode            │
//! │  │                                                                      │
//! │  └── Wire Errors                                                       │
//! │      ├── SerializationError                                            │
//! │      └── DeserializationError                                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error is terminal for the call that produced it: a split never
//! returns a partial chunk set and a reassembly never returns a partial
//! payload.

use thiserror::Error;

/// Result type alias for shredder operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for shredder operations
#[derive(Error, Debug, Clone)]
pub enum Error {
    // ========================================================================
    // Configuration Errors (100-199)
    // ========================================================================

    /// Options are unusable (chunk size, conflicting or missing encryption)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Key bytes have the wrong length or format
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    // ========================================================================
    // Crypto Errors (200-299)
    // ========================================================================

    /// The provider failed to encrypt a chunk
    #[error("Encryption failed{}: {reason}", at_offset(.offset))]
    EncryptionFailed {
        /// Offset of the chunk being encrypted, if any
        offset: Option<u32>,
        /// What went wrong
        reason: String,
    },

    /// The provider failed to decrypt or authenticate a chunk
    #[error("Decryption failed{}: {reason}", at_offset(.offset))]
    DecryptionFailed {
        /// Offset of the chunk being decrypted, if any
        offset: Option<u32>,
        /// What went wrong
        reason: String,
    },

    /// The private key could not be unlocked with the supplied passphrase
    #[error("Invalid credentials{}: {reason}", at_offset(.offset))]
    InvalidCredentials {
        /// Offset of the chunk being decrypted, if any
        offset: Option<u32>,
        /// What went wrong
        reason: String,
    },

    // ========================================================================
    // Chunk Set Errors (300-399)
    // ========================================================================

    /// Offsets present do not cover `0..expected` exactly once
    ///
    /// Each list holds at most the first 32 offsets of its kind.
    #[error(
        "Incomplete chunk set: expected {expected} chunks, missing offsets {missing:?}, duplicate offsets {duplicates:?}, out-of-range offsets {out_of_range:?}"
    )]
    IncompleteChunkSet {
        /// Number of chunks the set should contain
        expected: u32,
        /// Offsets absent from the input
        missing: Vec<u32>,
        /// Offsets seen more than once
        duplicates: Vec<u32>,
        /// Offsets at or past `expected`
        out_of_range: Vec<u32>,
    },

    /// Chunks from different payloads were mixed in one call
    #[error("Inconsistent chunk set: {0}")]
    InconsistentChunkSet(String),

    // ========================================================================
    // Context Errors (400-499)
    // ========================================================================

    /// A filename was requested from a raw-bytes context
    #[error("Context does not describe a file")]
    NotAFileContext,

    /// The identifier could not be encoded or decoded as a filename
    #[error("Encoding error: {0}")]
    EncodingError(String),

    // ========================================================================
    // Wire Errors (900-999)
    // ========================================================================

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

fn at_offset(offset: &Option<u32>) -> String {
    match offset {
        Some(offset) => format!(" at chunk offset {}", offset),
        None => String::new(),
    }
}

impl Error {
    /// Shorthand for a provider-level encryption failure
    pub fn encryption(reason: impl Into<String>) -> Self {
        Error::EncryptionFailed {
            offset: None,
            reason: reason.into(),
        }
    }

    /// Shorthand for a provider-level decryption failure
    pub fn decryption(reason: impl Into<String>) -> Self {
        Error::DecryptionFailed {
            offset: None,
            reason: reason.into(),
        }
    }

    /// Shorthand for a passphrase failure
    pub fn credentials(reason: impl Into<String>) -> Self {
        Error::InvalidCredentials {
            offset: None,
            reason: reason.into(),
        }
    }

    /// Attribute a crypto error to the chunk at `offset`.
    ///
    /// Errors that are not tied to a single chunk are returned unchanged.
    pub fn at_chunk(self, chunk_offset: u32) -> Self {
        match self {
            Error::EncryptionFailed { reason, .. } => Error::EncryptionFailed {
                offset: Some(chunk_offset),
                reason,
            },
            Error::DecryptionFailed { reason, .. } => Error::DecryptionFailed {
                offset: Some(chunk_offset),
                reason,
            },
            Error::InvalidCredentials { reason, .. } => Error::InvalidCredentials {
                offset: Some(chunk_offset),
                reason,
            },
            other => other,
        }
    }

    /// Offset of the chunk this error is attributed to, if any
    pub fn offset(&self) -> Option<u32> {
        match self {
            Error::EncryptionFailed { offset, .. }
            | Error::DecryptionFailed { offset, .. }
            | Error::InvalidCredentials { offset, .. } => *offset,
            _ => None,
        }
    }

    /// Get the numeric error code
    ///
    /// Error codes are organized by category:
    /// - 100-199: Configuration
    /// - 200-299: Crypto
    /// - 300-399: Chunk sets
    /// - 400-499: Context
    /// - 900-999: Wire
    pub fn code(&self) -> i32 {
        match self {
            // Configuration (100-199)
            Error::InvalidConfiguration(_) => 100,
            Error::InvalidKey(_) => 101,

            // Crypto (200-299)
            Error::EncryptionFailed { .. } => 200,
            Error::DecryptionFailed { .. } => 201,
            Error::InvalidCredentials { .. } => 202,

            // Chunk sets (300-399)
            Error::IncompleteChunkSet { .. } => 300,
            Error::InconsistentChunkSet(_) => 301,

            // Context (400-499)
            Error::NotAFileContext => 400,
            Error::EncodingError(_) => 401,

            // Wire (900-999)
            Error::SerializationError(_) => 900,
            Error::DeserializationError(_) => 901,
        }
    }

    /// Check if this error is recoverable
    ///
    /// Only a missing chunk can be fixed without changing inputs: the caller
    /// may fetch it again and retry. Nothing is retried internally.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::IncompleteChunkSet { missing, duplicates, out_of_range, .. }
                if !missing.is_empty() && duplicates.is_empty() && out_of_range.is_empty()
        )
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            Error::DeserializationError(err.to_string())
        } else {
            Error::SerializationError(err.to_string())
        }
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::InvalidConfiguration("test".into()).code(), 100);
        assert_eq!(Error::encryption("test").code(), 200);
        assert_eq!(Error::decryption("test").code(), 201);
        assert_eq!(Error::credentials("test").code(), 202);
        assert_eq!(Error::InconsistentChunkSet("test".into()).code(), 301);
        assert_eq!(Error::NotAFileContext.code(), 400);
        assert_eq!(Error::DeserializationError("test".into()).code(), 901);
    }

    #[test]
    fn test_at_chunk_attributes_crypto_errors() {
        let err = Error::decryption("tag mismatch").at_chunk(7);
        assert_eq!(err.offset(), Some(7));
        assert!(err.to_string().contains("at chunk offset 7"), "Error: {}", err);

        let err = Error::NotAFileContext.at_chunk(7);
        assert!(matches!(err, Error::NotAFileContext));
        assert_eq!(err.offset(), None);
    }

    #[test]
    fn test_recoverable_errors() {
        let missing = Error::IncompleteChunkSet {
            expected: 3,
            missing: vec![1],
            duplicates: vec![],
            out_of_range: vec![],
        };
        let duplicated = Error::IncompleteChunkSet {
            expected: 3,
            missing: vec![],
            duplicates: vec![1],
            out_of_range: vec![],
        };

        assert!(missing.is_recoverable());
        assert!(!duplicated.is_recoverable());
        assert!(!Error::decryption("bad key").is_recoverable());
    }
}
