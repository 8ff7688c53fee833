//! # Shredder Core
//!
//! Splits a payload into fixed-size chunks, encrypts each chunk on its own,
//! and reassembles the original payload from those chunks in any order.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SHREDDER CORE MODULES                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────────────┐ │
//! │  │   Options   │  │   Context   │  │            Chunking             │ │
//! │  │             │  │             │  │                                 │ │
//! │  │ - Chunk size│  │ - Identifier│  │ - split_bytes / split_file     │ │
//! │  │ - Scheme    │  │ - Kind      │  │ - reassemble                   │ │
//! │  │ - Keys      │  │ - Count     │  │ - ChunkEnvelope (wire form)    │ │
//! │  └──────┬──────┘  └──────┬──────┘  └───────────────┬─────────────────┘ │
//! │         │                │                         │                   │
//! │         └────────────────┴────────────┬────────────┘                   │
//! │                                       │                                 │
//! │                         ┌─────────────┴─────────────┐                  │
//! │                         │          Crypto           │                  │
//! │                         │                           │                  │
//! │                         │ - AES-256-GCM             │                  │
//! │                         │ - X25519 sealed chunks    │                  │
//! │                         │ - Argon2id-locked keys    │                  │
//! │                         └───────────────────────────┘                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`options`] - Chunk size and encryption scheme selection
//! - [`context`] - Chunk set identity and the reassembled payload
//! - [`crypto`] - Encryption providers and key handling
//! - [`chunking`] - Splitting, reassembly, and the chunk wire form
//!
//! ## Example
//!
//! ```ignore
//! use shredder_core::{reassemble, split_file, crypto::KeyPair, Options};
//!
//! let recipient = KeyPair::generate();
//! let locked = recipient.lock(b"passphrase")?.to_bytes();
//!
//! let seal = Options::default()
//!     .with_chunk_size(64 * 1024)
//!     .with_public_key(recipient.public_key().to_bytes().to_vec());
//! let chunks = split_file("report.pdf", &contents, &seal)?;
//!
//! let open = Options::default()
//!     .with_chunk_size(64 * 1024)
//!     .with_private_key(locked, "passphrase");
//! let context = reassemble(&chunks, &open)?;
//! let (filename, bytes) = context.file()?;
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events and never installs a subscriber; that
//! is left to the application.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod chunking;
pub mod context;
pub mod crypto;
pub mod error;
pub mod options;

mod encoding;

#[cfg(test)]
mod proptests;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use chunking::{reassemble, split_bytes, split_file, Chunk, ChunkEnvelope, Chunks};
pub use context::{ContentKind, Context};
pub use error::{Error, Result};
pub use options::Options;

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of Shredder Core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
