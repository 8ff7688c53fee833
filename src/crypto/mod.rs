//! # Cryptography Module
//!
//! Every cryptographic primitive the shredder applies to a chunk.
//!
//! ## Security Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CRYPTOGRAPHIC ARCHITECTURE                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 SYMMETRIC SCHEME                                │   │
//! │  ├─────────────────────────────────────────────────────────────────┤   │
//! │  │                                                                 │   │
//! │  │  Shared 256-bit key, AES-256-GCM per chunk                     │   │
//! │  │  • 96-bit nonce (random per chunk)                             │   │
//! │  │  • 128-bit authentication tag                                  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 ASYMMETRIC SCHEME                               │   │
//! │  ├─────────────────────────────────────────────────────────────────┤   │
//! │  │                                                                 │   │
//! │  │  1. Key Exchange: X25519 ECDH                                  │   │
//! │  │     Ephemeral Private × Recipient Public = Shared Secret      │   │
//! │  │                                                                 │   │
//! │  │  2. Key Derivation: HKDF-SHA256                                │   │
//! │  │     salt = ephemeral_pub || recipient_pub                     │   │
//! │  │                                                                 │   │
//! │  │  3. Encryption: AES-256-GCM, ephemeral_pub as AAD             │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 PRIVATE KEY AT REST                             │   │
//! │  ├─────────────────────────────────────────────────────────────────┤   │
//! │  │                                                                 │   │
//! │  │  Passphrase ──► Argon2id(salt) ──► HKDF ──► AES-256-GCM key    │   │
//! │  │                                                                 │   │
//! │  │  The X25519 secret is sealed under that key; a wrong          │   │
//! │  │  passphrase fails the tag check.                              │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use shredder_core::crypto::KeyPair;
//!
//! let recipient = KeyPair::generate();
//! let locked = recipient.lock(b"correct horse")?;
//!
//! // Share recipient.public_key(), store locked.to_bytes()
//! ```

mod encryption;
mod kdf;
mod keys;
mod provider;

pub use encryption::{open, seal, EncryptionKey, KEY_SIZE, NONCE_SIZE, TAG_SIZE};
pub use kdf::compute_key_fingerprint;
pub use keys::{KeyPair, LockedPrivateKey, PublicKey, X25519_KEY_SIZE};
pub use provider::{
    provider_for, AsymmetricProvider, EncryptionProvider, NoEncryption, Scheme,
    SymmetricProvider,
};

/// Generate a random key for the symmetric scheme
pub fn generate_symmetric_key() -> Vec<u8> {
    let key = EncryptionKey::generate();
    key.as_bytes().to_vec()
}
