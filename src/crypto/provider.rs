//! # Encryption Providers
//!
//! Uniform `encrypt` / `decrypt` over one chunk's bytes. The splitter and
//! reassembler only ever see a `dyn EncryptionProvider`; which scheme sits
//! behind it is decided once, from [`Options`], by [`provider_for`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      PROVIDER VARIANTS                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  None        identity                                                  │
//! │                                                                         │
//! │  Symmetric   AES-256-GCM(shared key)                                   │
//! │              chunk = nonce || ciphertext || tag                        │
//! │                                                                         │
//! │  Asymmetric  X25519 sealed box                                         │
//! │              ephemeral × recipient ──► HKDF ──► AES-256-GCM            │
//! │              chunk = ephemeral_pub || nonce || ciphertext || tag       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No provider keeps state between chunks: any chunk can be opened alone.

use once_cell::sync::OnceCell;
use rand::rngs::OsRng;
use x25519_dalek::{EphemeralSecret, PublicKey as X25519PublicKey};
use zeroize::Zeroize;

use super::encryption::{self, EncryptionKey};
use super::kdf::derive_sealed_chunk_key;
use super::keys::{KeyPair, LockedPrivateKey, PublicKey, X25519_KEY_SIZE};
use crate::error::{Error, Result};
use crate::options::{Encryption, Options};

/// Which scheme a provider implements
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheme {
    /// Chunks are stored as plaintext
    None,
    /// Shared secret key
    Symmetric,
    /// Public key seals, private key opens
    Asymmetric,
}

/// Encrypt and decrypt a single chunk's bytes.
///
/// Implementations must be usable from several threads at once and must not
/// carry state from one chunk to the next.
pub trait EncryptionProvider: Send + Sync {
    /// Encrypt one chunk of plaintext
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt one chunk, failing loudly on a wrong key or tampering
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// The scheme behind this provider
    fn scheme(&self) -> Scheme;
}

/// Build the provider selected by `options`.
///
/// Fails with `InvalidConfiguration` unless exactly one scheme is selected.
pub fn provider_for(options: &Options) -> Result<Box<dyn EncryptionProvider>> {
    let provider: Box<dyn EncryptionProvider> = match options.encryption()? {
        Encryption::None => Box::new(NoEncryption),
        Encryption::Symmetric { key } => Box::new(SymmetricProvider::new(key)?),
        Encryption::Asymmetric {
            public_key,
            private_key,
            passphrase,
        } => Box::new(AsymmetricProvider::new(public_key, private_key, passphrase)?),
    };
    tracing::debug!("Resolved {:?} encryption provider", provider.scheme());
    Ok(provider)
}

// ============================================================================
// NONE
// ============================================================================

/// Identity provider
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEncryption;

impl EncryptionProvider for NoEncryption {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        Ok(plaintext.to_vec())
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        Ok(ciphertext.to_vec())
    }

    fn scheme(&self) -> Scheme {
        Scheme::None
    }
}

// ============================================================================
// SYMMETRIC
// ============================================================================

/// AES-256-GCM under one shared key
#[derive(Debug)]
pub struct SymmetricProvider {
    key: EncryptionKey,
}

impl SymmetricProvider {
    /// Create from a 32-byte key
    pub fn new(key: &[u8]) -> Result<Self> {
        let key = EncryptionKey::from_slice(key)
            .map_err(|e| Error::InvalidConfiguration(format!("symmetric key: {}", e)))?;
        Ok(Self { key })
    }
}

impl EncryptionProvider for SymmetricProvider {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        encryption::seal(&self.key, plaintext, &[])
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        encryption::open(&self.key, ciphertext, &[])
    }

    fn scheme(&self) -> Scheme {
        Scheme::Symmetric
    }
}

// ============================================================================
// ASYMMETRIC
// ============================================================================

/// X25519 sealed-box provider
///
/// An instance may hold only the half it needs: a public key to encrypt, or a
/// locked private key plus passphrase to decrypt. The passphrase is checked on
/// the first decrypt, not here, and the outcome is kept for every later chunk.
pub struct AsymmetricProvider {
    recipient: Option<PublicKey>,
    locked: Option<(LockedPrivateKey, Option<Vec<u8>>)>,
    unlocked: OnceCell<Result<KeyPair>>,
}

impl AsymmetricProvider {
    /// Create from whichever key material is available.
    ///
    /// ## Errors
    ///
    /// - `EncryptionFailed` if the public key is malformed
    /// - `DecryptionFailed` if the locked private key is malformed
    /// - `InvalidConfiguration` if there is neither a public key nor a
    ///   private key
    ///
    /// A missing or wrong passphrase surfaces as `InvalidCredentials` from
    /// the first [`decrypt`](EncryptionProvider::decrypt).
    pub fn new(
        public_key: Option<&[u8]>,
        private_key: Option<&[u8]>,
        passphrase: Option<&[u8]>,
    ) -> Result<Self> {
        let recipient = public_key
            .map(PublicKey::from_bytes)
            .transpose()
            .map_err(|e| Error::encryption(format!("public key: {}", e)))?;

        let locked = private_key
            .map(|private_key| {
                LockedPrivateKey::from_bytes(private_key)
                    .map(|locked| (locked, passphrase.map(<[u8]>::to_vec)))
                    .map_err(|e| Error::decryption(format!("private key: {}", e)))
            })
            .transpose()?;

        if recipient.is_none() && locked.is_none() {
            return Err(Error::InvalidConfiguration(
                "asymmetric encryption needs a public key or a private key".into(),
            ));
        }

        if let Some(recipient) = &recipient {
            tracing::debug!("Sealing chunks to public key {}", recipient.fingerprint());
        }

        Ok(Self {
            recipient,
            locked,
            unlocked: OnceCell::new(),
        })
    }

    /// Encrypt-only provider
    pub fn for_recipient(recipient: PublicKey) -> Self {
        Self {
            recipient: Some(recipient),
            locked: None,
            unlocked: OnceCell::new(),
        }
    }

    fn keypair(&self) -> Result<&KeyPair> {
        let (locked, passphrase) = self.locked.as_ref().ok_or_else(|| {
            Error::InvalidConfiguration("asymmetric provider holds no private key".into())
        })?;
        self.unlocked
            .get_or_init(|| match passphrase {
                Some(passphrase) => locked.unlock(passphrase),
                None => Err(Error::credentials("no passphrase supplied for the private key")),
            })
            .as_ref()
            .map_err(|e| e.clone())
    }
}

impl EncryptionProvider for AsymmetricProvider {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let recipient = self.recipient.ok_or_else(|| {
            Error::InvalidConfiguration("asymmetric provider holds no public key".into())
        })?;

        let ephemeral = EphemeralSecret::random_from_rng(OsRng);
        let ephemeral_public = X25519PublicKey::from(&ephemeral).to_bytes();
        let shared = ephemeral.diffie_hellman(&X25519PublicKey::from(recipient.to_bytes()));
        if !shared.was_contributory() {
            return Err(Error::encryption("public key is a low-order point"));
        }

        let mut dh_output = shared.to_bytes();
        let key = derive_sealed_chunk_key(&dh_output, &ephemeral_public, &recipient.to_bytes());
        dh_output.zeroize();
        let sealed = encryption::seal(&key?, plaintext, &ephemeral_public)?;

        let mut out = Vec::with_capacity(X25519_KEY_SIZE + sealed.len());
        out.extend_from_slice(&ephemeral_public);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < X25519_KEY_SIZE {
            return Err(Error::decryption(format!(
                "sealed chunk is {} bytes, shorter than an ephemeral key",
                ciphertext.len()
            )));
        }
        let keypair = self.keypair()?;

        let (ephemeral_public, sealed) = ciphertext.split_at(X25519_KEY_SIZE);
        let ephemeral_public = PublicKey::from_bytes(ephemeral_public)?;

        let mut dh_output = keypair.diffie_hellman(&ephemeral_public);
        let key = derive_sealed_chunk_key(
            &dh_output,
            &ephemeral_public.to_bytes(),
            &keypair.public_key().to_bytes(),
        );
        dh_output.zeroize();
        let key = key.map_err(|e| Error::decryption(e.to_string()))?;

        encryption::open(&key, sealed, &ephemeral_public.to_bytes())
    }

    fn scheme(&self) -> Scheme {
        Scheme::Asymmetric
    }
}

impl Drop for AsymmetricProvider {
    fn drop(&mut self) {
        if let Some((_, Some(passphrase))) = self.locked.as_mut() {
            passphrase.zeroize();
        }
    }
}

impl std::fmt::Debug for AsymmetricProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsymmetricProvider")
            .field("recipient", &self.recipient.map(|k| k.fingerprint()))
            .field("can_decrypt", &self.locked.is_some())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn decrypting(keypair: &KeyPair, passphrase: &[u8]) -> AsymmetricProvider {
        let locked = keypair.lock(b"password").unwrap().to_bytes();
        AsymmetricProvider::new(None, Some(&locked), Some(passphrase)).unwrap()
    }

    #[test]
    fn test_no_encryption_is_identity() {
        let provider = NoEncryption;
        assert_eq!(provider.encrypt(b"plain").unwrap(), b"plain");
        assert_eq!(provider.decrypt(b"plain").unwrap(), b"plain");
        assert_eq!(provider.scheme(), Scheme::None);
    }

    #[test]
    fn test_symmetric_round_trip() {
        let provider = SymmetricProvider::new(&[7u8; 32]).unwrap();
        let ciphertext = provider.encrypt(b"chunk bytes").unwrap();

        assert_ne!(ciphertext, b"chunk bytes");
        assert_eq!(provider.decrypt(&ciphertext).unwrap(), b"chunk bytes");
    }

    #[test]
    fn test_symmetric_wrong_key_fails() {
        let ciphertext = SymmetricProvider::new(&[7u8; 32])
            .unwrap()
            .encrypt(b"chunk bytes")
            .unwrap();
        let err = SymmetricProvider::new(&[8u8; 32])
            .unwrap()
            .decrypt(&ciphertext)
            .unwrap_err();

        assert!(matches!(err, Error::DecryptionFailed { .. }));
    }

    #[test]
    fn test_symmetric_rejects_short_key() {
        let err = SymmetricProvider::new(&[7u8; 16]).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_asymmetric_round_trip() {
        let keypair = KeyPair::generate();
        let sealer = AsymmetricProvider::for_recipient(keypair.public_key());
        let opener = decrypting(&keypair, b"password");

        let ciphertext = sealer.encrypt(b"sealed chunk").unwrap();
        assert_eq!(opener.decrypt(&ciphertext).unwrap(), b"sealed chunk");
        // Second chunk reuses the cached unlocked key.
        let ciphertext = sealer.encrypt(b"").unwrap();
        assert!(opener.decrypt(&ciphertext).unwrap().is_empty());
    }

    #[test]
    fn test_asymmetric_wrong_passphrase_fails_at_decrypt() {
        let keypair = KeyPair::generate();
        let ciphertext = AsymmetricProvider::for_recipient(keypair.public_key())
            .encrypt(b"sealed chunk")
            .unwrap();

        // Construction succeeds; the passphrase is only checked here.
        let opener = decrypting(&keypair, b"wrong");
        let err = opener.decrypt(&ciphertext).unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials { .. }), "Error: {}", err);
    }

    #[test]
    fn test_asymmetric_wrong_private_key_fails() {
        let ciphertext = AsymmetricProvider::for_recipient(KeyPair::generate().public_key())
            .encrypt(b"sealed chunk")
            .unwrap();

        let err = decrypting(&KeyPair::generate(), b"password")
            .decrypt(&ciphertext)
            .unwrap_err();
        assert!(matches!(err, Error::DecryptionFailed { .. }), "Error: {}", err);
    }

    #[test]
    fn test_asymmetric_encrypt_only_cannot_decrypt() {
        let sealer = AsymmetricProvider::for_recipient(KeyPair::generate().public_key());
        let ciphertext = sealer.encrypt(b"x").unwrap();

        assert!(matches!(
            sealer.decrypt(&ciphertext),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_asymmetric_decrypt_only_cannot_encrypt() {
        let opener = decrypting(&KeyPair::generate(), b"password");
        assert!(matches!(
            opener.encrypt(b"x"),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_asymmetric_malformed_public_key() {
        let err = AsymmetricProvider::new(Some(&[1u8; 5]), None, None).unwrap_err();
        assert!(matches!(err, Error::EncryptionFailed { .. }), "Error: {}", err);
    }

    #[test]
    fn test_asymmetric_low_order_public_key() {
        let err = AsymmetricProvider::for_recipient(PublicKey::from_bytes(&[0u8; 32]).unwrap())
            .encrypt(b"x")
            .unwrap_err();
        assert!(matches!(err, Error::EncryptionFailed { .. }), "Error: {}", err);
    }

    #[test]
    fn test_asymmetric_private_key_without_passphrase() {
        let keypair = KeyPair::generate();
        let ciphertext = AsymmetricProvider::for_recipient(keypair.public_key())
            .encrypt(b"sealed chunk")
            .unwrap();
        let locked = keypair.lock(b"password").unwrap().to_bytes();

        let opener = AsymmetricProvider::new(None, Some(&locked), None).unwrap();
        let err = opener.decrypt(&ciphertext).unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials { .. }), "Error: {}", err);
    }

    #[test]
    fn test_failed_unlock_is_remembered() {
        let keypair = KeyPair::generate();
        let sealer = AsymmetricProvider::for_recipient(keypair.public_key());
        let opener = decrypting(&keypair, b"wrong");

        let first = opener.decrypt(&sealer.encrypt(b"one").unwrap()).unwrap_err();
        assert!(matches!(opener.unlocked.get(), Some(Err(Error::InvalidCredentials { .. }))));

        let second = opener.decrypt(&sealer.encrypt(b"two").unwrap()).unwrap_err();
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_asymmetric_truncated_chunk() {
        let opener = decrypting(&KeyPair::generate(), b"password");
        let err = opener.decrypt(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, Error::DecryptionFailed { .. }));
    }

    #[test]
    fn test_provider_for_resolves_scheme() {
        let options = Options::default();
        assert_eq!(provider_for(&options).unwrap().scheme(), Scheme::None);

        let options = Options::default().with_symmetric_key(vec![1u8; 32]);
        assert_eq!(provider_for(&options).unwrap().scheme(), Scheme::Symmetric);

        let options =
            Options::default().with_public_key(KeyPair::generate().public_key().to_bytes().to_vec());
        assert_eq!(provider_for(&options).unwrap().scheme(), Scheme::Asymmetric);
    }
}
