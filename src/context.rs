//! # Context
//!
//! Identity and shape of one payload's chunk set.
//!
//! A context is built once per split and shared, read-only, by every chunk
//! of that split. The payload itself is attached only to the context the
//! reassembler returns; a context riding on a chunk never holds one.
//!
//! ## Identifiers
//!
//! | Content kind | Identifier | Filename recoverable |
//! |--------------|------------|----------------------|
//! | `RawBytes` | random UUID v4 | no, `NotAFileContext` |
//! | `File` | standard base64 of the filename | yes |

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What kind of payload a chunk set carries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Anonymous bytes
    RawBytes,
    /// A named file; the identifier encodes the filename
    File,
}

/// Shared metadata for one payload's chunk set
#[derive(Clone, PartialEq, Eq)]
pub struct Context {
    identifier: String,
    content_kind: ContentKind,
    chunk_size: usize,
    chunk_count: u32,
    payload: Option<Vec<u8>>,
}

impl Context {
    /// Context for anonymous bytes, named by a fresh UUID
    pub(crate) fn for_bytes(chunk_size: usize, chunk_count: u32) -> Self {
        Self {
            identifier: uuid::Uuid::new_v4().to_string(),
            content_kind: ContentKind::RawBytes,
            chunk_size,
            chunk_count,
            payload: None,
        }
    }

    /// Context for a named file; the filename is encoded into the identifier
    pub(crate) fn for_file(filename: &str, chunk_size: usize, chunk_count: u32) -> Result<Self> {
        Ok(Self {
            identifier: encode_filename(filename)?,
            content_kind: ContentKind::File,
            chunk_size,
            chunk_count,
            payload: None,
        })
    }

    /// Rebuild a context from transported fields
    pub(crate) fn from_parts(
        identifier: String,
        content_kind: ContentKind,
        chunk_size: usize,
        chunk_count: u32,
    ) -> Self {
        Self {
            identifier,
            content_kind,
            chunk_size,
            chunk_count,
            payload: None,
        }
    }

    /// Same context, carrying the reassembled payload
    pub(crate) fn with_payload(&self, payload: Vec<u8>) -> Self {
        Self {
            payload: Some(payload),
            ..self.clone()
        }
    }

    /// Whether `other` describes the same chunk set
    pub(crate) fn same_chunk_set(&self, other: &Context) -> bool {
        self.identifier == other.identifier
            && self.content_kind == other.content_kind
            && self.chunk_count == other.chunk_count
            && self.chunk_size == other.chunk_size
    }

    /// Opaque name of this chunk set
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Kind of payload
    pub fn content_kind(&self) -> ContentKind {
        self.content_kind
    }

    /// Plaintext bytes per chunk used at split time
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of chunks in the set
    pub fn chunk_count(&self) -> u32 {
        self.chunk_count
    }

    /// Whether the payload is attached
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// The payload, or an empty slice when none is attached
    pub fn bytes(&self) -> &[u8] {
        self.payload.as_deref().unwrap_or_default()
    }

    /// The payload as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(self.bytes()).into_owned()
    }

    /// Take the payload
    pub fn into_bytes(self) -> Vec<u8> {
        self.payload.unwrap_or_default()
    }

    /// The filename encoded in the identifier, exactly as supplied at split time.
    ///
    /// ## Errors
    ///
    /// - `NotAFileContext` for raw bytes
    /// - `EncodingError` if the identifier does not decode
    pub fn filename(&self) -> Result<String> {
        if self.content_kind != ContentKind::File {
            return Err(Error::NotAFileContext);
        }
        decode_filename(&self.identifier)
    }

    /// Base name of the file and its payload.
    ///
    /// Directory components of the encoded filename are dropped.
    pub fn file(&self) -> Result<(String, &[u8])> {
        let filename = self.filename()?;
        let base = Path::new(&filename)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or(filename);
        Ok((base, self.bytes()))
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("identifier", &self.identifier)
            .field("content_kind", &self.content_kind)
            .field("chunk_size", &self.chunk_size)
            .field("chunk_count", &self.chunk_count)
            .field("payload_len", &self.payload.as_ref().map(Vec::len))
            .finish()
    }
}

/// Encode a filename as an identifier
pub fn encode_filename(filename: &str) -> Result<String> {
    if filename.is_empty() {
        return Err(Error::EncodingError("filename must not be empty".into()));
    }
    Ok(STANDARD.encode(filename.as_bytes()))
}

/// Decode an identifier produced by [`encode_filename`]
pub fn decode_filename(identifier: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(identifier)
        .map_err(|e| Error::EncodingError(format!("identifier is not base64: {}", e)))?;
    let filename = String::from_utf8(bytes)
        .map_err(|_| Error::EncodingError("filename is not valid UTF-8".into()))?;
    if filename.is_empty() {
        return Err(Error::EncodingError("identifier encodes an empty filename".into()));
    }
    Ok(filename)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_round_trip() {
        let context = Context::for_file("report.txt", 100, 1).unwrap();

        assert_eq!(context.content_kind(), ContentKind::File);
        assert_eq!(context.identifier(), "cmVwb3J0LnR4dA==");
        assert_eq!(context.filename().unwrap(), "report.txt");
    }

    #[test]
    fn test_file_strips_directories() {
        let context = Context::for_file("reports/2024/q1 report.txt", 100, 1)
            .unwrap()
            .with_payload(b"numbers".to_vec());

        assert_eq!(context.filename().unwrap(), "reports/2024/q1 report.txt");
        let (name, bytes) = context.file().unwrap();
        assert_eq!(name, "q1 report.txt");
        assert_eq!(bytes, b"numbers");
    }

    #[test]
    fn test_raw_bytes_has_no_filename() {
        let context = Context::for_bytes(100, 1);

        assert!(matches!(context.filename(), Err(Error::NotAFileContext)));
        assert!(matches!(context.file(), Err(Error::NotAFileContext)));
    }

    #[test]
    fn test_raw_bytes_identifiers_are_unique() {
        assert_ne!(
            Context::for_bytes(100, 1).identifier(),
            Context::for_bytes(100, 1).identifier()
        );
    }

    #[test]
    fn test_empty_filename_rejected() {
        assert!(matches!(
            Context::for_file("", 100, 1),
            Err(Error::EncodingError(_))
        ));
    }

    #[test]
    fn test_malformed_identifier() {
        let context = Context::from_parts("%%%".into(), ContentKind::File, 100, 1);
        assert!(matches!(context.filename(), Err(Error::EncodingError(_))));

        let not_utf8 = STANDARD.encode([0xFF, 0xFE]);
        let context = Context::from_parts(not_utf8, ContentKind::File, 100, 1);
        assert!(matches!(context.filename(), Err(Error::EncodingError(_))));
    }

    #[test]
    fn test_payload_accessors() {
        let context = Context::for_bytes(100, 1);
        assert!(!context.has_payload());
        assert!(context.bytes().is_empty());

        let context = context.with_payload("héllo".as_bytes().to_vec());
        assert!(context.has_payload());
        assert_eq!(context.text(), "héllo");
        assert_eq!(context.into_bytes(), "héllo".as_bytes());
    }

    #[test]
    fn test_same_chunk_set() {
        let a = Context::for_file("a.txt", 100, 3).unwrap();
        let b = a.with_payload(vec![1, 2, 3]);
        let c = Context::for_file("a.txt", 100, 4).unwrap();

        assert!(a.same_chunk_set(&b));
        assert!(!a.same_chunk_set(&c));
    }
}
