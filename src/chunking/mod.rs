//! # Chunking
//!
//! Splits payloads into independently encrypted chunks and reassembles them.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         CHUNK SHREDDING                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Split:                                                                │
//! │  1. Validate options, resolve the encryption provider                  │
//! │  2. Build one shared Context (identifier, chunk count)                 │
//! │  3. Cut the payload into chunk_size slices (empty → one empty slice)   │
//! │  4. Encrypt each slice, tag it with its offset                         │
//! │                                                                         │
//! │  Output: Chunks (offsets 0..count)                                     │
//! │                                                                         │
//! │  ── transport / storage (ChunkEnvelope, any order) ──                  │
//! │                                                                         │
//! │  Reassemble:                                                           │
//! │  1. Every chunk names the same chunk set                               │
//! │  2. Offsets are exactly 0..count, no gaps, no repeats                  │
//! │  3. Sort by offset                                                     │
//! │  4. Decrypt each chunk                                                 │
//! │  5. Concatenate into the Context payload                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod envelope;
mod reassembler;
mod splitter;

pub use envelope::ChunkEnvelope;
pub use reassembler::{check_chunk_set, reassemble, MAX_REPORTED_OFFSETS};
pub use splitter::{split_bytes, split_file};

use std::sync::Arc;

use crate::context::Context;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One unit of shredded, possibly encrypted data.
///
/// Chunks are immutable once created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    context: Arc<Context>,
    data: Vec<u8>,
    offset: u32,
}

impl Chunk {
    pub(crate) fn new(context: Arc<Context>, data: Vec<u8>, offset: u32) -> Self {
        Self {
            context,
            data,
            offset,
        }
    }

    /// The chunk set this chunk belongs to
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The (possibly encrypted) bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Zero-based chunk index; the only ordering key
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Whether `other` shares this chunk's context allocation
    pub fn shares_context(&self, other: &Chunk) -> bool {
        Arc::ptr_eq(&self.context, &other.context)
    }

    /// Wire form of this chunk
    pub fn to_envelope(&self) -> ChunkEnvelope {
        ChunkEnvelope::from_chunk(self)
    }

    /// Rebuild a chunk, with a context of its own, from its wire form
    pub fn from_envelope(envelope: ChunkEnvelope) -> Result<Self> {
        envelope.into_chunk()
    }
}

/// A collection of chunks, in whatever order they were produced or received
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Chunks(Vec<Chunk>);

impl Chunks {
    /// Sort ascending by offset (stable)
    pub fn sort_by_offset(&mut self) {
        self.0.sort_by_key(Chunk::offset);
    }

    /// Take the underlying vector
    pub fn into_vec(self) -> Vec<Chunk> {
        self.0
    }

    /// Wire form of every chunk
    pub fn to_envelopes(&self) -> Vec<ChunkEnvelope> {
        self.0.iter().map(ChunkEnvelope::from_chunk).collect()
    }

    /// Rebuild chunks from envelopes.
    ///
    /// Envelopes with identical headers share one `Context`.
    pub fn from_envelopes(envelopes: Vec<ChunkEnvelope>) -> Result<Self> {
        let mut contexts: Vec<Arc<Context>> = Vec::new();
        let mut chunks = Vec::with_capacity(envelopes.len());

        for envelope in envelopes {
            let (context, data, offset) = envelope.into_parts()?;
            let shared = match contexts.iter().find(|c| c.same_chunk_set(&context)) {
                Some(existing) => Arc::clone(existing),
                None => {
                    let created = Arc::new(context);
                    contexts.push(Arc::clone(&created));
                    created
                }
            };
            chunks.push(Chunk::new(shared, data, offset));
        }
        Ok(Self(chunks))
    }
}

impl std::ops::Deref for Chunks {
    type Target = [Chunk];

    fn deref(&self) -> &[Chunk] {
        &self.0
    }
}

impl From<Vec<Chunk>> for Chunks {
    fn from(chunks: Vec<Chunk>) -> Self {
        Self(chunks)
    }
}

impl FromIterator<Chunk> for Chunks {
    fn from_iter<I: IntoIterator<Item = Chunk>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Chunks {
    type Item = Chunk;
    type IntoIter = std::vec::IntoIter<Chunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Chunks {
    type Item = &'a Chunk;
    type IntoIter = std::slice::Iter<'a, Chunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// Per-chunk crypto
// ---------------------------------------------------------------------------

/// Run `op` over every `(offset, bytes)` pair, keeping input order.
///
/// Failures are attributed to their chunk offset. With the `parallel`
/// feature every chunk is processed on the rayon pool before results are
/// inspected; the first failure in input order is the one returned either
/// way.
pub(crate) fn transform_chunks<F>(items: &[(u32, &[u8])], op: F) -> Result<Vec<Vec<u8>>>
where
    F: Fn(&[u8]) -> Result<Vec<u8>> + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        let results: Vec<Result<Vec<u8>>> = items
            .par_iter()
            .map(|(offset, bytes)| op(*bytes).map_err(|e| e.at_chunk(*offset)))
            .collect();
        results.into_iter().collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        items
            .iter()
            .map(|(offset, bytes)| op(*bytes).map_err(|e| e.at_chunk(*offset)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::options::Options;

    #[test]
    fn test_sort_by_offset() {
        let chunks = split_bytes(b"ABCDEFGHIJ", &Options::default().with_chunk_size(3)).unwrap();
        let mut reversed: Chunks = chunks.clone().into_iter().rev().collect();
        assert_eq!(reversed[0].offset(), 3);

        reversed.sort_by_offset();
        assert_eq!(reversed, chunks);
    }

    #[test]
    fn test_split_chunks_share_one_context() {
        let chunks = split_bytes(b"ABCDEFGHIJ", &Options::default().with_chunk_size(3)).unwrap();
        assert!(chunks.iter().all(|c| c.shares_context(&chunks[0])));
    }

    #[test]
    fn test_envelopes_rebuild_shared_context() {
        let chunks = split_file("a.txt", b"ABCDEFGHIJ", &Options::default().with_chunk_size(4))
            .unwrap();

        let rebuilt = Chunks::from_envelopes(chunks.to_envelopes()).unwrap();

        assert_eq!(rebuilt, chunks);
        assert!(rebuilt.iter().all(|c| c.shares_context(&rebuilt[0])));
    }

    #[test]
    fn test_single_envelope_round_trip() {
        let chunks = split_bytes(b"ABCDEFGHIJ", &Options::default().with_chunk_size(4)).unwrap();

        let restored = Chunk::from_envelope(chunks[2].to_envelope()).unwrap();

        assert_eq!(restored, chunks[2]);
        assert!(!restored.shares_context(&chunks[2]));
    }

    #[test]
    fn test_envelopes_from_two_sets_keep_contexts_apart() {
        let options = Options::default().with_chunk_size(4);
        let mut envelopes = split_bytes(b"first payload", &options).unwrap().to_envelopes();
        envelopes.extend(split_bytes(b"second payload", &options).unwrap().to_envelopes());

        let rebuilt = Chunks::from_envelopes(envelopes).unwrap();
        assert!(!rebuilt[0].shares_context(rebuilt.last().unwrap()));
    }

    #[test]
    fn test_transform_attributes_first_failure() {
        let items: Vec<(u32, &[u8])> = vec![(0, &b"ok"[..]), (1, &b"bad"[..]), (2, &b"bad"[..])];
        let err = transform_chunks(&items, |bytes| {
            if bytes == b"bad" {
                Err(Error::decryption("bad chunk"))
            } else {
                Ok(bytes.to_vec())
            }
        })
        .unwrap_err();

        assert_eq!(err.offset(), Some(1));
    }
}
