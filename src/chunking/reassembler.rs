use std::sync::Arc;

use super::{transform_chunks, Chunk};
use crate::context::Context;
use crate::crypto::provider_for;
use crate::error::{Error, Result};
use crate::options::Options;

/// Most offsets listed in each field of an `IncompleteChunkSet` error
pub const MAX_REPORTED_OFFSETS: usize = 32;

/// Verify that `chunks` form exactly one complete chunk set.
///
/// Returns the shared context on success. Does not decrypt anything, so it
/// can be called before key material is at hand. Work and memory are bounded
/// by `chunks.len()`, never by the chunk count a chunk claims.
///
/// ## Errors
///
/// - `IncompleteChunkSet` if the input is empty, or the offsets present are
///   not exactly `0..chunk_count` (missing, repeated, or out of range)
/// - `InconsistentChunkSet` if chunks name different chunk sets
pub fn check_chunk_set(chunks: &[Chunk]) -> Result<Arc<Context>> {
    let first = chunks.first().ok_or(Error::IncompleteChunkSet {
        expected: 0,
        missing: Vec::new(),
        duplicates: Vec::new(),
        out_of_range: Vec::new(),
    })?;
    let context = Arc::clone(&first.context);

    if let Some(stranger) = chunks
        .iter()
        .find(|c| !c.context().same_chunk_set(&context))
    {
        return Err(Error::InconsistentChunkSet(format!(
            "chunk at offset {} belongs to {} ({} chunks), expected {} ({} chunks)",
            stranger.offset(),
            stranger.context().identifier(),
            stranger.context().chunk_count(),
            context.identifier(),
            context.chunk_count()
        )));
    }

    let expected = context.chunk_count();
    let mut offsets: Vec<u32> = chunks.iter().map(Chunk::offset).collect();
    offsets.sort_unstable();

    let out_of_range: Vec<u32> = offsets
        .iter()
        .copied()
        .filter(|&offset| offset >= expected)
        .take(MAX_REPORTED_OFFSETS)
        .collect();
    let duplicates: Vec<u32> = offsets
        .windows(2)
        .filter(|pair| pair[0] == pair[1])
        .map(|pair| pair[0])
        .fold(Vec::new(), |mut acc, offset| {
            if acc.last() != Some(&offset) && acc.len() < MAX_REPORTED_OFFSETS {
                acc.push(offset);
            }
            acc
        });

    // Each step either matches a present offset or records a missing one,
    // so this runs at most `chunks.len() + MAX_REPORTED_OFFSETS` times.
    let mut missing = Vec::new();
    let mut present = offsets.iter().copied().peekable();
    let mut next = 0u32;
    while next < expected && missing.len() < MAX_REPORTED_OFFSETS {
        while present.next_if(|&offset| offset < next).is_some() {}
        if present.next_if_eq(&next).is_none() {
            missing.push(next);
        }
        next += 1;
    }

    if !missing.is_empty() || !duplicates.is_empty() || !out_of_range.is_empty() {
        return Err(Error::IncompleteChunkSet {
            expected,
            missing,
            duplicates,
            out_of_range,
        });
    }

    Ok(context)
}

/// Reassemble a payload from its chunks.
///
/// Chunks may arrive in any order; `offset` alone decides placement.
/// `options` must select the same scheme (and matching key material) used
/// to split.
///
/// # Arguments
/// * `chunks` - Every chunk of one split, in any order
/// * `options` - Encryption scheme able to open the chunks
pub fn reassemble(chunks: &[Chunk], options: &Options) -> Result<Context> {
    options.validate()?;

    let context = check_chunk_set(chunks).map_err(|e| {
        tracing::warn!("Rejected chunk set: {}", e);
        e
    })?;

    let mut ordered: Vec<&Chunk> = chunks.iter().collect();
    ordered.sort_by_key(|c| c.offset());

    let provider = provider_for(options)?;
    tracing::debug!(
        "Reassembling {} from {} chunks ({:?})",
        context.identifier(),
        ordered.len(),
        provider.scheme()
    );

    let sealed: Vec<(u32, &[u8])> = ordered.iter().map(|c| (c.offset(), c.data())).collect();
    let opened = transform_chunks(&sealed, |data| provider.decrypt(data)).map_err(|e| {
        tracing::warn!("Aborting reassembly of {}: {}", context.identifier(), e);
        e
    })?;

    let total: usize = opened.iter().map(Vec::len).sum();
    let mut payload = Vec::with_capacity(total);
    for plaintext in &opened {
        payload.extend_from_slice(plaintext);
    }

    tracing::info!(
        "Reassembled {} bytes for {}",
        payload.len(),
        context.identifier()
    );
    Ok(context.with_payload(payload))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
