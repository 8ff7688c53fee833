use std::sync::Arc;

use super::{transform_chunks, Chunk, Chunks};
use crate::context::Context;
use crate::crypto::provider_for;
use crate::error::{Error, Result};
use crate::options::Options;

/// Split anonymous bytes into encrypted chunks.
///
/// The chunk set is named by a fresh UUID.
///
/// # Arguments
/// * `payload` - Raw bytes
/// * `options` - Chunk size and encryption scheme
pub fn split_bytes(payload: &[u8], options: &Options) -> Result<Chunks> {
    options.validate()?;
    let chunk_count = chunk_count(payload.len(), options.chunk_size)?;
    split_with_context(payload, Context::for_bytes(options.chunk_size, chunk_count), options)
}

/// Split a named file's contents into encrypted chunks.
///
/// The filename is encoded into the chunk set identifier once, before any
/// chunk is produced, so it can be recovered from any chunk.
///
/// # Arguments
/// * `filename` - Original filename (non-empty)
/// * `payload` - File contents; reading the file is the caller's job
/// * `options` - Chunk size and encryption scheme
pub fn split_file(filename: &str, payload: &[u8], options: &Options) -> Result<Chunks> {
    options.validate()?;
    let chunk_count = chunk_count(payload.len(), options.chunk_size)?;
    let context = Context::for_file(filename, options.chunk_size, chunk_count)?;
    split_with_context(payload, context, options)
}

/// `ceil(len / chunk_size)`, and 1 for an empty payload
fn chunk_count(len: usize, chunk_size: usize) -> Result<u32> {
    let count = len.div_ceil(chunk_size).max(1);
    u32::try_from(count).map_err(|_| {
        Error::InvalidConfiguration(format!(
            "{} bytes at chunk size {} needs more than {} chunks",
            len,
            chunk_size,
            u32::MAX
        ))
    })
}

fn split_with_context(payload: &[u8], context: Context, options: &Options) -> Result<Chunks> {
    let provider = provider_for(options)?;

    // An empty payload still yields one (empty) chunk.
    let slices: Vec<(u32, &[u8])> = if payload.is_empty() {
        vec![(0, payload)]
    } else {
        payload
            .chunks(options.chunk_size)
            .enumerate()
            .map(|(i, slice)| (i as u32, slice))
            .collect()
    };
    debug_assert_eq!(slices.len(), context.chunk_count() as usize);

    tracing::debug!(
        "Splitting {} bytes into {} chunks of {} bytes ({:?})",
        payload.len(),
        slices.len(),
        options.chunk_size,
        provider.scheme()
    );

    let sealed = transform_chunks(&slices, |slice| provider.encrypt(slice)).map_err(|e| {
        tracing::warn!("Aborting split of {}: {}", context.identifier(), e);
        e
    })?;

    let context = Arc::new(context);
    let chunks: Chunks = sealed
        .into_iter()
        .zip(&slices)
        .map(|(data, (offset, _))| Chunk::new(Arc::clone(&context), data, *offset))
        .collect();

    tracing::info!(
        "Split payload {} into {} chunks",
        context.identifier(),
        chunks.len()
    );
    Ok(chunks)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
