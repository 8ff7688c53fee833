//! Self-describing wire form of a chunk.
//!
//! An envelope carries everything reassembly needs from one chunk:
//! the chunk set identity (identifier, content kind, chunk size, chunk
//! count), the chunk's offset, and its bytes. Key material never travels in
//! an envelope.

use serde::{Deserialize, Serialize};

use super::Chunk;
use crate::context::{ContentKind, Context};
use crate::encoding::base64_bytes;
use crate::error::{Error, Result};

/// Serializable form of a [`Chunk`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkEnvelope {
    /// Identifier of the chunk set
    pub identifier: String,
    /// Kind of payload
    pub content_kind: ContentKind,
    /// Plaintext bytes per chunk at split time
    pub chunk_size: u64,
    /// Number of chunks in the set
    pub chunk_count: u32,
    /// Zero-based chunk index
    pub offset: u32,
    /// Chunk bytes; base64 in JSON
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl ChunkEnvelope {
    /// Envelope for `chunk`
    pub fn from_chunk(chunk: &Chunk) -> Self {
        let context = chunk.context();
        Self {
            identifier: context.identifier().to_string(),
            content_kind: context.content_kind(),
            chunk_size: context.chunk_size() as u64,
            chunk_count: context.chunk_count(),
            offset: chunk.offset(),
            data: chunk.data().to_vec(),
        }
    }

    /// Encode as bincode
    pub fn to_bincode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from bincode
    pub fn from_bincode(bytes: &[u8]) -> Result<Self> {
        let envelope: Self = bincode::deserialize(bytes)
            .map_err(|e| Error::DeserializationError(e.to_string()))?;
        envelope.validate()?;
        Ok(envelope)
    }

    /// Encode as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let envelope: Self = serde_json::from_str(json)?;
        envelope.validate()?;
        Ok(envelope)
    }

    /// Convert into a chunk with its own context
    pub fn into_chunk(self) -> Result<Chunk> {
        let (context, data, offset) = self.into_parts()?;
        Ok(Chunk::new(context.into(), data, offset))
    }

    pub(crate) fn into_parts(self) -> Result<(Context, Vec<u8>, u32)> {
        self.validate()?;
        let chunk_size = usize::try_from(self.chunk_size).map_err(|_| {
            Error::DeserializationError(format!(
                "chunk size {} does not fit this platform",
                self.chunk_size
            ))
        })?;
        let context = Context::from_parts(
            self.identifier,
            self.content_kind,
            chunk_size,
            self.chunk_count,
        );
        Ok((context, self.data, self.offset))
    }

    fn validate(&self) -> Result<()> {
        if self.identifier.is_empty() {
            return Err(Error::DeserializationError(
                "chunk envelope has an empty identifier".into(),
            ));
        }
        if self.chunk_size == 0 || self.chunk_count == 0 {
            return Err(Error::DeserializationError(format!(
                "chunk envelope has chunk size {} and chunk count {}",
                self.chunk_size, self.chunk_count
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::split_file;
    use crate::options::Options;

    fn sample() -> Chunk {
        let chunks = split_file(
            "report.txt",
            b"quarterly numbers",
            &Options::default().with_chunk_size(8),
        )
        .unwrap();
        chunks[1].clone()
    }

    #[test]
    fn test_bincode_preserves_every_field() {
        let chunk = sample();
        let bytes = ChunkEnvelope::from_chunk(&chunk).to_bincode().unwrap();

        let restored = ChunkEnvelope::from_bincode(&bytes).unwrap().into_chunk().unwrap();

        assert_eq!(restored, chunk);
        assert_eq!(restored.context().filename().unwrap(), "report.txt");
    }

    #[test]
    fn test_json_shape() {
        let envelope = ChunkEnvelope::from_chunk(&sample());
        let json: serde_json::Value = serde_json::from_str(&envelope.to_json().unwrap()).unwrap();

        assert_eq!(json["content_kind"], "file");
        assert_eq!(json["offset"], 1);
        assert_eq!(json["chunk_count"], 3);
        assert_eq!(json["data"], "eSBudW1iZXI=");
    }

    #[test]
    fn test_json_round_trip() {
        let envelope = ChunkEnvelope::from_chunk(&sample());
        let restored = ChunkEnvelope::from_json(&envelope.to_json().unwrap()).unwrap();
        assert_eq!(restored, envelope);
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            ChunkEnvelope::from_bincode(&[1, 2, 3]),
            Err(Error::DeserializationError(_))
        ));
        assert!(matches!(
            ChunkEnvelope::from_json("{\"identifier\": 3}"),
            Err(Error::DeserializationError(_))
        ));
    }

    #[test]
    fn test_zero_chunk_count_rejected() {
        let mut envelope = ChunkEnvelope::from_chunk(&sample());
        envelope.chunk_count = 0;
        let json = envelope.to_json().unwrap();

        assert!(matches!(
            ChunkEnvelope::from_json(&json),
            Err(Error::DeserializationError(_))
        ));
        assert!(envelope.into_chunk().is_err());
    }
}
