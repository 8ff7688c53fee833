//! Property-based tests for split and reassemble.
//!
//! ## Properties Verified
//!
//! - Reassembling any permutation of a split returns the original payload
//! - Chunk count is `ceil(len / chunk_size)`, at least 1
//! - Every chunk but the last carries exactly `chunk_size` plaintext bytes
//! - Dropping any single chunk is reported, never silently tolerated

use proptest::prelude::*;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::chunking::{reassemble, split_bytes, split_file};
use crate::crypto::{NONCE_SIZE, TAG_SIZE};
use crate::error::Error;
use crate::options::Options;

fn arb_payload() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..600)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: reassembly is independent of arrival order
    #[test]
    fn prop_round_trip_any_order(
        payload in arb_payload(),
        chunk_size in 1usize..64,
        seed in any::<u64>()
    ) {
        let options = Options::default().with_chunk_size(chunk_size);
        let mut chunks = split_bytes(&payload, &options).unwrap().into_vec();
        chunks.shuffle(&mut StdRng::seed_from_u64(seed));

        let context = reassemble(&chunks, &options).unwrap();
        prop_assert_eq!(context.bytes(), payload.as_slice());
    }

    /// Property: symmetric round trip, with fixed per-chunk overhead
    #[test]
    fn prop_symmetric_round_trip(
        payload in arb_payload(),
        chunk_size in 1usize..128,
        key in prop::array::uniform32(any::<u8>()),
        seed in any::<u64>()
    ) {
        let options = Options::default()
            .with_chunk_size(chunk_size)
            .with_symmetric_key(key.to_vec());
        let mut chunks = split_file("prop.bin", &payload, &options).unwrap().into_vec();

        let sealed: usize = chunks.iter().map(|c| c.data().len()).sum();
        prop_assert_eq!(sealed, payload.len() + chunks.len() * (NONCE_SIZE + TAG_SIZE));

        chunks.shuffle(&mut StdRng::seed_from_u64(seed));
        let context = reassemble(&chunks, &options).unwrap();
        prop_assert_eq!(context.bytes(), payload.as_slice());
        prop_assert_eq!(context.filename().unwrap(), "prop.bin");
    }

    /// Property: chunk count and sizes follow the chunk size
    #[test]
    fn prop_chunk_shape(payload in arb_payload(), chunk_size in 1usize..64) {
        let chunks = split_bytes(&payload, &Options::default().with_chunk_size(chunk_size))
            .unwrap();

        let expected = payload.len().div_ceil(chunk_size).max(1);
        prop_assert_eq!(chunks.len(), expected);
        prop_assert_eq!(chunks[0].context().chunk_count() as usize, expected);

        for (i, chunk) in chunks.iter().enumerate() {
            prop_assert_eq!(chunk.offset() as usize, i);
            if i + 1 < chunks.len() {
                prop_assert_eq!(chunk.data().len(), chunk_size);
            } else {
                prop_assert!(chunk.data().len() <= chunk_size);
            }
        }
    }

    /// Property: any missing chunk is named in the error
    #[test]
    fn prop_missing_chunk_reported(
        payload in prop::collection::vec(any::<u8>(), 2..300),
        chunk_size in 1usize..32,
        pick in any::<prop::sample::Index>()
    ) {
        let options = Options::default().with_chunk_size(chunk_size);
        let mut chunks = split_bytes(&payload, &options).unwrap().into_vec();
        prop_assume!(chunks.len() > 1);

        let removed = chunks.remove(pick.index(chunks.len()));
        match reassemble(&chunks, &options) {
            Err(Error::IncompleteChunkSet { missing, .. }) => {
                prop_assert_eq!(missing, vec![removed.offset()]);
            }
            other => prop_assert!(false, "unexpected result: {:?}", other.map(|c| c.bytes().len())),
        }
    }
}
