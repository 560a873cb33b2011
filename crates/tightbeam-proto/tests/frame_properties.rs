//! Property tests for the frame codec round-trip guarantee (spec.md §8:
//! "Frame codec round-trip: `parse(encode(f)) == f` for all well-formed
//! Meta, Sync, Symbol frames").

use proptest::prelude::*;
use tightbeam_core::{BroadcastMetadata, IntegrityAlgorithm};
use tightbeam_proto::Frame;

fn arb_metadata() -> impl Strategy<Value = BroadcastMetadata> {
    (1usize..=256, 1usize..=64, any::<u64>()).prop_map(|(block_size, k, check_seed)| {
        let capacity = block_size * k;
        let orig_len = (check_seed as usize) % (capacity + 1);
        let check = format!("{check_seed:016x}");
        BroadcastMetadata::new(block_size, k, orig_len, check, IntegrityAlgorithm::Sha256).unwrap()
    })
}

fn arb_symbol_frame() -> impl Strategy<Value = Frame> {
    (any::<u64>(), prop::collection::vec(0usize..200, 1..6), prop::collection::vec(any::<u8>(), 0..64))
        .prop_map(|(sequence, mut indices, payload)| {
            indices.sort_unstable();
            indices.dedup();
            Frame::Symbol { sequence, indices, payload }
        })
}

proptest! {
    #[test]
    fn meta_frame_round_trips(meta in arb_metadata()) {
        let frame = Frame::Meta(meta);
        let wire = frame.encode();
        prop_assert_eq!(Frame::parse(&wire).unwrap(), frame);
    }

    #[test]
    fn sync_frame_round_trips(
        meta in arb_metadata(),
        sequence in any::<u64>(),
        ordinal in 1u32..=8,
        total in 1u32..=8,
        confirmation_required in 1u32..=8,
    ) {
        let frame = Frame::Sync { sequence, ordinal, total, confirmation_required, metadata: meta };
        let wire = frame.encode();
        prop_assert_eq!(Frame::parse(&wire).unwrap(), frame);
    }

    #[test]
    fn symbol_frame_round_trips(frame in arb_symbol_frame()) {
        let wire = frame.encode();
        prop_assert_eq!(Frame::parse(&wire).unwrap(), frame);
    }

    #[test]
    fn parser_never_panics_on_arbitrary_strings(s in ".*") {
        let _ = Frame::parse(&s);
    }
}
