//! Property test for the decoder's commutativity guarantee (spec.md §8:
//! "for any permutation of accepted symbols, final `recovered` is
//! identical").

use proptest::prelude::*;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tightbeam_core::{block::partition, FountainDecoder, FountainEncoder};

proptest! {
    #[test]
    fn decode_result_is_independent_of_symbol_arrival_order(
        payload in prop::collection::vec(any::<u8>(), 1..256),
        block_size in 1usize..32,
        encoder_seed in any::<u64>(),
        shuffle_seed_a in any::<u64>(),
        shuffle_seed_b in any::<u64>(),
    ) {
        let part = partition(&payload, block_size).unwrap();
        let mut encoder = FountainEncoder::new(&part, encoder_seed);
        let mut symbols = encoder.systematic_symbols();
        symbols.extend(encoder.take_redundant(part.k()));

        let mut order_a = symbols.clone();
        order_a.shuffle(&mut ChaCha8Rng::seed_from_u64(shuffle_seed_a));
        let mut order_b = symbols.clone();
        order_b.shuffle(&mut ChaCha8Rng::seed_from_u64(shuffle_seed_b));

        let mut decoder_a = FountainDecoder::new(part.k(), part.block_size);
        for sym in &order_a {
            decoder_a.ingest(&sym.indices, &sym.payload);
        }
        let mut decoder_b = FountainDecoder::new(part.k(), part.block_size);
        for sym in &order_b {
            decoder_b.ingest(&sym.indices, &sym.payload);
        }

        prop_assert_eq!(decoder_a.is_complete(), decoder_b.is_complete());
        prop_assert_eq!(decoder_a.solved_blocks(), decoder_b.solved_blocks());
    }
}
