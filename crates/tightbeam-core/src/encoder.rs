//! Fountain encoder (spec.md §4.3).
//!
//! Emits the `k` systematic symbols first, then an unbounded stream of
//! redundant symbols drawn from the degree sampler. Every draw (degree and
//! neighbour indices) is a deterministic function of `(seed,
//! emission_index)`: two encoders built from the same seed emit byte-for-
//! byte identical streams, which is what makes the round-trip and
//! commutativity properties in spec.md §8 checkable at all.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{block::Partition, degree::DegreeSampler, metadata::Symbol};

/// XORs `b` into `a` in place. Both slices must be the same length.
fn xor_into(a: &mut [u8], b: &[u8]) {
    for (x, y) in a.iter_mut().zip(b.iter()) {
        *x ^= y;
    }
}

/// Produces the systematic and redundant symbol stream for a partitioned
/// payload.
///
/// The systematic symbols (one per source block) are generated eagerly and
/// held; redundant symbols are generated lazily via [`FountainEncoder::next_redundant`]
/// so a caller can ask for as many as it wants (spec.md: "R is
/// configurable").
pub struct FountainEncoder {
    blocks: Vec<Vec<u8>>,
    sampler: DegreeSampler<ChaCha8Rng>,
    last_indices: Option<Vec<usize>>,
}

impl FountainEncoder {
    /// Builds an encoder over `partition`'s blocks, seeded with `seed`.
    #[must_use]
    pub fn new(partition: &Partition, seed: u64) -> Self {
        let k = partition.k();
        Self {
            blocks: partition.blocks.clone(),
            sampler: DegreeSampler::new(k, ChaCha8Rng::seed_from_u64(seed)),
            last_indices: None,
        }
    }

    /// `k`, the number of source blocks.
    #[must_use]
    pub fn k(&self) -> usize {
        self.blocks.len()
    }

    /// The `k` systematic symbols, in index order (spec.md §4.3 step 1).
    #[must_use]
    pub fn systematic_symbols(&self) -> Vec<Symbol> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(i, block)| Symbol { indices: vec![i], payload: block.clone() })
            .collect()
    }

    /// Draws one redundant symbol (spec.md §4.3 step 2).
    ///
    /// Rejects and resamples once if the drawn index set exactly matches
    /// the previous symbol's indices ("diversification, not a correctness
    /// requirement" per spec.md §4.3).
    pub fn next_redundant(&mut self) -> Symbol {
        let k = self.k();
        debug_assert!(k > 0, "next_redundant called with k == 0");

        let mut degree = self.sampler.next_degree().clamp(1, k);
        let mut indices = self.sampler.sample_indices(degree);

        if self.last_indices.as_deref() == Some(indices.as_slice()) {
            degree = self.sampler.next_degree().clamp(1, k);
            indices = self.sampler.sample_indices(degree);
        }

        let block_size = self.blocks[0].len();
        let mut payload = vec![0u8; block_size];
        for &idx in &indices {
            xor_into(&mut payload, &self.blocks[idx]);
        }

        self.last_indices = Some(indices.clone());
        Symbol { indices, payload }
    }

    /// Draws `count` redundant symbols. Returns an empty vector for a
    /// `k == 0` encoder (the degenerate empty-payload session, spec.md §8),
    /// regardless of `count`: there are no source blocks to XOR together.
    pub fn take_redundant(&mut self, count: usize) -> Vec<Symbol> {
        if self.k() == 0 {
            return Vec::new();
        }
        (0..count).map(|_| self.next_redundant()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::partition;

    #[test]
    fn systematic_symbols_match_blocks() {
        let part = partition(b"The quick brown fox jumps over the lazy dog!!!!\n", 16).unwrap();
        let enc = FountainEncoder::new(&part, 1);
        let systematic = enc.systematic_symbols();
        assert_eq!(systematic.len(), 3);
        for (i, sym) in systematic.iter().enumerate() {
            assert_eq!(sym.indices, vec![i]);
            assert_eq!(sym.payload, part.blocks[i]);
            assert!(sym.is_systematic());
        }
    }

    #[test]
    fn redundant_symbols_are_xor_of_named_blocks() {
        let payload: Vec<u8> = (0..64).collect();
        let part = partition(&payload, 16).unwrap();
        let mut enc = FountainEncoder::new(&part, 99);
        for sym in enc.take_redundant(20) {
            let mut expected = vec![0u8; part.block_size];
            for &idx in &sym.indices {
                xor_into(&mut expected, &part.blocks[idx]);
            }
            assert_eq!(sym.payload, expected);
            assert!(sym.degree() >= 1 && sym.degree() <= part.k());
        }
    }

    #[test]
    fn same_seed_same_stream() {
        let payload: Vec<u8> = (0..128).map(|b| b as u8).collect();
        let part = partition(&payload, 16).unwrap();
        let mut a = FountainEncoder::new(&part, 123);
        let mut b = FountainEncoder::new(&part, 123);
        let sa = a.take_redundant(50);
        let sb = b.take_redundant(50);
        assert_eq!(sa, sb);
    }

    #[test]
    fn different_seeds_diverge() {
        let payload: Vec<u8> = (0..128).map(|b| b as u8).collect();
        let part = partition(&payload, 16).unwrap();
        let mut a = FountainEncoder::new(&part, 1);
        let mut b = FountainEncoder::new(&part, 2);
        let sa = a.take_redundant(50);
        let sb = b.take_redundant(50);
        assert_ne!(sa, sb);
    }

    #[test]
    fn back_to_back_index_repeats_are_rare() {
        // The resample is a single attempt, not a hard guarantee (spec.md
        // §4.3: "a cheap diversification, not a correctness requirement"),
        // so an occasional repeat is allowed, but it should be rare.
        let payload: Vec<u8> = (0..256).map(|b| b as u8).collect();
        let part = partition(&payload, 16).unwrap();
        let mut enc = FountainEncoder::new(&part, 7);
        let symbols = enc.take_redundant(200);
        let repeats = symbols.windows(2).filter(|pair| pair[0].indices == pair[1].indices).count();
        assert!(repeats < 10, "too many back-to-back repeats: {repeats}/199");
    }

    #[test]
    fn k_one_systematic_symbol_is_sufficient() {
        let part = partition(b"hello", 16).unwrap();
        let enc = FountainEncoder::new(&part, 7);
        let systematic = enc.systematic_symbols();
        assert_eq!(systematic.len(), 1);
        assert_eq!(systematic[0].payload, part.blocks[0]);
    }

    #[test]
    fn k_zero_encoder_emits_no_symbols_at_all() {
        let part = partition(b"", 16).unwrap();
        let mut enc = FountainEncoder::new(&part, 1);
        assert!(enc.systematic_symbols().is_empty());
        assert!(enc.take_redundant(5).is_empty());
    }
}
