//! Fountain decoder (spec.md §4.6).
//!
//! Accumulates symbols, performs degree-1 peeling with cascade, falls back
//! to Gauss-Jordan elimination over GF(2) once enough symbols have
//! accumulated, and reports coverage. Decoder output is a deterministic
//! function of the multiset of accepted symbols (spec.md §4.6
//! "Determinism"). Ingestion order only ever changes how much work peeling
//! does, never the final recovered blocks.

use crate::metrics::RejectionKind;

fn xor_into(a: &mut [u8], b: &[u8]) {
    for (x, y) in a.iter_mut().zip(b.iter()) {
        *x ^= y;
    }
}

/// What happened to one ingested symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The symbol was accepted; `newly_solved` lists any blocks this
    /// ingestion solved (via immediate peeling or a cascade it triggered).
    Accepted {
        /// Blocks solved as a direct or cascading result of this symbol.
        newly_solved: Vec<usize>,
    },
    /// The symbol was not accepted; see [`RejectionKind`] for why.
    Rejected(RejectionKind),
}

/// Belief-propagation (peeling) plus Gauss-Jordan-elimination decoder for
/// one broadcast session's worth of symbols.
#[derive(Debug, Clone)]
pub struct FountainDecoder {
    k: usize,
    block_size: usize,
    solved: Vec<Option<Vec<u8>>>,
    solved_count: usize,
    /// Buffered symbols with degree >= 2, always normalised against
    /// `solved` (never reference an already-solved index).
    buffer: Vec<(Vec<usize>, Vec<u8>)>,
}

impl FountainDecoder {
    /// Creates a decoder for `k` source blocks of `block_size` bytes each.
    #[must_use]
    pub fn new(k: usize, block_size: usize) -> Self {
        Self { k, block_size, solved: vec![None; k], solved_count: 0, buffer: Vec::new() }
    }

    /// Number of source blocks.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// `true` once every block has been solved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.solved_count == self.k
    }

    /// Fraction of blocks solved so far, in `[0, 1]`. `1.0` for a `k == 0`
    /// session (spec.md §8: nothing to solve).
    #[must_use]
    pub fn coverage(&self) -> f64 {
        if self.k == 0 {
            1.0
        } else {
            self.solved_count as f64 / self.k as f64
        }
    }

    /// Blocks currently buffered awaiting more information (for
    /// diagnostics/tests; not part of the public decode result).
    #[must_use]
    pub fn buffered_count(&self) -> usize {
        self.buffer.len()
    }

    /// Number of source blocks solved so far.
    #[must_use]
    pub fn solved_count(&self) -> usize {
        self.solved_count
    }

    /// Concatenation of all solved blocks, `None` until [`Self::is_complete`].
    #[must_use]
    pub fn solved_blocks(&self) -> Option<Vec<Vec<u8>>> {
        if !self.is_complete() {
            return None;
        }
        Some(self.solved.iter().map(|b| b.clone().unwrap_or_default()).collect())
    }

    fn normalize(&self, indices: &[usize], payload: &[u8]) -> (Vec<usize>, Vec<u8>) {
        let mut payload = payload.to_vec();
        let mut remaining = Vec::with_capacity(indices.len());
        for &idx in indices {
            if let Some(block) = &self.solved[idx] {
                xor_into(&mut payload, block);
            } else {
                remaining.push(idx);
            }
        }
        remaining.sort_unstable();
        (remaining, payload)
    }

    fn solve(&mut self, idx: usize, payload: Vec<u8>) {
        if self.solved[idx].is_none() {
            self.solved[idx] = Some(payload);
            self.solved_count += 1;
            if self.solved_count == self.k {
                tracing::debug!(k = self.k, "all source blocks solved");
            }
        }
    }

    /// Re-normalises every buffered symbol against the current solved set,
    /// peeling any that drop to degree 1 and repeating until no buffered
    /// symbol changes. This is the "cascade" in spec.md §4.6 step 4.
    fn cascade(&mut self) -> Vec<usize> {
        let mut newly_solved = Vec::new();
        loop {
            let mut progressed = false;
            let mut i = 0;
            while i < self.buffer.len() {
                let (indices, payload) = {
                    let (idx, pay) = &self.buffer[i];
                    self.normalize(idx, pay)
                };
                if indices.is_empty() {
                    self.buffer.remove(i);
                    progressed = true;
                    continue;
                }
                if indices.len() == 1 {
                    let idx = indices[0];
                    self.solve(idx, payload);
                    newly_solved.push(idx);
                    self.buffer.remove(i);
                    progressed = true;
                    continue;
                }
                if indices != self.buffer[i].0 {
                    self.buffer[i] = (indices, payload);
                }
                i += 1;
            }
            if !progressed {
                break;
            }
        }
        newly_solved
    }

    /// Attempts Gauss-Jordan elimination over GF(2) on the buffered
    /// symbols (spec.md §4.6 step 6, the "fallback"). Returns the blocks
    /// solved directly by elimination (before any cascade they trigger).
    fn gaussian_eliminate(&mut self) -> Vec<usize> {
        if self.buffer.is_empty() {
            return Vec::new();
        }
        tracing::debug!(
            buffered = self.buffer.len(),
            solved = self.solved_count,
            k = self.k,
            "attempting Gauss-Jordan elimination fallback"
        );

        let k = self.k;
        let mut rows: Vec<(Vec<bool>, Vec<u8>)> = self
            .buffer
            .iter()
            .map(|(indices, payload)| {
                let mut bits = vec![false; k];
                for &idx in indices {
                    bits[idx] = true;
                }
                (bits, payload.clone())
            })
            .collect();

        let mut pivot_row = 0;
        for col in 0..k {
            if self.solved[col].is_some() {
                continue;
            }
            let Some(found) = (pivot_row..rows.len()).find(|&r| rows[r].0[col]) else {
                continue;
            };
            rows.swap(pivot_row, found);

            let (pivot_bits, pivot_payload) = rows[pivot_row].clone();
            for other in 0..rows.len() {
                if other == pivot_row || !rows[other].0[col] {
                    continue;
                }
                for c in 0..k {
                    rows[other].0[c] ^= pivot_bits[c];
                }
                xor_into(&mut rows[other].1, &pivot_payload);
            }
            pivot_row += 1;
        }

        let mut newly_solved = Vec::new();
        let mut kept = Vec::with_capacity(rows.len());
        for (bits, payload) in rows {
            let indices: Vec<usize> = (0..k).filter(|&c| bits[c]).collect();
            match indices.len() {
                0 => {}, // redundant, or a contradiction we conservatively drop
                1 => {
                    self.solve(indices[0], payload);
                    newly_solved.push(indices[0]);
                },
                _ => kept.push((indices, payload)),
            }
        }
        self.buffer = kept;
        newly_solved
    }

    /// Whether enough symbols have accumulated to attempt elimination
    /// (spec.md §4.6: "e.g. `>= k`" buffered-plus-solved symbols).
    fn should_attempt_elimination(&self) -> bool {
        self.buffer.len() + self.solved_count >= self.k
    }

    /// Ingests one symbol. `indices` must be distinct and each `< k`;
    /// callers that parse symbols off the wire should validate this first
    /// (spec.md §7 `IndexOutOfRange`/`MalformedFrame`) but this method
    /// re-checks defensively rather than panicking on bad input.
    pub fn ingest(&mut self, indices: &[usize], payload: &[u8]) -> IngestOutcome {
        if payload.len() != self.block_size {
            return IngestOutcome::Rejected(RejectionKind::MalformedFrame);
        }
        if indices.iter().any(|&i| i >= self.k) {
            return IngestOutcome::Rejected(RejectionKind::IndexOutOfRange);
        }
        {
            let mut seen = indices.to_vec();
            seen.sort_unstable();
            if seen.windows(2).any(|w| w[0] == w[1]) {
                return IngestOutcome::Rejected(RejectionKind::MalformedFrame);
            }
        }

        let (norm_indices, norm_payload) = self.normalize(indices, payload);

        if norm_indices.is_empty() {
            return if norm_payload.iter().all(|&b| b == 0) {
                IngestOutcome::Rejected(RejectionKind::Redundant)
            } else {
                IngestOutcome::Rejected(RejectionKind::Corrupt)
            };
        }

        if self.buffer.iter().any(|(idx, _)| *idx == norm_indices) {
            return IngestOutcome::Rejected(RejectionKind::Duplicate);
        }

        let mut newly_solved = Vec::new();

        if norm_indices.len() == 1 {
            let idx = norm_indices[0];
            self.solve(idx, norm_payload);
            newly_solved.push(idx);
            newly_solved.extend(self.cascade());
        } else {
            self.buffer.push((norm_indices, norm_payload));
            if self.should_attempt_elimination() {
                let solved_by_ge = self.gaussian_eliminate();
                if !solved_by_ge.is_empty() {
                    newly_solved.extend(solved_by_ge);
                    newly_solved.extend(self.cascade());
                }
            }
        }

        IngestOutcome::Accepted { newly_solved }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{block::partition, encoder::FountainEncoder};

    #[test]
    fn systematic_only_round_trip() {
        let payload = b"The quick brown fox jumps over the lazy dog!!!!\n".to_vec();
        let part = partition(&payload, 16).unwrap();
        let enc = FountainEncoder::new(&part, 1);

        let mut dec = FountainDecoder::new(part.k(), part.block_size);
        for sym in enc.systematic_symbols() {
            let outcome = dec.ingest(&sym.indices, &sym.payload);
            assert!(matches!(outcome, IngestOutcome::Accepted { .. }));
        }
        assert!(dec.is_complete());
        let blocks = dec.solved_blocks().unwrap();
        assert_eq!(crate::block::reassemble(&blocks, part.orig_len), payload);
    }

    #[test]
    fn redundant_symbol_after_solved_is_rejected() {
        let part = partition(b"hello world!!!!", 16).unwrap();
        let enc = FountainEncoder::new(&part, 1);
        let mut dec = FountainDecoder::new(part.k(), part.block_size);
        let sym = &enc.systematic_symbols()[0];
        dec.ingest(&sym.indices, &sym.payload);
        let second = dec.ingest(&sym.indices, &sym.payload);
        assert_eq!(second, IngestOutcome::Rejected(RejectionKind::Redundant));
    }

    #[test]
    fn corrupt_symbol_detected() {
        let part = partition(b"hello world!!!!", 16).unwrap();
        let enc = FountainEncoder::new(&part, 1);
        let mut dec = FountainDecoder::new(part.k(), part.block_size);
        let sym = &enc.systematic_symbols()[0];
        dec.ingest(&sym.indices, &sym.payload);
        // same index, but corrupted (non-zero) payload after normalisation
        let corrupt_payload = vec![0xFFu8; part.block_size];
        let outcome = dec.ingest(&sym.indices, &corrupt_payload);
        assert_eq!(outcome, IngestOutcome::Rejected(RejectionKind::Corrupt));
    }

    #[test]
    fn duplicate_unsolved_symbol_rejected() {
        let part = partition(&(0..64).collect::<Vec<u8>>(), 16).unwrap();
        let mut dec = FountainDecoder::new(part.k(), part.block_size);
        let mut payload = vec![0u8; part.block_size];
        xor_into(&mut payload, &part.blocks[0]);
        xor_into(&mut payload, &part.blocks[1]);
        let indices = vec![0usize, 1];

        let first = dec.ingest(&indices, &payload);
        assert!(matches!(first, IngestOutcome::Accepted { .. }));
        let second = dec.ingest(&indices, &payload);
        assert_eq!(second, IngestOutcome::Rejected(RejectionKind::Duplicate));
    }

    #[test]
    fn out_of_range_index_rejected() {
        let mut dec = FountainDecoder::new(4, 16);
        let outcome = dec.ingest(&[10], &vec![0u8; 16]);
        assert_eq!(outcome, IngestOutcome::Rejected(RejectionKind::IndexOutOfRange));
    }

    #[test]
    fn wrong_payload_length_rejected() {
        let mut dec = FountainDecoder::new(4, 16);
        let outcome = dec.ingest(&[0], &vec![0u8; 8]);
        assert_eq!(outcome, IngestOutcome::Rejected(RejectionKind::MalformedFrame));
    }

    #[test]
    fn duplicate_raw_index_rejected() {
        let mut dec = FountainDecoder::new(4, 16);
        let outcome = dec.ingest(&[1, 1], &vec![0u8; 16]);
        assert_eq!(outcome, IngestOutcome::Rejected(RejectionKind::MalformedFrame));
    }

    #[test]
    fn redundant_symbols_alone_converge_via_elimination() {
        let payload: Vec<u8> = (0..1024u32).map(|b| b as u8).collect();
        let part = partition(&payload, 64).unwrap();
        let mut enc = FountainEncoder::new(&part, 123);
        let mut dec = FountainDecoder::new(part.k(), part.block_size);

        // Only redundant (degree >= 1, possibly 1) symbols, no systematic.
        let mut attempts = 0;
        while !dec.is_complete() && attempts < part.k() * 10 {
            let sym = enc.next_redundant();
            dec.ingest(&sym.indices, &sym.payload);
            attempts += 1;
        }
        assert!(dec.is_complete(), "did not converge within {attempts} redundant symbols");
        let blocks = dec.solved_blocks().unwrap();
        assert_eq!(crate::block::reassemble(&blocks, part.orig_len), payload);
    }

    #[test]
    fn ingestion_order_does_not_affect_final_recovery() {
        let payload: Vec<u8> = (0..512u32).map(|b| (b * 3) as u8).collect();
        let part = partition(&payload, 64).unwrap();
        let mut enc = FountainEncoder::new(&part, 9);
        let mut all = enc.systematic_symbols();
        all.extend(enc.take_redundant(part.k()));

        let mut forward = FountainDecoder::new(part.k(), part.block_size);
        for sym in &all {
            forward.ingest(&sym.indices, &sym.payload);
        }

        let mut reversed_syms = all.clone();
        reversed_syms.reverse();
        let mut backward = FountainDecoder::new(part.k(), part.block_size);
        for sym in &reversed_syms {
            backward.ingest(&sym.indices, &sym.payload);
        }

        assert_eq!(forward.is_complete(), backward.is_complete());
        if forward.is_complete() {
            assert_eq!(forward.solved_blocks(), backward.solved_blocks());
        }
    }

    #[test]
    fn k_zero_session_is_immediately_complete() {
        let dec = FountainDecoder::new(0, 16);
        assert!(dec.is_complete());
        assert_eq!(dec.coverage(), 1.0);
        assert_eq!(dec.solved_blocks(), Some(Vec::new()));
    }
}
