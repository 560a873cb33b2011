//! Lossy-channel simulation (spec.md §8 erasure-resilience property).
//!
//! Tightbeam's wire is one-way and handshake-free: nothing resends a
//! dropped QR frame. These helpers model the channel a real camera capture
//! pipeline sees (frames a receiver simply never observed, whether
//! scattered uniformly at random or lost in one contiguous burst, like a
//! hand briefly blocking the display).

use rand::Rng;

/// How frames are dropped between sender and receiver.
#[derive(Debug, Clone, Copy)]
pub enum LossModel {
    /// Each frame is independently dropped with probability `drop_fraction`.
    Uniform {
        /// Probability in `[0, 1]` that any given frame is dropped.
        drop_fraction: f64,
    },
    /// Frames at indices `start..start + len` are always dropped; every
    /// other frame arrives.
    Burst {
        /// First dropped frame index.
        start: usize,
        /// Number of consecutive frames dropped.
        len: usize,
    },
}

/// Applies `model` to `frames`, returning only the ones that "arrive".
/// Determinism comes entirely from the caller-supplied `rng` (spec.md §9:
/// "route all randomness through a single explicit PRNG").
pub fn simulate_channel(frames: &[String], model: LossModel, rng: &mut impl Rng) -> Vec<String> {
    match model {
        LossModel::Uniform { drop_fraction } => frames
            .iter()
            .filter(|_| !rng.gen_bool(drop_fraction.clamp(0.0, 1.0)))
            .cloned()
            .collect(),
        LossModel::Burst { start, len } => frames
            .iter()
            .enumerate()
            .filter(|(i, _)| *i < start || *i >= start + len)
            .map(|(_, frame)| frame.clone())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn burst_drops_exact_range() {
        let frames: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let survived = simulate_channel(&frames, LossModel::Burst { start: 3, len: 4 }, &mut rng);
        assert_eq!(survived, vec!["0", "1", "2", "7", "8", "9"]);
    }

    #[test]
    fn uniform_zero_fraction_keeps_everything() {
        let frames: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let survived = simulate_channel(&frames, LossModel::Uniform { drop_fraction: 0.0 }, &mut rng);
        assert_eq!(survived.len(), frames.len());
    }

    #[test]
    fn uniform_one_fraction_drops_everything() {
        let frames: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let survived = simulate_channel(&frames, LossModel::Uniform { drop_fraction: 1.0 }, &mut rng);
        assert!(survived.is_empty());
    }
}
