//! Erasure-resilience sweep (spec.md §8: "Monte-Carlo over >= 200 seeds").
//!
//! For a fixed payload, sweeps many independent `(encoder seed, channel
//! seed)` pairs, feeding a uniformly-random `ceil(1.2*k)`-size subset of the
//! first `3*k` emitted symbols to a fresh receiver each time, and reports
//! how often it fully recovers the payload. Built directly on
//! `tightbeam-core`/`tightbeam-proto` rather than `prepare_broadcast`, so the
//! symbol pool size is exactly `3*k` regardless of the session's default
//! redundant-count policy.

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tightbeam_core::{block::partition, CoreError, FountainEncoder, IntegrityAlgorithm};
use tightbeam_proto::Frame;
use tightbeam_session::{Session, SyncConfig};

/// Outcome of one Monte-Carlo trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErasureTrial {
    /// Seed used for the fountain encoder this trial.
    pub encoder_seed: u64,
    /// Seed used to pick which symbols survive the channel.
    pub channel_seed: u64,
    /// Whether the receiver fully recovered the original payload.
    pub recovered: bool,
}

/// Runs one trial: emits `3*k` symbols (systematic + redundant, no syncs),
/// keeps a uniformly random subset of size `ceil(1.2*k)`, and feeds that
/// subset (in their original relative order) to a fresh receiver.
///
/// # Errors
///
/// Returns [`CoreError`] if `block_size == 0` or the derived metadata
/// otherwise violates spec.md §3's invariants (a caller-configuration
/// error, not a property of any particular seed pair).
pub fn run_erasure_trial(
    payload: &[u8],
    block_size: usize,
    encoder_seed: u64,
    channel_seed: u64,
) -> Result<ErasureTrial, CoreError> {
    let part = partition(payload, block_size)?;
    let k = part.k();
    let integrity_check = IntegrityAlgorithm::Sha256.digest(payload);

    let mut encoder = FountainEncoder::new(&part, encoder_seed);
    let mut symbols = encoder.systematic_symbols();
    let pool_size = 3 * k;
    if symbols.len() < pool_size {
        symbols.extend(encoder.take_redundant(pool_size - symbols.len()));
    }

    let wire: Vec<String> = symbols
        .iter()
        .enumerate()
        .map(|(sequence, sym)| {
            Frame::Symbol { sequence: sequence as u64, indices: sym.indices.clone(), payload: sym.payload.clone() }
                .encode()
        })
        .collect();

    let keep_count = ((k as f64) * 1.2).ceil() as usize;
    let mut rng = ChaCha8Rng::seed_from_u64(channel_seed);
    let mut pool: Vec<usize> = (0..wire.len()).collect();
    pool.shuffle(&mut rng);
    let mut kept: Vec<usize> = pool.into_iter().take(keep_count.min(wire.len())).collect();
    kept.sort_unstable();

    let mut session = Session::new(SyncConfig::default());
    session
        .reset_receiver(block_size, k, part.orig_len, integrity_check, IntegrityAlgorithm::Sha256)
        .map_err(|tightbeam_session::SessionError::InvalidMetadata(core_err)| core_err)?;

    for idx in kept {
        session.receiver_ingest_wire(&wire[idx]);
    }

    let status = session.receiver_status();
    let recovered = status.decode_complete && status.recovered_payload.as_deref() == Some(payload);
    if !recovered {
        tracing::debug!(encoder_seed, channel_seed, coverage = status.coverage, "trial failed to recover");
    }
    Ok(ErasureTrial { encoder_seed, channel_seed, recovered })
}

/// Sweeps `seed_count` independent trials, deriving both the encoder and
/// channel seed from a single sweep seed so the whole sweep is itself
/// reproducible.
///
/// # Errors
///
/// Returns [`CoreError`] under the same conditions as
/// [`run_erasure_trial`]; a single bad `(payload, block_size)` combination
/// aborts the whole sweep rather than silently skipping trials.
pub fn run_erasure_monte_carlo(
    payload: &[u8],
    block_size: usize,
    sweep_seed: u64,
    seed_count: usize,
) -> Result<Vec<ErasureTrial>, CoreError> {
    let mut rng = ChaCha8Rng::seed_from_u64(sweep_seed);
    (0..seed_count)
        .map(|_| {
            let encoder_seed = rng.gen();
            let channel_seed = rng.gen();
            run_erasure_trial(payload, block_size, encoder_seed, channel_seed)
        })
        .collect()
}
