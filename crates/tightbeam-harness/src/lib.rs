//! Deterministic test harness for the Tightbeam fountain code and session
//! orchestrator.
//!
//! `channel` simulates the lossy one-way optical link (uniform or
//! bursty frame drops); `monte_carlo` sweeps many independent seeds to check
//! the erasure-resilience property from spec.md §8. Both route every random
//! draw through an explicit, caller-seeded `rand_chacha::ChaCha8Rng` so a
//! reported failure is reproducible from its seed alone.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod channel;
pub mod monte_carlo;

pub use channel::{simulate_channel, LossModel};
pub use monte_carlo::{run_erasure_monte_carlo, run_erasure_trial, ErasureTrial};
