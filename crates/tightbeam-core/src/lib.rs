//! Rateless erasure-coding core for the Tightbeam optical link.
//!
//! Tightbeam renders a timed sequence of QR codes on a display; a receiver
//! observes a lossy subset of those codes and must reconstruct the original
//! payload. This crate is the part of that system worth calling
//! "engineering": a Luby-Transform-style fountain code (systematic symbols
//! first, then an unbounded redundant stream), a belief-propagation
//! (peeling) decoder with a Gauss-Jordan-elimination fallback, and the
//! checksum that lets a receiver trust a fully-solved payload.
//!
//! Everything here is synchronous, allocation-only, and free of ambient
//! randomness: every PRNG draw flows through an explicit, caller-seeded
//! generator, so two encoders built from the same seed emit identical
//! streams and the erasure-resilience / commutativity properties in
//! spec.md §8 are checkable by construction.
//!
//! This crate does not touch QR rendering, cameras, or any wire format.
//! See `tightbeam-proto` for the frame grammar and `tightbeam-session` for
//! the orchestrator that ties partitioning, encoding, framing, and
//! decoding into a session.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod block;
pub mod decoder;
pub mod degree;
pub mod encoder;
pub mod error;
pub mod metadata;
pub mod metrics;

pub use block::{partition, reassemble, Partition};
pub use decoder::{FountainDecoder, IngestOutcome};
pub use degree::{DegreeSampler, RobustSoliton};
pub use encoder::FountainEncoder;
pub use error::CoreError;
pub use metadata::{BroadcastMetadata, IntegrityAlgorithm, Symbol};
pub use metrics::{MetricsRecorder, MetricsSnapshot, RejectionKind};
