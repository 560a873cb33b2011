//! Core error type.
//!
//! `CoreError` covers the failures that can occur while building metadata or
//! running the fountain encoder/decoder, independent of wire parsing (see
//! `tightbeam_proto::FrameError` for that) or session-level rejections (see
//! `tightbeam_session::SessionError`).

use thiserror::Error;

/// Errors raised by `tightbeam-core`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// `block_size`, `k`, or `orig_len` violate the invariants in spec.md §3.
    #[error("invalid metadata: {reason}")]
    InvalidMetadata {
        /// Human-readable description of the violated invariant.
        reason: String,
    },

    /// A symbol or source-block index was `>= k`.
    #[error("index {index} out of range for k={k}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of source blocks.
        k: usize,
    },

    /// A symbol's payload length did not equal `block_size`.
    #[error("payload length {actual} does not match block_size {expected}")]
    PayloadLengthMismatch {
        /// Expected length (`block_size`).
        expected: usize,
        /// Length actually observed.
        actual: usize,
    },

    /// The recovered payload's checksum did not match `integrity_check`.
    #[error("integrity check failed: expected {expected}, computed {actual}")]
    IntegrityFailure {
        /// Checksum recorded in `BroadcastMetadata`.
        expected: String,
        /// Checksum computed over the recovered payload.
        actual: String,
    },
}
