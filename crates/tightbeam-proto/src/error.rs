//! Wire-parsing error type (spec.md §7).
//!
//! Covers failures that are detectable from a frame string alone, with no
//! session context: an unknown tag, an unparseable integer, malformed hex,
//! malformed JSON, or a structurally-invalid index list (duplicates).
//! Checks that need the session's current `k`/`block_size` (index range
//! and payload length) happen downstream once metadata is known (see
//! `tightbeam_session`'s symbol ingestion, which routes into
//! `tightbeam_core::FountainDecoder::ingest`).

use thiserror::Error;

/// Errors raised while parsing a frame string (spec.md §4.4, §7).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The leading two bytes did not match any known tag (`M:`, `Y:`, `S:`).
    #[error("unknown frame tag: {tag:?}")]
    UnknownTag {
        /// The two bytes that were found (or fewer, if the string was short).
        tag: String,
    },

    /// A `Symbol` frame field was not a valid decimal integer.
    #[error("malformed integer in field {field}: {value:?}")]
    MalformedInteger {
        /// Which field failed to parse (`sequence`, `ordinal`, `index`, ...).
        field: &'static str,
        /// The text that failed to parse.
        value: String,
    },

    /// `payload_hex` was not valid lower-case hex, or had odd length.
    #[error("malformed hex payload")]
    MalformedHex,

    /// A `Meta`/`Sync` JSON body failed to deserialize.
    #[error("malformed JSON body: {reason}")]
    MalformedJson {
        /// Description from the underlying JSON error.
        reason: String,
    },

    /// A `Symbol` frame's index list contained a repeated value
    /// (spec.md §8: `indices = {3, 3}` is rejected as `MalformedFrame`).
    #[error("duplicate index in symbol frame")]
    DuplicateIndex,

    /// A `Symbol` frame's index list was empty (degree must be `>= 1`).
    #[error("symbol frame has no indices")]
    EmptyIndices,

    /// `integrity_algorithm` named something other than a known algorithm.
    #[error("unknown integrity algorithm: {name}")]
    UnknownIntegrityAlgorithm {
        /// The unrecognised algorithm name.
        name: String,
    },

    /// A `Symbol` frame's body was missing the `sequence|indices|payload`
    /// pipe-delimited fields (spec.md §4.4: parsers never panic on
    /// truncated strings, they return this instead).
    #[error("truncated symbol frame")]
    TruncatedFrame,
}
