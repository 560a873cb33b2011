//! Receiver status snapshot (spec.md §4.7, §6).
//!
//! The orchestrator returns one of these from every symbol ingestion and
//! from `receiver_status`'s idempotent read. It never borrows from the
//! session, so a caller is free to log or render it after the session has
//! moved on.

use tightbeam_core::MetricsSnapshot;

use crate::sync::SyncState;

/// Snapshot of one receiver session after an ingestion (or a bare read).
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    /// This call's symbol was accepted and added information to the graph.
    pub newly_added: bool,
    /// This call's symbol was accepted but carried no new information
    /// (informational, not a failure; spec.md §7).
    pub redundant: bool,
    /// Total symbol frames observed this session, accepted or rejected.
    pub symbols_observed: u64,
    /// Distinct (post-normalisation) symbols currently buffered or solved.
    pub unique_symbols: u64,
    /// Fraction of source blocks solved so far, `[0, 1]`.
    pub coverage: f64,
    /// `true` once every source block is solved and the integrity check
    /// (if already computed) passed.
    pub decode_complete: bool,
    /// The recovered, truncated-to-`orig_len` payload, once
    /// `decode_complete` and its integrity check has passed.
    pub recovered_payload: Option<Vec<u8>>,
    /// `Some(true)`/`Some(false)` once every block is solved and the
    /// checksum has been checked; `None` before then. A `false` means
    /// `IntegrityFailure` (spec.md §7): the session is not auto-reset, the
    /// mismatch is simply surfaced here on every subsequent read.
    pub integrity_verified: Option<bool>,
    /// Current sync acquisition state.
    pub sync_state: SyncState,
    /// Accumulated counters for this session.
    pub metrics: MetricsSnapshot,
}
