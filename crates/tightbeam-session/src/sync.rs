//! Sync controller (spec.md §4.5).
//!
//! Lets a receiver acquire lock without a handshake: the sender
//! interleaves a preamble burst and periodic re-inserts of Sync frames
//! into the symbol stream, and a receiver that has seen
//! `confirmation_required` distinct sync sequences treats metadata as
//! authoritative and starts accepting symbols.
//!
//! Following `lockframe-core::connection`'s state-machine shape, every
//! method here takes the current time as an explicit argument instead of
//! reading a clock. The state machine stays pure and deterministic, and a
//! test (or the production driver) supplies `Instant::now()` itself.

use std::{collections::HashSet, time::{Duration, Instant}};

use tightbeam_core::BroadcastMetadata;

/// Receiver's watchdog inactivity interval before a resync (spec.md §4.5).
pub const DEFAULT_WATCHDOG_INTERVAL: Duration = Duration::from_millis(4500);

/// Default number of distinct sync sequences required to engage lock.
pub const DEFAULT_CONFIRMATION_REQUIRED: u32 = 2;

/// Sync acquisition state (spec.md §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No Sync frame has been observed yet.
    Idle,
    /// At least one Sync frame observed; accumulating distinct sequences.
    Acquiring,
    /// `confirmation_required` distinct sequences observed; metadata is
    /// authoritative and symbols are accepted.
    Locked,
}

/// Configuration for one sync controller instance.
#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    /// Distinct sync sequences required before engaging lock.
    pub confirmation_required: u32,
    /// Inactivity interval (no accepted symbol) that triggers a resync.
    pub watchdog_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            confirmation_required: DEFAULT_CONFIRMATION_REQUIRED,
            watchdog_interval: DEFAULT_WATCHDOG_INTERVAL,
        }
    }
}

/// Outcome of observing a Sync frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    /// Still accumulating distinct sync sequences.
    StillAcquiring,
    /// This observation pushed the controller from `Acquiring` to `Locked`.
    LockAcquired,
    /// Already locked; this sync frame reconfirmed the existing lock.
    AlreadyLocked,
}

/// Receiver-side sync acquisition state machine.
#[derive(Debug, Clone)]
pub struct SyncController {
    config: SyncConfig,
    state: SyncState,
    observed_syncs: HashSet<u64>,
    /// Metadata pending confirmation (installed once lock engages, or
    /// immediately if a Meta frame arrived with no prior Sync).
    metadata: Option<BroadcastMetadata>,
    /// Last time lock was (re)acquired or a symbol was accepted; drives
    /// the resync watchdog.
    last_activity: Option<Instant>,
}

impl SyncController {
    /// Builds a controller in [`SyncState::Idle`] with no metadata.
    #[must_use]
    pub fn new(config: SyncConfig) -> Self {
        Self { config, state: SyncState::Idle, observed_syncs: HashSet::new(), metadata: None, last_activity: None }
    }

    /// Current acquisition state.
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Installed (or pending, if not yet locked) metadata, if any.
    #[must_use]
    pub fn metadata(&self) -> Option<&BroadcastMetadata> {
        self.metadata.as_ref()
    }

    /// `true` once metadata is known, regardless of lock state. A
    /// receiver MAY buffer symbols once metadata is known even while
    /// still `Acquiring` (spec.md §4.5).
    #[must_use]
    pub fn metadata_known(&self) -> bool {
        self.metadata.is_some()
    }

    /// Installs metadata observed directly from a Meta frame, with no
    /// prior Sync frame (spec.md §4.5: "acceptable and installs metadata
    /// immediately"). Does not affect the sync state machine.
    pub fn observe_meta(&mut self, metadata: BroadcastMetadata) {
        if self.metadata.is_none() {
            self.metadata = Some(metadata);
        }
    }

    /// Observes one Sync frame. `sequence` is the frame's unique sequence
    /// number (not the session-wide symbol sequence); `now` drives the
    /// watchdog.
    pub fn observe_sync(&mut self, sequence: u64, metadata: BroadcastMetadata, now: Instant) -> SyncEvent {
        match self.state {
            SyncState::Idle => self.state = SyncState::Acquiring,
            SyncState::Acquiring | SyncState::Locked => {},
        }

        self.observed_syncs.insert(sequence);
        if self.metadata.is_none() {
            self.metadata = Some(metadata);
        }

        if self.state == SyncState::Locked {
            return SyncEvent::AlreadyLocked;
        }

        if self.observed_syncs.len() as u32 >= self.config.confirmation_required {
            self.state = SyncState::Locked;
            self.last_activity = Some(now);
            SyncEvent::LockAcquired
        } else {
            SyncEvent::StillAcquiring
        }
    }

    /// Records that a symbol was accepted at `now`, resetting the
    /// watchdog.
    pub fn record_symbol_accepted(&mut self, now: Instant) {
        self.last_activity = Some(now);
    }

    /// Checks the inactivity watchdog; if it has tripped, transitions
    /// `Locked -> Acquiring` and clears the observed-sync set (spec.md
    /// §4.5). Returns `true` if a resync just happened. Already-solved
    /// decoder state is untouched; resync only affects sync acquisition.
    pub fn check_watchdog(&mut self, now: Instant) -> bool {
        if self.state != SyncState::Locked {
            return false;
        }
        let Some(last) = self.last_activity else { return false };
        if now.duration_since(last) >= self.config.watchdog_interval {
            self.state = SyncState::Acquiring;
            self.observed_syncs.clear();
            true
        } else {
            false
        }
    }

    /// Resets to `Idle` with no metadata (a full session reset).
    pub fn reset(&mut self) {
        self.state = SyncState::Idle;
        self.observed_syncs.clear();
        self.metadata = None;
        self.last_activity = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> BroadcastMetadata {
        use tightbeam_core::IntegrityAlgorithm;
        BroadcastMetadata::new(16, 1, 5, "abc".to_string(), IntegrityAlgorithm::Sha256).unwrap()
    }

    #[test]
    fn idle_to_acquiring_to_locked() {
        let mut ctrl = SyncController::new(SyncConfig { confirmation_required: 2, ..Default::default() });
        let now = Instant::now();
        assert_eq!(ctrl.state(), SyncState::Idle);

        let e1 = ctrl.observe_sync(1, meta(), now);
        assert_eq!(e1, SyncEvent::StillAcquiring);
        assert_eq!(ctrl.state(), SyncState::Acquiring);

        let e2 = ctrl.observe_sync(2, meta(), now);
        assert_eq!(e2, SyncEvent::LockAcquired);
        assert_eq!(ctrl.state(), SyncState::Locked);
    }

    #[test]
    fn same_sequence_twice_does_not_double_count() {
        let mut ctrl = SyncController::new(SyncConfig { confirmation_required: 2, ..Default::default() });
        let now = Instant::now();
        ctrl.observe_sync(1, meta(), now);
        let repeat = ctrl.observe_sync(1, meta(), now);
        assert_eq!(repeat, SyncEvent::StillAcquiring);
        assert_eq!(ctrl.state(), SyncState::Acquiring);
    }

    #[test]
    fn meta_frame_alone_installs_metadata_without_locking() {
        let mut ctrl = SyncController::new(SyncConfig::default());
        ctrl.observe_meta(meta());
        assert!(ctrl.metadata_known());
        assert_eq!(ctrl.state(), SyncState::Idle);
    }

    #[test]
    fn watchdog_resyncs_after_inactivity() {
        let mut ctrl = SyncController::new(SyncConfig {
            confirmation_required: 1,
            watchdog_interval: Duration::from_millis(100),
        });
        let t0 = Instant::now();
        ctrl.observe_sync(1, meta(), t0);
        assert_eq!(ctrl.state(), SyncState::Locked);

        let t1 = t0 + Duration::from_millis(50);
        assert!(!ctrl.check_watchdog(t1));
        assert_eq!(ctrl.state(), SyncState::Locked);

        let t2 = t0 + Duration::from_millis(200);
        assert!(ctrl.check_watchdog(t2));
        assert_eq!(ctrl.state(), SyncState::Acquiring);
    }

    #[test]
    fn accepted_symbol_resets_watchdog() {
        let mut ctrl = SyncController::new(SyncConfig {
            confirmation_required: 1,
            watchdog_interval: Duration::from_millis(100),
        });
        let t0 = Instant::now();
        ctrl.observe_sync(1, meta(), t0);

        let t1 = t0 + Duration::from_millis(90);
        ctrl.record_symbol_accepted(t1);

        let t2 = t1 + Duration::from_millis(90);
        assert!(!ctrl.check_watchdog(t2));
        assert_eq!(ctrl.state(), SyncState::Locked);
    }

    #[test]
    fn reset_clears_everything() {
        let mut ctrl = SyncController::new(SyncConfig { confirmation_required: 1, ..Default::default() });
        ctrl.observe_sync(1, meta(), Instant::now());
        assert_eq!(ctrl.state(), SyncState::Locked);
        ctrl.reset();
        assert_eq!(ctrl.state(), SyncState::Idle);
        assert!(!ctrl.metadata_known());
    }
}
