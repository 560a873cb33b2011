//! Metrics recorder (spec.md §2, §4 "Metrics recorder").
//!
//! Tracks the counters a receiver session reports alongside each `Status`:
//! how many symbols were attempted, how long decode took once it completed,
//! the degree histogram of accepted symbols, and a per-kind rejection
//! count. Pure bookkeeping, no I/O; `tightbeam-session` owns the instance
//! and calls these methods as symbols are ingested.

use std::time::Duration;

/// The reason a symbol was not newly added to the decode graph
/// (spec.md §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    /// Symbol carried no new information after normalisation.
    Redundant,
    /// Non-zero payload with an empty index set after normalisation.
    Corrupt,
    /// The normalised index set duplicates an already-buffered symbol.
    Duplicate,
    /// Symbol ingested before sync lock with no metadata installed.
    NotLocked,
    /// Frame failed to parse (bad tag, malformed integer/hex/JSON).
    MalformedFrame,
    /// Symbol indices referenced a block `>= k`.
    IndexOutOfRange,
}

impl RejectionKind {
    /// All rejection kinds, in a stable order, for histogram iteration.
    pub const ALL: [Self; 6] = [
        Self::Redundant,
        Self::Corrupt,
        Self::Duplicate,
        Self::NotLocked,
        Self::MalformedFrame,
        Self::IndexOutOfRange,
    ];
}

/// Point-in-time snapshot of a session's metrics, returned in `Status`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    /// Total symbols ingested, accepted or rejected.
    pub attempts: u64,
    /// Symbols accepted (newly added information).
    pub accepted: u64,
    /// Rejections broken down by kind.
    pub rejections: Vec<(RejectionKind, u64)>,
    /// `histogram[d]` = number of accepted symbols of degree `d` (index 0 unused).
    pub degree_histogram: Vec<u64>,
    /// Wall-clock time from session reset to decode completion, once known.
    pub decode_duration: Option<Duration>,
}

/// Accumulates counters for one receiver session.
#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    attempts: u64,
    accepted: u64,
    rejections: [u64; RejectionKind::ALL.len()],
    degree_histogram: Vec<u64>,
    decode_duration: Option<Duration>,
}

impl MetricsRecorder {
    /// Creates an empty recorder sized for `k` source blocks (degree
    /// histogram needs `k + 1` slots since degree ranges `1..=k`).
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self {
            attempts: 0,
            accepted: 0,
            rejections: [0; RejectionKind::ALL.len()],
            degree_histogram: vec![0; k + 1],
            decode_duration: None,
        }
    }

    /// Records one symbol ingestion attempt.
    pub fn record_attempt(&mut self) {
        self.attempts += 1;
    }

    /// Records that a symbol of the given degree was accepted.
    pub fn record_accepted(&mut self, degree: usize) {
        self.accepted += 1;
        if degree >= self.degree_histogram.len() {
            self.degree_histogram.resize(degree + 1, 0);
        }
        self.degree_histogram[degree] += 1;
    }

    /// Records a rejection of the given kind.
    pub fn record_rejection(&mut self, kind: RejectionKind) {
        let idx = RejectionKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
        self.rejections[idx] += 1;
    }

    /// Records the elapsed time from session start to decode completion.
    /// Only the first call has any effect; decode duration is set once.
    pub fn record_decode_complete(&mut self, elapsed: Duration) {
        if self.decode_duration.is_none() {
            self.decode_duration = Some(elapsed);
        }
    }

    /// Produces an immutable snapshot for reporting in `Status`.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let rejections = RejectionKind::ALL
            .iter()
            .zip(self.rejections.iter())
            .map(|(kind, count)| (*kind, *count))
            .collect();
        MetricsSnapshot {
            attempts: self.attempts,
            accepted: self.accepted,
            rejections,
            degree_histogram: self.degree_histogram.clone(),
            decode_duration: self.decode_duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_attempts_and_acceptance() {
        let mut m = MetricsRecorder::new(4);
        m.record_attempt();
        m.record_accepted(1);
        m.record_attempt();
        m.record_rejection(RejectionKind::Redundant);

        let snap = m.snapshot();
        assert_eq!(snap.attempts, 2);
        assert_eq!(snap.accepted, 1);
        assert_eq!(snap.degree_histogram[1], 1);
        assert_eq!(
            snap.rejections.iter().find(|(k, _)| *k == RejectionKind::Redundant).unwrap().1,
            1
        );
    }

    #[test]
    fn decode_duration_set_once() {
        let mut m = MetricsRecorder::new(2);
        m.record_decode_complete(Duration::from_millis(10));
        m.record_decode_complete(Duration::from_millis(999));
        assert_eq!(m.snapshot().decode_duration, Some(Duration::from_millis(10)));
    }
}
