//! Session orchestrator (spec.md §4.7).
//!
//! The one stateful seam between the core fountain code, the wire framing,
//! and a surrounding capture pipeline (camera decoder on the receiving end,
//! QR renderer on the sending end). Sender-side preparation is a pure
//! function (`prepare_broadcast`); receiver-side state lives in [`Session`],
//! driven one symbol at a time from any context the caller likes, as long as
//! calls for one session are serialised (spec.md §5: "the core is not
//! reentrant").

use std::time::Instant;

use rand::Rng;
use tightbeam_core::{
    BroadcastMetadata, FountainDecoder, FountainEncoder, IngestOutcome, IntegrityAlgorithm,
    MetricsRecorder, RejectionKind, block::partition,
};
use tightbeam_proto::Frame;

use crate::{
    error::SessionError,
    status::Status,
    sync::{SyncConfig, SyncController, SyncEvent, SyncState},
};

/// Sender-side session configuration (spec.md §6 "Session options").
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Size in bytes of each source block.
    pub block_size: usize,
    /// Redundant symbols to emit. `None` picks the documented default,
    /// `ceil(0.75 * k)`.
    pub redundant_count: Option<usize>,
    /// Sync frames in the leading preamble burst.
    pub sync_preamble_count: u32,
    /// Symbols between each periodic mid-stream Sync re-insert.
    pub sync_interval: u32,
    /// Distinct sync sequences a receiver must observe before locking.
    pub confirmation_required: u32,
    /// Fountain encoder seed. `None` draws a fresh random seed.
    pub seed: Option<u64>,
    /// Checksum algorithm embedded in the session's metadata.
    pub integrity_algorithm: IntegrityAlgorithm,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            block_size: 64,
            redundant_count: None,
            sync_preamble_count: 4,
            sync_interval: 16,
            confirmation_required: 2,
            seed: None,
            integrity_algorithm: IntegrityAlgorithm::Sha256,
        }
    }
}

/// Summary counts for a materialised broadcast (spec.md §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastStats {
    /// Number of source blocks.
    pub k: usize,
    /// Systematic (degree-1) symbols emitted.
    pub systematic_count: usize,
    /// Redundant symbols emitted.
    pub redundant_count: usize,
    /// Sync frames emitted, preamble plus periodic re-inserts.
    pub sync_count: usize,
    /// Meta frames emitted (always 1, immediately after the preamble).
    pub meta_count: usize,
    /// Total frames in the playback list.
    pub total_frames: usize,
}

/// The materialised playback list for one broadcast (spec.md §4.7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastPackage {
    /// Session-invariant metadata, also embedded in every Sync frame.
    pub metadata: BroadcastMetadata,
    /// Encoder seed actually used (echoes `options.seed` if set).
    pub seed: u64,
    /// Wire-encoded frames in playback order: a leading Sync preamble, a
    /// single Meta frame, then symbols interleaved with periodic Sync
    /// re-inserts.
    pub frames: Vec<String>,
    /// Summary counts over `frames`.
    pub stats: BroadcastStats,
}

/// Builds the full frame playback list for `payload` (spec.md §4.7
/// `prepare_broadcast`). Stateless: the sender has no ongoing session, only
/// a list of frames to hand to a renderer at a fixed frame rate.
///
/// # Errors
///
/// Returns [`SessionError`] if `options.block_size == 0` or the resulting
/// metadata would otherwise violate spec.md §3's invariants.
pub fn prepare_broadcast(payload: &[u8], options: &SessionOptions) -> Result<BroadcastPackage, SessionError> {
    let part = partition(payload, options.block_size)?;
    let integrity_check = options.integrity_algorithm.digest(payload);
    let metadata = BroadcastMetadata::new(
        part.block_size,
        part.k(),
        part.orig_len,
        integrity_check,
        options.integrity_algorithm,
    )?;

    let seed = options.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let mut encoder = FountainEncoder::new(&part, seed);
    let systematic = encoder.systematic_symbols();
    let redundant_count =
        options.redundant_count.unwrap_or_else(|| ((part.k() as f64) * 0.75).ceil() as usize);
    let redundant = encoder.take_redundant(redundant_count);

    let mut wire_frames = Vec::new();
    let mut sync_count = 0usize;
    let mut sequence = 0u64;

    let preamble_total = options.sync_preamble_count.max(1);
    for ordinal in 1..=preamble_total {
        wire_frames.push(
            Frame::Sync {
                sequence,
                ordinal,
                total: preamble_total,
                confirmation_required: options.confirmation_required,
                metadata: metadata.clone(),
            }
            .encode(),
        );
        sequence += 1;
        sync_count += 1;
    }

    wire_frames.push(Frame::Meta(metadata.clone()).encode());

    let mut since_last_sync = 0u32;
    for symbol in systematic.iter().chain(redundant.iter()) {
        wire_frames.push(
            Frame::Symbol { sequence, indices: symbol.indices.clone(), payload: symbol.payload.clone() }
                .encode(),
        );
        sequence += 1;
        since_last_sync += 1;

        if options.sync_interval > 0 && since_last_sync >= options.sync_interval {
            wire_frames.push(
                Frame::Sync {
                    sequence,
                    ordinal: 1,
                    total: 1,
                    confirmation_required: options.confirmation_required,
                    metadata: metadata.clone(),
                }
                .encode(),
            );
            sequence += 1;
            sync_count += 1;
            since_last_sync = 0;
        }
    }

    let stats = BroadcastStats {
        k: part.k(),
        systematic_count: systematic.len(),
        redundant_count: redundant.len(),
        sync_count,
        meta_count: 1,
        total_frames: wire_frames.len(),
    };

    tracing::debug!(
        k = stats.k,
        systematic = stats.systematic_count,
        redundant = stats.redundant_count,
        syncs = stats.sync_count,
        seed,
        "prepared broadcast"
    );

    Ok(BroadcastPackage { metadata, seed, frames: wire_frames, stats })
}

/// Receiver-side orchestrator: one instance per camera session (spec.md
/// §4.7). Owns the sync controller, the decoder once metadata is known, and
/// the running metrics.
#[derive(Debug)]
pub struct Session {
    sync: SyncController,
    decoder: Option<FountainDecoder>,
    metrics: Option<MetricsRecorder>,
    started_at: Option<Instant>,
}

impl Session {
    /// Creates a receiver session with no metadata installed yet.
    #[must_use]
    pub fn new(sync_config: SyncConfig) -> Self {
        Self { sync: SyncController::new(sync_config), decoder: None, metrics: None, started_at: None }
    }

    /// Installs metadata directly and clears all decoder state (spec.md
    /// §4.7). Used both for a fresh receiver and to recover from a session
    /// the caller knows has gone stale.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the supplied fields violate spec.md §3's
    /// invariants. This is the only condition under which session
    /// construction itself is refused (spec.md §7).
    pub fn reset_receiver(
        &mut self,
        block_size: usize,
        k: usize,
        orig_len: usize,
        integrity_check: String,
        integrity_algorithm: IntegrityAlgorithm,
    ) -> Result<(), SessionError> {
        let metadata = BroadcastMetadata::new(block_size, k, orig_len, integrity_check, integrity_algorithm)?;
        self.sync.reset();
        self.sync.observe_meta(metadata);
        self.decoder = Some(FountainDecoder::new(k, block_size));
        self.metrics = Some(MetricsRecorder::new(k));
        self.started_at = Some(Instant::now());
        tracing::info!(k, block_size, orig_len, "receiver session reset");
        Ok(())
    }

    /// Parses and ingests one raw wire frame (`M:`/`Y:`/`S:`). The more
    /// general entry point; [`Session::receiver_add_symbol`] is the
    /// spec-literal signature for a symbol whose fields are already split
    /// out by the caller.
    pub fn receiver_ingest_wire(&mut self, wire: &str) -> Status {
        match Frame::parse(wire) {
            Ok(frame) => self.ingest_frame(&frame),
            Err(_) => self.record_rejection_status(RejectionKind::MalformedFrame),
        }
    }

    /// Ingests one symbol frame's already-parsed fields (spec.md §4.7).
    /// `payload_hex` must be lower-case hex of length `2 * block_size`.
    pub fn receiver_add_symbol(&mut self, sequence: u64, indices: &[usize], payload_hex: &str) -> Status {
        match hex::decode(payload_hex).ok() {
            Some(payload) => {
                let frame = Frame::Symbol { sequence, indices: indices.to_vec(), payload };
                self.ingest_frame(&frame)
            },
            None => self.record_rejection_status(RejectionKind::MalformedFrame),
        }
    }

    /// Idempotent read of the current status with no new symbol (spec.md
    /// §4.7 `receiver_status`).
    #[must_use]
    pub fn receiver_status(&self) -> Status {
        self.status_snapshot(false, false)
    }

    fn ingest_frame(&mut self, frame: &Frame) -> Status {
        let now = Instant::now();
        self.sync.check_watchdog(now);

        match frame {
            Frame::Meta(metadata) => {
                self.install_metadata_if_absent(metadata.clone());
                self.status_snapshot(false, false)
            },
            Frame::Sync { sequence, metadata, .. } => {
                self.install_metadata_if_absent(metadata.clone());
                let event = self.sync.observe_sync(*sequence, metadata.clone(), now);
                if event == SyncEvent::LockAcquired {
                    tracing::info!("sync lock acquired");
                }
                self.status_snapshot(false, false)
            },
            Frame::Symbol { indices, payload, .. } => self.ingest_symbol(indices, payload, now),
        }
    }

    fn install_metadata_if_absent(&mut self, metadata: BroadcastMetadata) {
        if self.decoder.is_none() {
            self.decoder = Some(FountainDecoder::new(metadata.k, metadata.block_size));
            self.metrics = Some(MetricsRecorder::new(metadata.k));
            self.started_at = Some(Instant::now());
        }
        self.sync.observe_meta(metadata);
    }

    fn ingest_symbol(&mut self, indices: &[usize], payload: &[u8], now: Instant) -> Status {
        let (Some(metrics), Some(decoder)) = (&mut self.metrics, &mut self.decoder) else {
            return self.record_rejection_status(RejectionKind::NotLocked);
        };
        metrics.record_attempt();

        let outcome = decoder.ingest(indices, payload);
        let (newly_added, redundant) = match outcome {
            IngestOutcome::Accepted { .. } => {
                metrics.record_accepted(indices.len());
                (true, false)
            },
            IngestOutcome::Rejected(kind) => {
                metrics.record_rejection(kind);
                (false, kind == RejectionKind::Redundant)
            },
        };

        if newly_added {
            self.sync.record_symbol_accepted(now);
        }
        self.status_snapshot(newly_added, redundant)
    }

    fn record_rejection_status(&mut self, kind: RejectionKind) -> Status {
        if let Some(metrics) = self.metrics.as_mut() {
            metrics.record_attempt();
            metrics.record_rejection(kind);
        }
        self.status_snapshot(false, kind == RejectionKind::Redundant)
    }

    fn status_snapshot(&self, newly_added: bool, redundant: bool) -> Status {
        let decoder = self.decoder.as_ref();
        let coverage = decoder.map_or(0.0, FountainDecoder::coverage);
        let unique_symbols = decoder.map_or(0, |d| (d.buffered_count() + d.solved_count()) as u64);
        let blocks_solved = decoder.is_some_and(FountainDecoder::is_complete);

        // spec.md §4.6: on an integrity mismatch the decoder reports
        // `decode_complete=false` and latches the error rather than
        // auto-resetting; `integrity_verified` still surfaces the mismatch.
        let mut recovered_payload = None;
        let mut integrity_verified = None;
        let mut decode_complete = false;
        if blocks_solved {
            if let (Some(decoder), Some(metadata)) = (decoder, self.sync.metadata()) {
                if let Some(blocks) = decoder.solved_blocks() {
                    let recovered = tightbeam_core::block::reassemble(&blocks, metadata.orig_len);
                    let verified = metadata.integrity_algorithm.digest(&recovered) == metadata.integrity_check;
                    integrity_verified = Some(verified);
                    if verified {
                        decode_complete = true;
                        recovered_payload = Some(recovered);
                    } else {
                        tracing::warn!("integrity check failed on completed decode");
                    }
                }
            }
        }

        Status {
            newly_added,
            redundant,
            symbols_observed: self.metrics.as_ref().map_or(0, |m| m.snapshot().attempts),
            unique_symbols,
            coverage,
            decode_complete,
            recovered_payload,
            integrity_verified,
            sync_state: self.sync.state(),
            metrics: self.metrics.as_ref().map_or_else(|| MetricsRecorder::new(0).snapshot(), |m| m.snapshot()),
        }
    }
}
