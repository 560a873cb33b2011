//! Frame wire format (spec.md §4.4, §6).
//!
//! Every frame renders to a single ASCII string sized for one QR payload.
//! The leading two bytes are a type tag (`M:`, `Y:`, `S:`); `Meta` and
//! `Sync` carry a JSON body, `Symbol` uses a compact pipe-delimited grammar
//! so the hex payload never has to round-trip through a JSON string escaper.
//!
//! `parse(encode(frame)) == frame` for every well-formed frame
//! (spec.md §4.4; exercised by the proptest in `tests/frame_properties.rs`).
//! Parsing never panics on truncated or malformed input; it always
//! returns a typed [`FrameError`].

use serde::{Deserialize, Serialize};
use tightbeam_core::{BroadcastMetadata, IntegrityAlgorithm};

use crate::error::FrameError;

const META_TAG: &str = "M:";
const SYNC_TAG: &str = "Y:";
const SYMBOL_TAG: &str = "S:";

fn algorithm_name(algo: IntegrityAlgorithm) -> &'static str {
    algo.name()
}

fn parse_algorithm_name(name: &str) -> Result<IntegrityAlgorithm, FrameError> {
    match name {
        "sha256" => Ok(IntegrityAlgorithm::Sha256),
        "crc32c" => Ok(IntegrityAlgorithm::Crc32c),
        other => {
            Err(FrameError::UnknownIntegrityAlgorithm { name: other.to_string() })
        },
    }
}

/// One broadcast frame: metadata, a sync pulse, or a fountain symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Carries the session-invariant [`BroadcastMetadata`].
    Meta(BroadcastMetadata),
    /// A sync pulse: lets a mid-stream receiver acquire lock without a
    /// handshake (spec.md §4.5). Carries its own copy of the metadata so a
    /// joining receiver never needs to wait for the (earlier) Meta frame.
    Sync {
        /// Monotone, session-unique frame sequence number.
        sequence: u64,
        /// This sync frame's position within its burst, `1..=total`.
        ordinal: u32,
        /// Size of the burst this sync frame belongs to.
        total: u32,
        /// Number of distinct sync sequences a receiver must observe
        /// before treating metadata as authoritative.
        confirmation_required: u32,
        /// Embedded metadata, identical across every Sync frame in a
        /// session.
        metadata: BroadcastMetadata,
    },
    /// One fountain output symbol.
    Symbol {
        /// Monotone, session-unique frame sequence number.
        sequence: u64,
        /// Source-block indices this symbol XORs together, sorted and
        /// distinct.
        indices: Vec<usize>,
        /// XOR of the named source blocks.
        payload: Vec<u8>,
    },
}

#[derive(Serialize, Deserialize)]
struct MetaBody {
    block_size: usize,
    k: usize,
    orig_len: usize,
    integrity_check: String,
    #[serde(default)]
    integrity_algorithm: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct SyncBody {
    sequence: u64,
    ordinal: u32,
    total: u32,
    block_size: usize,
    k: usize,
    orig_len: usize,
    integrity_check: String,
    #[serde(default)]
    integrity_algorithm: Option<String>,
    confirmation_required: u32,
}

impl Frame {
    /// Renders this frame to its wire string.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Meta(meta) => {
                let body = MetaBody {
                    block_size: meta.block_size,
                    k: meta.k,
                    orig_len: meta.orig_len,
                    integrity_check: meta.integrity_check.clone(),
                    integrity_algorithm: Some(algorithm_name(meta.integrity_algorithm).to_string()),
                };
                // `serde_json::to_string` on a struct of plain scalars and
                // one `String` cannot fail.
                format!("{META_TAG}{}", serde_json::to_string(&body).unwrap_or_default())
            },
            Self::Sync { sequence, ordinal, total, confirmation_required, metadata } => {
                let body = SyncBody {
                    sequence: *sequence,
                    ordinal: *ordinal,
                    total: *total,
                    block_size: metadata.block_size,
                    k: metadata.k,
                    orig_len: metadata.orig_len,
                    integrity_check: metadata.integrity_check.clone(),
                    integrity_algorithm: Some(
                        algorithm_name(metadata.integrity_algorithm).to_string(),
                    ),
                    confirmation_required: *confirmation_required,
                };
                format!("{SYNC_TAG}{}", serde_json::to_string(&body).unwrap_or_default())
            },
            Self::Symbol { sequence, indices, payload } => {
                let indices_str =
                    indices.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
                let payload_hex = hex::encode(payload);
                format!("{SYMBOL_TAG}{sequence}|{indices_str}|{payload_hex}")
            },
        }
    }

    /// Parses a frame string produced by [`Frame::encode`].
    ///
    /// Never panics, even on truncated or otherwise malformed input;
    /// returns a typed [`FrameError`] instead (spec.md §4.4).
    ///
    /// # Errors
    ///
    /// Returns [`FrameError`] for an unknown tag, an unparseable integer,
    /// malformed hex, a malformed JSON body, or a structurally invalid
    /// index list. This function does not have access to a session's `k`
    /// or `block_size`, so it cannot check index range or payload length
    /// against them; those checks happen once metadata is known, in
    /// `tightbeam_core::FountainDecoder::ingest`.
    pub fn parse(s: &str) -> Result<Self, FrameError> {
        if let Some(rest) = s.strip_prefix(META_TAG) {
            return Self::parse_meta(rest);
        }
        if let Some(rest) = s.strip_prefix(SYNC_TAG) {
            return Self::parse_sync(rest);
        }
        if let Some(rest) = s.strip_prefix(SYMBOL_TAG) {
            return Self::parse_symbol(rest);
        }
        let tag: String = s.chars().take(2).collect();
        Err(FrameError::UnknownTag { tag })
    }

    fn parse_meta(body: &str) -> Result<Self, FrameError> {
        let body: MetaBody = serde_json::from_str(body)
            .map_err(|e| FrameError::MalformedJson { reason: e.to_string() })?;
        let algorithm = match body.integrity_algorithm.as_deref() {
            Some(name) => parse_algorithm_name(name)?,
            None => IntegrityAlgorithm::Sha256,
        };
        let metadata =
            BroadcastMetadata::new(body.block_size, body.k, body.orig_len, body.integrity_check, algorithm)
                .map_err(|e| FrameError::MalformedJson { reason: e.to_string() })?;
        Ok(Self::Meta(metadata))
    }

    fn parse_sync(body: &str) -> Result<Self, FrameError> {
        let body: SyncBody = serde_json::from_str(body)
            .map_err(|e| FrameError::MalformedJson { reason: e.to_string() })?;
        let algorithm = match body.integrity_algorithm.as_deref() {
            Some(name) => parse_algorithm_name(name)?,
            None => IntegrityAlgorithm::Sha256,
        };
        let metadata = BroadcastMetadata::new(
            body.block_size,
            body.k,
            body.orig_len,
            body.integrity_check,
            algorithm,
        )
        .map_err(|e| FrameError::MalformedJson { reason: e.to_string() })?;
        Ok(Self::Sync {
            sequence: body.sequence,
            ordinal: body.ordinal,
            total: body.total,
            confirmation_required: body.confirmation_required,
            metadata,
        })
    }

    fn parse_symbol(body: &str) -> Result<Self, FrameError> {
        let segments: Vec<&str> = body.splitn(3, '|').collect();
        if segments.len() != 3 {
            return Err(FrameError::TruncatedFrame);
        }
        let (sequence_str, indices_str, payload_str) = (segments[0], segments[1], segments[2]);

        let sequence: u64 = sequence_str.parse().map_err(|_| FrameError::MalformedInteger {
            field: "sequence",
            value: sequence_str.to_string(),
        })?;

        let mut indices = Vec::new();
        if !indices_str.is_empty() {
            for part in indices_str.split(',') {
                let idx: usize = part.parse().map_err(|_| FrameError::MalformedInteger {
                    field: "index",
                    value: part.to_string(),
                })?;
                indices.push(idx);
            }
        }
        if indices.is_empty() {
            return Err(FrameError::EmptyIndices);
        }
        {
            let mut sorted = indices.clone();
            sorted.sort_unstable();
            if sorted.windows(2).any(|w| w[0] == w[1]) {
                return Err(FrameError::DuplicateIndex);
            }
            indices = sorted;
        }

        let payload = hex::decode(payload_str).map_err(|_| FrameError::MalformedHex)?;

        Ok(Self::Symbol { sequence, indices, payload })
    }
}
