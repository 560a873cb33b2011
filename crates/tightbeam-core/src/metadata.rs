//! Session-invariant broadcast metadata and the integrity checksum.
//!
//! [`BroadcastMetadata`] is the set of values that stay constant across a
//! single broadcast session (spec.md §3): the source block layout and the
//! checksum a receiver uses to confirm a fully-solved payload is the one
//! that was sent. It is carried on the wire by both the Meta frame and
//! every Sync frame (`tightbeam-proto::frame::Frame`).

use crate::error::CoreError;

/// Checksum function used to verify a recovered payload (spec.md §6).
///
/// `Sha256` is the documented default. `Crc32c` is the low-overhead
/// alternative spec.md §6 allows when bandwidth is tight; Tightbeam does
/// not pick it automatically, a session must opt in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegrityAlgorithm {
    /// SHA-256, hex-encoded. Default.
    Sha256,
    /// CRC-32C, hex-encoded (8 hex digits).
    Crc32c,
}

impl Default for IntegrityAlgorithm {
    fn default() -> Self {
        Self::Sha256
    }
}

impl IntegrityAlgorithm {
    /// Computes the hex-encoded digest of `payload` under this algorithm.
    #[must_use]
    pub fn digest(self, payload: &[u8]) -> String {
        match self {
            Self::Sha256 => {
                use sha2::{Digest, Sha256};
                let mut hasher = Sha256::new();
                hasher.update(payload);
                hex::encode(hasher.finalize())
            },
            Self::Crc32c => {
                let checksum = crc32c::crc32c(payload);
                hex::encode(checksum.to_be_bytes())
            },
        }
    }

    /// Textual name used in session logs; not part of the wire format.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Crc32c => "crc32c",
        }
    }
}

/// Metadata that is constant across an entire broadcast session.
///
/// # Invariants
///
/// - `block_size > 0`
/// - `k > 0`, except the degenerate empty-payload session where `k == 0`
///   and `orig_len == 0` (spec.md §8): there is nothing to encode, and a
///   receiver is considered decode-complete the moment metadata installs.
/// - `orig_len <= k * block_size`
///
/// [`BroadcastMetadata::new`] enforces these and returns
/// [`CoreError::InvalidMetadata`] otherwise; every other constructor in
/// this crate that produces a `BroadcastMetadata` routes through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastMetadata {
    /// Size in bytes of every source block (the last is zero-padded).
    pub block_size: usize,
    /// Number of source blocks, `ceil(orig_len / block_size)`.
    pub k: usize,
    /// Length of the original payload before padding.
    pub orig_len: usize,
    /// Hex-encoded checksum of the original payload.
    pub integrity_check: String,
    /// Algorithm `integrity_check` was computed with.
    pub integrity_algorithm: IntegrityAlgorithm,
}

impl BroadcastMetadata {
    /// Builds metadata, validating the size invariants in spec.md §3.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidMetadata`] if `block_size == 0`,
    /// `k == 0`, or `orig_len > k * block_size`.
    pub fn new(
        block_size: usize,
        k: usize,
        orig_len: usize,
        integrity_check: String,
        integrity_algorithm: IntegrityAlgorithm,
    ) -> Result<Self, CoreError> {
        if block_size == 0 {
            return Err(CoreError::InvalidMetadata {
                reason: "block_size must be greater than zero".to_string(),
            });
        }
        if k == 0 && orig_len != 0 {
            return Err(CoreError::InvalidMetadata {
                reason: "k must be greater than zero unless orig_len is also zero".to_string(),
            });
        }
        let capacity = block_size.checked_mul(k).ok_or_else(|| CoreError::InvalidMetadata {
            reason: "block_size * k overflows".to_string(),
        })?;
        if orig_len > capacity {
            return Err(CoreError::InvalidMetadata {
                reason: format!("orig_len {orig_len} exceeds k*block_size {capacity}"),
            });
        }
        Ok(Self { block_size, k, orig_len, integrity_check, integrity_algorithm })
    }
}

/// A single fountain output symbol (spec.md §3).
///
/// `payload` is the XOR of the source blocks named by `indices`. A
/// systematic symbol has exactly one index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Source block indices this symbol covers, always distinct.
    pub indices: Vec<usize>,
    /// XOR of the named source blocks, length `block_size`.
    pub payload: Vec<u8>,
}

impl Symbol {
    /// Number of source blocks this symbol still covers.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.indices.len()
    }

    /// `true` if this is a degree-1 (systematic) symbol.
    #[must_use]
    pub fn is_systematic(&self) -> bool {
        self.indices.len() == 1
    }
}
