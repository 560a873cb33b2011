//! Block partitioner (spec.md §4.1).
//!
//! Splits a payload into fixed-size source blocks, zero-padding the last
//! block, and records the original length so the receiver can truncate the
//! recovered buffer back to the exact payload.

use crate::error::CoreError;

/// Source blocks for a payload, plus the metadata needed to recover it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Source blocks, each exactly `block_size` bytes.
    pub blocks: Vec<Vec<u8>>,
    /// Length of the payload before zero-padding.
    pub orig_len: usize,
    /// Size in bytes of every block.
    pub block_size: usize,
}

impl Partition {
    /// `k`, the number of source blocks.
    #[must_use]
    pub fn k(&self) -> usize {
        self.blocks.len()
    }
}

/// Splits `payload` into `ceil(payload.len() / block_size)` fixed-size
/// blocks, zero-padding the last one.
///
/// # Errors
///
/// Returns [`CoreError::InvalidMetadata`] if `block_size == 0`.
pub fn partition(payload: &[u8], block_size: usize) -> Result<Partition, CoreError> {
    if block_size == 0 {
        return Err(CoreError::InvalidMetadata {
            reason: "block_size must be greater than zero".to_string(),
        });
    }

    let orig_len = payload.len();
    // k = ceil(orig_len / block_size). The degenerate `orig_len == 0` case
    // yields k == 0 (spec.md §8): there is nothing to encode and a receiver
    // completes on metadata alone.
    let k = orig_len.div_ceil(block_size);

    let mut blocks = Vec::with_capacity(k);
    for i in 0..k {
        let start = i * block_size;
        let end = (start + block_size).min(orig_len);
        let mut block = vec![0u8; block_size];
        if start < orig_len {
            block[..end - start].copy_from_slice(&payload[start..end]);
        }
        blocks.push(block);
    }

    Ok(Partition { blocks, orig_len, block_size })
}

/// Concatenates solved blocks in index order and truncates to `orig_len`
/// (spec.md §4.6 integrity check step).
#[must_use]
pub fn reassemble(blocks: &[Vec<u8>], orig_len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(orig_len);
    for block in blocks {
        out.extend_from_slice(block);
    }
    out.truncate(orig_len);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_evenly() {
        let payload = b"The quick brown fox jumps over the lazy dog!!!!\n";
        assert_eq!(payload.len(), 48);
        let part = partition(payload, 16).unwrap();
        assert_eq!(part.k(), 3);
        assert_eq!(part.orig_len, 48);
        assert_eq!(&part.blocks[0][..], &payload[0..16]);
        assert_eq!(&part.blocks[2][..], &payload[32..48]);
    }

    #[test]
    fn pads_last_block_with_zeros() {
        let payload = vec![0u8; 200];
        let part = partition(&payload, 64).unwrap();
        assert_eq!(part.k(), 4);
        assert_eq!(part.orig_len, 200);
        // last block: 200 - 3*64 = 8 real bytes, 56 zero-padding bytes
        assert_eq!(part.blocks[3].len(), 64);
    }

    #[test]
    fn single_short_block() {
        let part = partition(b"hello", 16).unwrap();
        assert_eq!(part.k(), 1);
        assert_eq!(part.orig_len, 5);
        assert_eq!(&part.blocks[0][..5], b"hello");
        assert!(part.blocks[0][5..].iter().all(|&b| b == 0));
    }

    #[test]
    fn rejects_zero_block_size() {
        assert!(matches!(
            partition(b"x", 0),
            Err(CoreError::InvalidMetadata { .. })
        ));
    }

    #[test]
    fn empty_payload_yields_zero_blocks() {
        let part = partition(b"", 16).unwrap();
        assert_eq!(part.k(), 0);
        assert_eq!(part.orig_len, 0);
        assert!(part.blocks.is_empty());
    }

    #[test]
    fn reassemble_truncates_padding() {
        let payload = vec![1u8, 2, 3, 4, 5];
        let part = partition(&payload, 4).unwrap();
        let rebuilt = reassemble(&part.blocks, part.orig_len);
        assert_eq!(rebuilt, payload);
    }

    #[test]
    fn exact_multiple_of_block_size_has_no_padding() {
        let payload = vec![7u8; 32];
        let part = partition(&payload, 16).unwrap();
        assert_eq!(part.k(), 2);
        let rebuilt = reassemble(&part.blocks, part.orig_len);
        assert_eq!(rebuilt, payload);
    }
}
