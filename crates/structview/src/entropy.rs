//! Shannon entropy over fixed-size blocks.
//!
//! Values are in bits per byte, from 0.0 (a single repeated byte) to 8.0
//! (uniformly distributed bytes). The last block may be shorter than
//! `block_size`.

use crate::{errors::SourceError, source::ByteSource};

/// Entropy of a single buffer. An empty buffer has entropy 0.
pub fn shannon_entropy(bytes: &[u8]) -> f64 {
    if bytes.is_empty() {
        return 0.0;
    }

    let mut counts = [0u64; 256];
    for b in bytes {
        counts[*b as usize] += 1;
    }

    let total = bytes.len() as f64;
    counts
        .iter()
        .filter(|c| **c > 0)
        .map(|c| {
            let p = *c as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Entropy of each `block_size` chunk of `bytes`. A zero block size yields
/// no blocks.
pub fn block_entropy(bytes: &[u8], block_size: usize) -> Vec<f64> {
    if block_size == 0 {
        return Vec::new();
    }
    bytes.chunks(block_size).map(shannon_entropy).collect()
}

/// Entropy of each `block_size` block of a source, read one block at a time.
///
/// # Errors
/// Propagates read failures from the source.
pub async fn source_entropy(
    source: &dyn ByteSource,
    block_size: u64,
) -> Result<Vec<f64>, SourceError> {
    if block_size == 0 {
        return Ok(Vec::new());
    }

    let size = source.size();
    let mut out = Vec::with_capacity(size.div_ceil(block_size) as usize);
    let mut start = 0;
    while start < size {
        let end = start.saturating_add(block_size).min(size);
        let block = source.read_range(start, end).await?;
        out.push(shannon_entropy(&block));
        start = end;
    }
    Ok(out)
}
