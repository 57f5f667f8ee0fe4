//! Repeated n-gram detection.
//!
//! Slides a k-byte window across the buffer one byte at a time and counts how
//! often each distinct n-gram occurs. Frequent n-grams point at record
//! separators, repeated tags or fill patterns.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// An n-gram that occurs more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatedPattern {
    /// The n-gram bytes.
    pub bytes: Vec<u8>,
    /// Number of (possibly overlapping) occurrences.
    pub count: u64,
    /// Offset of the first occurrence.
    pub first_offset: usize,
}

/// Find the `limit` most frequent `width`-byte n-grams occurring at least twice.
///
/// Ordered by count descending, then by first occurrence.
pub fn repeated_patterns(data: &[u8], width: usize, limit: usize) -> Vec<RepeatedPattern> {
    if width == 0 || limit == 0 || data.len() < width {
        return Vec::new();
    }

    let mut seen: FxHashMap<&[u8], (u64, usize)> = FxHashMap::default();
    for (offset, gram) in data.windows(width).enumerate() {
        seen.entry(gram).or_insert((0, offset)).0 += 1;
    }

    let mut repeated: Vec<RepeatedPattern> = seen
        .into_iter()
        .filter(|&(_, (count, _))| count > 1)
        .map(|(gram, (count, first_offset))| RepeatedPattern {
            bytes: gram.to_vec(),
            count,
            first_offset,
        })
        .collect();

    repeated.sort_unstable_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then(a.first_offset.cmp(&b.first_offset))
    });
    repeated.truncate(limit);
    repeated
}
