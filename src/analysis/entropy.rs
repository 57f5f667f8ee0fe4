//! Shannon entropy profiling.
//!
//! Provides per-chunk entropy maps and the byte histogram they are built on.
//! Optimized with:
//! - 4-way parallel histogram counting for larger chunks
//! - Cache-aligned histogram buffers
//! - Chunk-level parallelism via rayon

use std::num::NonZeroUsize;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Default chunk size for the entropy map.
pub const ANALYSIS_WINDOW: usize = 64;

/// Maximum entropy of 8-bit data, in bits.
pub const MAX_ENTROPY: f64 = 8.0;

/// Cache-aligned histogram for optimal memory access.
/// 64-byte alignment ensures each histogram starts on a cache line boundary.
#[repr(C, align(64))]
struct AlignedHistogram {
    counts: [u32; 256],
}

impl AlignedHistogram {
    #[inline(always)]
    const fn new() -> Self {
        Self {
            counts: [0u32; 256],
        }
    }
}

/// Count bytes using 4-way parallel histograms.
/// Consecutive bytes land in different tables, so repeated values do not
/// serialize on a single counter.
#[inline]
fn count_bytes_4way(data: &[u8], out: &mut [u32; 256]) {
    let mut h0 = AlignedHistogram::new();
    let mut h1 = AlignedHistogram::new();
    let mut h2 = AlignedHistogram::new();
    let mut h3 = AlignedHistogram::new();

    let chunks = data.chunks_exact(4);
    let remainder = chunks.remainder();

    for chunk in chunks {
        h0.counts[chunk[0] as usize] += 1;
        h1.counts[chunk[1] as usize] += 1;
        h2.counts[chunk[2] as usize] += 1;
        h3.counts[chunk[3] as usize] += 1;
    }

    for &byte in remainder {
        h0.counts[byte as usize] += 1;
    }

    for (i, slot) in out.iter_mut().enumerate() {
        *slot = h0.counts[i] + h1.counts[i] + h2.counts[i] + h3.counts[i];
    }
}

/// Count bytes sequentially (better for small data).
#[inline]
fn count_bytes_simple(data: &[u8], out: &mut [u32; 256]) {
    out.fill(0);
    for &byte in data {
        out[byte as usize] += 1;
    }
}

/// Below this, the setup overhead of 4-way counting isn't worth it.
const FOURWAY_THRESHOLD: usize = 256;

/// Dense frequency table of byte values, indexed by the byte itself.
pub fn byte_histogram(data: &[u8]) -> [u32; 256] {
    let mut counts = [0u32; 256];
    if data.len() >= FOURWAY_THRESHOLD {
        count_bytes_4way(data, &mut counts);
    } else {
        count_bytes_simple(data, &mut counts);
    }
    counts
}

/// Calculate Shannon entropy for a byte slice.
///
/// Shannon entropy measures the average information content per byte.
/// Values range from 0 (a single repeated value) to 8 (all 256 values equally
/// likely). Empty input is defined to have zero entropy.
pub fn calculate_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let counts = byte_histogram(data);
    let total = data.len() as f64;
    let mut entropy = 0.0f64;

    // Only observed values contribute, so log2(0) is never taken.
    for &count in counts.iter().filter(|&&c| c > 0) {
        let p = f64::from(count) / total;
        entropy -= p * p.log2();
    }

    entropy.clamp(0.0, MAX_ENTROPY)
}

/// Per-chunk entropy values in file order.
///
/// Each value carries its advisory [`EntropyBand`] alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntropyMap {
    chunk_size: usize,
    values: Vec<f64>,
    bands: Vec<EntropyBand>,
}

impl EntropyMap {
    /// Chunk size the map was computed with.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Entropy values, one per chunk.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Advisory band of each chunk, parallel to [`values`](Self::values).
    pub fn bands(&self) -> &[EntropyBand] {
        &self.bands
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the profiled buffer was empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(byte offset, entropy)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(move |(i, &e)| (i * self.chunk_size, e))
    }
}

/// Build the entropy map for `data`.
///
/// The final chunk may be shorter than `chunk_size`; it is scored over its
/// actual length, never padded.
pub fn entropy_map(data: &[u8], chunk_size: NonZeroUsize) -> EntropyMap {
    let values: Vec<f64> = data
        .par_chunks(chunk_size.get())
        .map(calculate_entropy)
        .collect();
    let bands = values.iter().copied().map(EntropyBand::of).collect();

    EntropyMap {
        chunk_size: chunk_size.get(),
        values,
        bands,
    }
}

/// Advisory interpretation of an entropy value.
///
/// These bands are metadata for callers. Nothing in the engine branches on
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntropyBand {
    /// Below 3.0: text, padding, sparse tables.
    Low,
    /// 3.0 to 6.0: structured records, machine code.
    Medium,
    /// 6.0 to 7.0: mixed content.
    Elevated,
    /// Above 7.0: compressed, encrypted or dense float arrays.
    High,
}

impl EntropyBand {
    /// Classify an entropy value.
    pub fn of(entropy: f64) -> Self {
        if entropy < 3.0 {
            Self::Low
        } else if entropy <= 6.0 {
            Self::Medium
        } else if entropy <= 7.0 {
            Self::Elevated
        } else {
            Self::High
        }
    }

    /// Short human-readable description.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Low => "low (text/padding)",
            Self::Medium => "medium (structured/code)",
            Self::Elevated => "elevated (mixed)",
            Self::High => "high (compressed/encrypted/dense floats)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chunk(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_entropy_uniform() {
        let data = vec![0u8; 256];
        assert_eq!(calculate_entropy(&data), 0.0);
    }

    #[test]
    fn test_entropy_random() {
        // All different bytes should have maximum entropy (8 bits)
        let data: Vec<u8> = (0..=255).collect();
        let entropy = calculate_entropy(&data);
        assert!((entropy - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_entropy_empty() {
        assert_eq!(calculate_entropy(&[]), 0.0);
    }

    #[test]
    fn test_entropy_two_values() {
        let mut data = vec![0u8; 32];
        data.extend(vec![1u8; 32]);
        assert!((calculate_entropy(&data) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fourway_counting_correctness() {
        let data: Vec<u8> = (0..1003).map(|i| (i * 17 + 31) as u8).collect();

        let mut counts_simple = [0u32; 256];
        count_bytes_simple(&data, &mut counts_simple);

        let mut counts_4way = [0u32; 256];
        count_bytes_4way(&data, &mut counts_4way);

        assert_eq!(counts_simple, counts_4way);
    }

    #[test]
    fn test_zero_file_map() {
        let map = entropy_map(&[0u8; 256], chunk(64));
        assert_eq!(map.len(), 4);
        assert!(map.values().iter().all(|&e| e == 0.0));
    }

    #[test]
    fn test_ramp_file_map() {
        let data: Vec<u8> = (0..1024).map(|i| (i % 256) as u8).collect();
        let map = entropy_map(&data, chunk(64));
        assert_eq!(map.len(), 16);
        for &e in map.values() {
            assert!((e - 6.0).abs() < 1e-12, "expected 6.0, got {e}");
        }
    }

    #[test]
    fn test_short_final_chunk() {
        // 64 zeros then 2 distinct bytes: last chunk has length 2, entropy 1.0
        let mut data = vec![0u8; 64];
        data.extend([7u8, 9u8]);
        let map = entropy_map(&data, chunk(64));
        assert_eq!(map.len(), 2);
        assert!((map.values()[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_map_offsets() {
        let map = entropy_map(&[1u8; 200], chunk(64));
        let offsets: Vec<usize> = map.iter().map(|(o, _)| o).collect();
        assert_eq!(offsets, vec![0, 64, 128, 192]);
    }

    #[test]
    fn test_empty_map() {
        let map = entropy_map(&[], chunk(64));
        assert!(map.is_empty());
        assert_eq!(map.chunk_size(), 64);
    }

    #[test]
    fn test_bands() {
        assert_eq!(EntropyBand::of(0.0), EntropyBand::Low);
        assert_eq!(EntropyBand::of(4.5), EntropyBand::Medium);
        assert_eq!(EntropyBand::of(6.5), EntropyBand::Elevated);
        assert_eq!(EntropyBand::of(7.9), EntropyBand::High);
        assert_eq!(EntropyBand::of(3.0), EntropyBand::Medium);
        assert_eq!(EntropyBand::of(7.0), EntropyBand::Elevated);
        assert_eq!(EntropyBand::Low.describe(), "low (text/padding)");
        assert_eq!(
            EntropyBand::High.describe(),
            "high (compressed/encrypted/dense floats)"
        );
    }

    #[test]
    fn test_map_carries_bands() {
        let mut data = vec![0u8; 64];
        data.extend((0..=255u8).cycle().take(256));
        let map = entropy_map(&data, chunk(64));
        assert_eq!(map.bands().len(), map.len());
        assert_eq!(map.bands()[0], EntropyBand::Low);
        assert_eq!(map.bands()[1], EntropyBand::Medium);
    }

    proptest! {
        #[test]
        fn prop_entropy_in_range(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let e = calculate_entropy(&data);
            prop_assert!((0.0..=MAX_ENTROPY).contains(&e));
        }

        #[test]
        fn prop_entropy_zero_iff_constant(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let constant = data.windows(2).all(|w| w[0] == w[1]);
            prop_assert_eq!(calculate_entropy(&data) == 0.0, constant);
        }

        #[test]
        fn prop_map_length(
            data in proptest::collection::vec(any::<u8>(), 0..2048),
            size in 1usize..300,
        ) {
            let map = entropy_map(&data, chunk(size));
            prop_assert_eq!(map.len(), data.len().div_ceil(size));
            if let Some(&last) = map.values().last() {
                let start = (map.len() - 1) * size;
                prop_assert_eq!(last, calculate_entropy(&data[start..]));
            }
        }

        #[test]
        fn prop_map_deterministic(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let a = entropy_map(&data, chunk(64));
            let b = entropy_map(&data, chunk(64));
            prop_assert_eq!(a, b);
        }
    }
}
