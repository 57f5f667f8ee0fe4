//! Fixed-stride alignment scoring.
//!
//! For each candidate stride, walk the buffer from offset 0 in steps of the
//! stride and test the window at each position against a set of "plausible
//! structured field" predicates. Strides whose windows keep looking like
//! counts, indices or coordinates rank higher.
//!
//! The scores are ranking signals across strides, not confidences.
//!
//! By default every window is 4 bytes wide regardless of stride, so stride 2
//! reads overlapping words and stride 8 skips every other one.
//! [`WindowWidth::Stride`] switches to a window as wide as the stride, which
//! changes the numbers for strides 2 and 8.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::byte::is_printable;

/// Values below this are considered plausible counts or indices.
pub const DEFAULT_SMALL_INT_THRESHOLD: u64 = 100_000;

/// Magnitude range accepted by the float predicate.
const FLOAT_MIN_MAGNITUDE: f64 = 1e-6;
const FLOAT_MAX_MAGNITUDE: f64 = 1e6;

/// Candidate element stride in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stride {
    /// 2-byte elements (u16/i16).
    Two,
    /// 4-byte elements (u32/i32/f32).
    Four,
    /// 8-byte elements (u64/i64/f64).
    Eight,
}

impl Stride {
    /// All candidate strides in ascending order.
    pub const fn all() -> &'static [Self] {
        &[Self::Two, Self::Four, Self::Eight]
    }

    /// Stride length in bytes.
    pub const fn bytes(self) -> usize {
        match self {
            Self::Two => 2,
            Self::Four => 4,
            Self::Eight => 8,
        }
    }

    /// Parse a byte count into a stride.
    pub fn from_bytes(bytes: usize) -> Option<Self> {
        match bytes {
            2 => Some(Self::Two),
            4 => Some(Self::Four),
            8 => Some(Self::Eight),
            _ => None,
        }
    }
}

/// How many bytes each tested window covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowWidth {
    /// Always 4 bytes, reconstructed as a little-endian u32.
    #[default]
    Fixed4,
    /// As wide as the stride being tested.
    Stride,
}

impl WindowWidth {
    /// Window width in bytes for `stride`.
    pub const fn for_stride(self, stride: Stride) -> usize {
        match self {
            Self::Fixed4 => 4,
            Self::Stride => stride.bytes(),
        }
    }
}

/// Predicates and window shape used when scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Upper bound (exclusive) for the small-integer predicate.
    pub small_int_threshold: u64,
    /// Window width policy.
    pub window: WindowWidth,
    /// Also count windows that decode to a plausible IEEE-754 float.
    pub floats: bool,
    /// Also count windows made entirely of printable ASCII.
    pub ascii: bool,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            small_int_threshold: DEFAULT_SMALL_INT_THRESHOLD,
            window: WindowWidth::Fixed4,
            floats: false,
            ascii: false,
        }
    }
}

/// Hits per predicate for one stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PredicateHits {
    /// Windows below the small-integer threshold.
    pub small_int: u64,
    /// Windows decoding to a plausible float.
    pub float: u64,
    /// Windows of printable ASCII.
    pub ascii: u64,
}

/// Score for a single stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrideScore {
    /// Stride that was tested.
    pub stride: Stride,
    /// Number of windows that fit in the buffer.
    pub windows: u64,
    /// Per-predicate hit counts.
    pub hits: PredicateHits,
}

impl StrideScore {
    /// Combined score across all enabled predicates.
    pub fn score(&self) -> u64 {
        self.hits.small_int + self.hits.float + self.hits.ascii
    }
}

/// Scores for every requested stride, in ascending stride order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlignmentScore {
    scores: Vec<StrideScore>,
}

impl AlignmentScore {
    /// Score entry for `stride`, if it was a candidate.
    pub fn get(&self, stride: Stride) -> Option<&StrideScore> {
        self.scores.iter().find(|s| s.stride == stride)
    }

    /// Combined score for `stride`, or 0 when it was not scored.
    pub fn score(&self, stride: Stride) -> u64 {
        self.get(stride).map_or(0, StrideScore::score)
    }

    /// All entries.
    pub fn iter(&self) -> impl Iterator<Item = &StrideScore> {
        self.scores.iter()
    }

    /// Highest-scoring stride. Ties go to the smaller stride.
    pub fn best(&self) -> Option<Stride> {
        self.scores
            .iter()
            .filter(|s| s.score() > 0)
            .max_by(|a, b| a.score().cmp(&b.score()).then(b.stride.cmp(&a.stride)))
            .map(|s| s.stride)
    }
}

/// Reconstruct an unsigned little-endian integer from up to 8 bytes.
#[inline]
fn read_le(window: &[u8]) -> u64 {
    window
        .iter()
        .rev()
        .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte))
}

#[inline]
fn is_plausible_magnitude(value: f64) -> bool {
    value.is_finite() && (FLOAT_MIN_MAGNITUDE..=FLOAT_MAX_MAGNITUDE).contains(&value.abs())
}

/// Whether `window` decodes to a float that looks like real-world data.
///
/// Zero is excluded since the small-integer predicate already rewards it.
#[inline]
fn is_plausible_float(window: &[u8]) -> bool {
    match window.len() {
        4 => {
            let bits = read_le(window) as u32;
            is_plausible_magnitude(f64::from(f32::from_bits(bits)))
        }
        8 => is_plausible_magnitude(f64::from_bits(read_le(window))),
        _ => false,
    }
}

/// Number of stride-aligned windows of `width` bytes that fit in `len`.
///
/// A buffer shorter than one full stride has no windows, whatever the width.
#[inline]
pub fn window_count(len: usize, stride: Stride, width: usize) -> usize {
    if len < width.max(stride.bytes()) {
        0
    } else {
        (len - width) / stride.bytes() + 1
    }
}

/// Score a single stride.
pub fn score_stride(data: &[u8], stride: Stride, rules: &ScoringRules) -> StrideScore {
    let width = rules.window.for_stride(stride);
    let windows = window_count(data.len(), stride, width);
    let mut hits = PredicateHits::default();

    for i in 0..windows {
        let start = i * stride.bytes();
        let window = &data[start..start + width];

        if read_le(window) < rules.small_int_threshold {
            hits.small_int += 1;
        }
        if rules.floats && is_plausible_float(window) {
            hits.float += 1;
        }
        if rules.ascii && window.iter().all(|&b| is_printable(b)) {
            hits.ascii += 1;
        }
    }

    StrideScore {
        stride,
        windows: windows as u64,
        hits,
    }
}

/// Score every stride in `strides`, in parallel.
///
/// `strides` should already be sorted and deduplicated; the output preserves
/// their order.
pub fn score_alignment(data: &[u8], strides: &[Stride], rules: &ScoringRules) -> AlignmentScore {
    let scores = strides
        .par_iter()
        .map(|&stride| score_stride(data, stride, rules))
        .collect();

    AlignmentScore { scores }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rules() -> ScoringRules {
        ScoringRules::default()
    }

    #[test]
    fn test_zero_buffer_stride4() {
        let score = score_alignment(&[0u8; 256], Stride::all(), &rules());
        assert_eq!(score.score(Stride::Four), 64);
        assert_eq!(score.score(Stride::Two), 127);
        assert_eq!(score.score(Stride::Eight), 32);
    }

    #[test]
    fn test_short_buffer_scores_zero() {
        let score = score_alignment(&[0u8; 3], Stride::all(), &rules());
        for entry in score.iter() {
            assert_eq!(entry.windows, 0);
            assert_eq!(entry.score(), 0);
        }
    }

    #[test]
    fn test_stride_larger_than_buffer() {
        let wide = ScoringRules {
            window: WindowWidth::Stride,
            ..rules()
        };
        let entry = score_stride(&[0u8; 6], Stride::Eight, &wide);
        assert_eq!(entry.windows, 0);
        assert_eq!(entry.score(), 0);
    }

    #[test]
    fn test_stride_larger_than_buffer_fixed_window() {
        // A 4-byte window fits, but no full 8-byte stride does.
        let entry = score_stride(&[0u8; 6], Stride::Eight, &rules());
        assert_eq!(entry.windows, 0);
        assert_eq!(entry.score(), 0);

        let entry = score_stride(&[0u8; 8], Stride::Eight, &rules());
        assert_eq!(entry.windows, 1);
        assert_eq!(entry.score(), 1);
    }

    #[test]
    fn test_window_count() {
        assert_eq!(window_count(6, Stride::Eight, 4), 0);
        assert_eq!(window_count(6, Stride::Four, 4), 1);
        assert_eq!(window_count(3, Stride::Two, 4), 0);
        assert_eq!(window_count(4, Stride::Two, 4), 1);
        assert_eq!(window_count(256, Stride::Eight, 4), 32);
    }

    #[test]
    fn test_read_le_is_little_endian() {
        assert_eq!(read_le(&[0x01, 0x00, 0x00, 0x00]), 1);
        assert_eq!(read_le(&[0x00, 0x00, 0x00, 0x01]), 0x0100_0000);
        assert_eq!(read_le(&[0x34, 0x12]), 0x1234);
        assert_eq!(read_le(&[0xff; 8]), u64::MAX);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut data = Vec::new();
        data.extend_from_slice(&99_999u32.to_le_bytes());
        data.extend_from_slice(&100_000u32.to_le_bytes());
        let entry = score_stride(&data, Stride::Four, &rules());
        assert_eq!(entry.windows, 2);
        assert_eq!(entry.hits.small_int, 1);
    }

    #[test]
    fn test_index_array_tie_goes_to_smaller_stride() {
        // Stride 2 also hits every aligned word; its straddling windows miss.
        let mut data = Vec::new();
        for i in 0..64u32 {
            data.extend_from_slice(&(i * 3).to_le_bytes());
        }
        let score = score_alignment(&data, Stride::all(), &rules());
        assert_eq!(score.score(Stride::Two), 64);
        assert_eq!(score.score(Stride::Four), 64);
        assert_eq!(score.score(Stride::Eight), 32);
        assert_eq!(score.best(), Some(Stride::Two));
    }

    #[test]
    fn test_float_predicate() {
        let mut data = Vec::new();
        for v in [1.5f32, -3.25, 1.0e9, 0.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let with_floats = ScoringRules {
            floats: true,
            ..rules()
        };
        let entry = score_stride(&data, Stride::Four, &with_floats);
        assert_eq!(entry.hits.float, 2);
        // Only the zero word is a small integer
        assert_eq!(entry.hits.small_int, 1);
        assert_eq!(entry.score(), 3);
    }

    #[test]
    fn test_float_predicate_f64_window() {
        let data = 2.5f64.to_le_bytes();
        let wide = ScoringRules {
            floats: true,
            window: WindowWidth::Stride,
            ..rules()
        };
        assert_eq!(score_stride(&data, Stride::Eight, &wide).hits.float, 1);
        assert_eq!(score_stride(&data, Stride::Two, &wide).hits.float, 0);
    }

    #[test]
    fn test_ascii_predicate() {
        let with_ascii = ScoringRules {
            ascii: true,
            ..rules()
        };
        let entry = score_stride(b"SMSHtext\x00\x01\x02\x03", Stride::Four, &with_ascii);
        assert_eq!(entry.windows, 3);
        assert_eq!(entry.hits.ascii, 2);
    }

    #[test]
    fn test_stride_width_changes_windows() {
        let wide = ScoringRules {
            window: WindowWidth::Stride,
            ..rules()
        };
        let entry = score_stride(&[0u8; 16], Stride::Two, &wide);
        assert_eq!(entry.windows, 8);
        let fixed = score_stride(&[0u8; 16], Stride::Two, &rules());
        assert_eq!(fixed.windows, 7);
    }

    #[test]
    fn test_best_on_empty_score() {
        let score = score_alignment(&[], Stride::all(), &rules());
        assert_eq!(score.best(), None);
    }

    #[test]
    fn test_stride_from_bytes() {
        assert_eq!(Stride::from_bytes(4), Some(Stride::Four));
        assert_eq!(Stride::from_bytes(3), None);
    }

    proptest! {
        #[test]
        fn prop_score_bounded_by_windows(
            data in proptest::collection::vec(any::<u8>(), 0..1024),
            floats in any::<bool>(),
            ascii in any::<bool>(),
        ) {
            let r = ScoringRules { floats, ascii, ..rules() };
            for entry in score_alignment(&data, Stride::all(), &r).iter() {
                prop_assert!(entry.hits.small_int <= entry.windows);
                prop_assert!(entry.hits.float <= entry.windows);
                prop_assert!(entry.hits.ascii <= entry.windows);
            }
            for entry in score_alignment(&data, Stride::all(), &rules()).iter() {
                prop_assert!(entry.score() <= entry.windows);
            }
        }

        #[test]
        fn prop_monotonic_in_threshold(
            data in proptest::collection::vec(any::<u8>(), 0..1024),
            low in 0u64..1_000_000,
            extra in 0u64..1_000_000,
        ) {
            let a = ScoringRules { small_int_threshold: low, ..rules() };
            let b = ScoringRules { small_int_threshold: low + extra, ..rules() };
            for &stride in Stride::all() {
                prop_assert!(
                    score_stride(&data, stride, &a).score() <= score_stride(&data, stride, &b).score()
                );
            }
        }

        #[test]
        fn prop_deterministic(data in proptest::collection::vec(any::<u8>(), 0..1024)) {
            prop_assert_eq!(
                score_alignment(&data, Stride::all(), &rules()),
                score_alignment(&data, Stride::all(), &rules())
            );
        }
    }
}
