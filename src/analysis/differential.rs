//! Pairwise size comparison between two analyzed files.
//!
//! Two samples of the same format that differ only in element count differ in
//! size by a multiple of the element width. The comparator reports the signed
//! size delta; turning that into a record width needs record counts, which
//! only the caller can supply.

use serde::{Deserialize, Serialize};

use crate::report::AnalysisReport;

/// Size relationship between two reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifferentialResult {
    /// Name of the first (reference) file.
    pub left_name: String,
    /// Name of the second file.
    pub right_name: String,
    /// Size of the first file in bytes.
    pub left_len: u64,
    /// Size of the second file in bytes.
    pub right_len: u64,
    /// `right_len - left_len`.
    pub delta: i64,
}

impl DifferentialResult {
    /// Whether both files have the same size.
    pub fn is_size_match(&self) -> bool {
        self.delta == 0
    }

    /// Estimated bytes per record given known record counts for each side.
    ///
    /// Returns `None` when the counts are equal.
    pub fn per_record_stride(&self, left_count: u64, right_count: u64) -> Option<f64> {
        let count_delta = right_count as i128 - left_count as i128;
        if count_delta == 0 {
            return None;
        }
        Some(self.delta as f64 / count_delta as f64)
    }
}

fn signed_delta(left: u64, right: u64) -> i64 {
    let delta = i128::from(right) - i128::from(left);
    delta.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// Compare the sizes of two reports.
pub fn compare(left: &AnalysisReport, right: &AnalysisReport) -> DifferentialResult {
    let left_len = left.len() as u64;
    let right_len = right.len() as u64;

    DifferentialResult {
        left_name: left.name().to_string(),
        right_name: right.name().to_string(),
        left_len,
        right_len,
        delta: signed_delta(left_len, right_len),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::report::analyze_bytes;
    use proptest::prelude::*;

    fn report(name: &str, len: usize) -> AnalysisReport {
        analyze_bytes(name, vec![0u8; len], &AnalysisConfig::default())
    }

    #[test]
    fn test_size_diff() {
        let diff = compare(&report("a.bin", 120), &report("b.bin", 240));
        assert_eq!(diff.delta, 120);
        assert!(!diff.is_size_match());
        assert_eq!(diff.left_name, "a.bin");
        assert_eq!(diff.right_name, "b.bin");
    }

    #[test]
    fn test_size_match() {
        let diff = compare(&report("a.bin", 500), &report("b.bin", 500));
        assert_eq!(diff.delta, 0);
        assert!(diff.is_size_match());
    }

    #[test]
    fn test_negative_delta() {
        let diff = compare(&report("big", 240), &report("small", 120));
        assert_eq!(diff.delta, -120);
    }

    #[test]
    fn test_per_record_stride() {
        // 16-byte header, 10 vs 20 records of 12 bytes
        let diff = compare(&report("a", 16 + 10 * 12), &report("b", 16 + 20 * 12));
        assert_eq!(diff.per_record_stride(10, 20), Some(12.0));
        assert_eq!(diff.per_record_stride(20, 10), Some(-12.0));
        assert_eq!(diff.per_record_stride(5, 5), None);
    }

    proptest! {
        #[test]
        fn prop_delta_antisymmetric(a in any::<u64>(), b in any::<u64>()) {
            prop_assume!(a.abs_diff(b) <= i64::MAX as u64);
            prop_assert_eq!(signed_delta(a, b), -signed_delta(b, a));
        }
    }
}
