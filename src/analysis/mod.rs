//! Analysis algorithms for binary structure inference.
//!
//! This module provides the signal extractors:
//! - Per-chunk Shannon entropy
//! - Fixed-stride alignment scoring
//! - Header probing for magic tags and counts
//! - Repeated n-gram detection
//! - Pairwise differential size comparison

pub mod alignment;
pub mod byte;
pub mod differential;
pub mod entropy;
pub mod pattern;

// Re-export commonly used items
pub use alignment::{
    score_alignment, AlignmentScore, PredicateHits, ScoringRules, Stride, StrideScore,
    WindowWidth, DEFAULT_SMALL_INT_THRESHOLD,
};
pub use byte::{probe_header, CountCandidate, HeaderProbe, MagicTag};
pub use differential::{compare, DifferentialResult};
pub use entropy::{
    byte_histogram, calculate_entropy, entropy_map, EntropyBand, EntropyMap, ANALYSIS_WINDOW,
    MAX_ENTROPY,
};
pub use pattern::{repeated_patterns, RepeatedPattern};
