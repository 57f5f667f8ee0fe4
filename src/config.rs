//! Analysis and presentation settings.
//!
//! Every analysis call takes its configuration explicitly; there is no
//! process-wide state. Defaults reproduce the baseline heuristics: 64-byte
//! entropy chunks, strides 2/4/8, a fixed 4-byte window and the
//! small-integer predicate only.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::analysis::alignment::{ScoringRules, Stride};
use crate::analysis::entropy::ANALYSIS_WINDOW;

/// Default width of the entropy bar in rendered reports.
pub const DEFAULT_BAR_WIDTH: usize = 10;

/// Default number of repeated n-grams kept by the pattern detector.
pub const DEFAULT_PATTERN_LIMIT: usize = 8;

/// Default entropy chunk size.
pub const DEFAULT_CHUNK_SIZE: NonZeroUsize = match NonZeroUsize::new(ANALYSIS_WINDOW) {
    Some(size) => size,
    None => panic!("entropy window must be non-zero"),
};

/// Settings for a single-file analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Chunk size for the entropy map.
    pub chunk_size: NonZeroUsize,
    /// Candidate strides, scored in the order given after sorting.
    pub strides: Vec<Stride>,
    /// Predicates and window shape for alignment scoring.
    pub scoring: ScoringRules,
    /// Inspect the first 16 bytes for a magic tag and count fields.
    pub probe_header: bool,
    /// N-gram width for repeated pattern detection. `None` disables it.
    pub pattern_width: Option<NonZeroUsize>,
    /// Maximum number of repeated patterns to report.
    pub pattern_limit: usize,
    /// Reject files larger than this many bytes at load time.
    pub max_input_bytes: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            strides: Stride::all().to_vec(),
            scoring: ScoringRules::default(),
            probe_header: false,
            pattern_width: None,
            pattern_limit: DEFAULT_PATTERN_LIMIT,
            max_input_bytes: None,
        }
    }
}

impl AnalysisConfig {
    /// Strides in ascending order with duplicates removed.
    pub fn normalized_strides(&self) -> Vec<Stride> {
        let mut strides = self.strides.clone();
        strides.sort_unstable();
        strides.dedup();
        strides
    }
}

/// Settings for the textual report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Characters in a full-scale (8.0 bit) entropy bar.
    pub bar_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            bar_width: DEFAULT_BAR_WIDTH,
        }
    }
}
