//! Analysis report assembly.
//!
//! A report is built once from an immutable buffer and never changes. The
//! buffer stays attached so later comparisons can reach the raw bytes.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::analysis::{
    calculate_entropy, entropy_map, probe_header, repeated_patterns, score_alignment,
    AlignmentScore, EntropyBand, EntropyMap, HeaderProbe, RepeatedPattern,
};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::loader::{self, ByteBuffer};

/// Everything the engine learned about one file.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    name: String,
    len: usize,
    #[serde(skip)]
    buffer: Arc<ByteBuffer>,
    overall_entropy: f64,
    entropy: EntropyMap,
    alignment: AlignmentScore,
    #[serde(skip_serializing_if = "Option::is_none")]
    header: Option<HeaderProbe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    patterns: Option<Vec<RepeatedPattern>>,
}

impl AnalysisReport {
    /// Caller-supplied name of the analyzed input.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of the input in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the input was empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The analyzed bytes.
    pub fn buffer(&self) -> &Arc<ByteBuffer> {
        &self.buffer
    }

    /// Entropy of the whole input.
    pub fn overall_entropy(&self) -> f64 {
        self.overall_entropy
    }

    /// Per-chunk entropy.
    pub fn entropy(&self) -> &EntropyMap {
        &self.entropy
    }

    /// Per-stride alignment scores.
    pub fn alignment(&self) -> &AlignmentScore {
        &self.alignment
    }

    /// Header probe, when enabled.
    pub fn header(&self) -> Option<&HeaderProbe> {
        self.header.as_ref()
    }

    /// Repeated n-grams, when enabled.
    pub fn patterns(&self) -> Option<&[RepeatedPattern]> {
        self.patterns.as_deref()
    }
}

/// Analyze an already-loaded buffer.
///
/// Entropy profiling, alignment scoring and the optional probes run
/// concurrently; they only share read access to the buffer.
#[tracing::instrument(level = "debug", skip(buffer, config), fields(len = buffer.len()))]
pub fn analyze(name: &str, buffer: Arc<ByteBuffer>, config: &AnalysisConfig) -> AnalysisReport {
    let data: &[u8] = &buffer;
    let strides = config.normalized_strides();

    let ((entropy, overall_entropy), (alignment, (header, patterns))) = rayon::join(
        || (entropy_map(data, config.chunk_size), calculate_entropy(data)),
        || {
            rayon::join(
                || score_alignment(data, &strides, &config.scoring),
                || {
                    let header = config
                        .probe_header
                        .then(|| probe_header(data, config.scoring.small_int_threshold));
                    let patterns = config
                        .pattern_width
                        .map(|width| repeated_patterns(data, width.get(), config.pattern_limit));
                    (header, patterns)
                },
            )
        },
    );

    debug!(
        chunks = entropy.len(),
        overall_entropy,
        band = EntropyBand::of(overall_entropy).describe(),
        best_stride = ?alignment.best(),
        "analysis complete"
    );

    AnalysisReport {
        name: name.to_string(),
        len: data.len(),
        buffer,
        overall_entropy,
        entropy,
        alignment,
        header,
        patterns,
    }
}

/// Analyze bytes held in memory.
pub fn analyze_bytes(
    name: &str,
    bytes: impl Into<ByteBuffer>,
    config: &AnalysisConfig,
) -> AnalysisReport {
    analyze(name, Arc::new(bytes.into()), config)
}

/// Load and analyze a file. The report is named after the path as given.
pub fn analyze_path(path: &Path, config: &AnalysisConfig) -> Result<AnalysisReport> {
    let buffer = loader::load(path, config.max_input_bytes)?;
    Ok(analyze(
        &path.display().to_string(),
        Arc::new(buffer),
        config,
    ))
}

/// Analyze several files in sequence.
///
/// Each input gets its own result; a file that fails to load does not stop
/// the ones after it.
pub fn analyze_paths<P: AsRef<Path>>(
    paths: &[P],
    config: &AnalysisConfig,
) -> Vec<Result<AnalysisReport>> {
    paths
        .iter()
        .map(|path| {
            let result = analyze_path(path.as_ref(), config);
            if let Err(e) = &result {
                warn!(error = %e, "skipping input");
            }
            result
        })
        .collect()
}
