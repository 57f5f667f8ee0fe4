//! Fathom - structural signals for unknown binary formats.
//!
//! This library inspects an opaque binary file and reports signals that help
//! infer its layout:
//! - Per-chunk Shannon entropy (the "texture" of the file)
//! - Fixed-stride alignment scores for packed integer/float arrays
//! - Pairwise size deltas between samples of the same format
//! - Optional header probing and repeated n-gram detection
//!
//! The output is a set of signals, not a verified decomposition.

pub mod analysis;
pub mod config;
pub mod error;
pub mod loader;
pub mod report;
pub mod util;

pub use analysis::{compare, DifferentialResult, Stride};
pub use config::{AnalysisConfig, RenderOptions};
pub use error::{AnalysisError, Result};
pub use loader::ByteBuffer;
pub use report::{analyze, analyze_bytes, analyze_path, analyze_paths, AnalysisReport};
