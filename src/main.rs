//! FATHOM - structural signal extraction for unknown binary formats.
//!
//! Prints the entropy map and stride scores of a file, and optionally the
//! size delta against a second sample of the same format.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use fathom::analysis::{ScoringRules, WindowWidth};
use fathom::util::{render_differential, render_report};
use fathom::{analyze_path, compare, AnalysisConfig, AnalysisReport, DifferentialResult};
use fathom::{RenderOptions, Stride};

/// Window shape for alignment scoring.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum WindowArg {
    /// Always read 4-byte words
    Fixed4,
    /// Read words as wide as the stride
    Stride,
}

impl From<WindowArg> for WindowWidth {
    fn from(arg: WindowArg) -> Self {
        match arg {
            WindowArg::Fixed4 => Self::Fixed4,
            WindowArg::Stride => Self::Stride,
        }
    }
}

#[derive(Parser)]
#[command(name = "fathom")]
#[command(version, about = "Structural signals for unknown binary file formats", long_about = None)]
struct Cli {
    /// File to analyze
    primary: PathBuf,

    /// Second sample of the same format, for differential size analysis
    compare: Option<PathBuf>,

    /// Bytes per entropy chunk
    #[arg(long, default_value = "64", value_name = "BYTES")]
    chunk_size: NonZeroUsize,

    /// Candidate strides to score
    #[arg(long, value_delimiter = ',', default_value = "2,4,8", value_parser = parse_stride)]
    strides: Vec<Stride>,

    /// Words below this value count as plausible integers
    #[arg(long, default_value_t = fathom::analysis::DEFAULT_SMALL_INT_THRESHOLD)]
    threshold: u64,

    /// Window width policy for alignment scoring
    #[arg(long, value_enum, default_value = "fixed4")]
    window: WindowArg,

    /// Also score windows that decode to plausible floats
    #[arg(long)]
    floats: bool,

    /// Also score windows of printable ASCII
    #[arg(long)]
    ascii: bool,

    /// Probe the first 16 bytes for a magic tag and counts
    #[arg(long)]
    header: bool,

    /// Report repeated n-grams of this width
    #[arg(long, value_name = "WIDTH")]
    patterns: Option<NonZeroUsize>,

    /// Number of repeated n-grams to report
    #[arg(long, default_value_t = fathom::config::DEFAULT_PATTERN_LIMIT)]
    top: usize,

    /// Width of the entropy bar
    #[arg(long, default_value_t = fathom::config::DEFAULT_BAR_WIDTH)]
    bar_width: usize,

    /// Refuse inputs larger than this many bytes
    #[arg(long, value_name = "BYTES")]
    max_size: Option<u64>,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> AnalysisConfig {
        AnalysisConfig {
            chunk_size: self.chunk_size,
            strides: self.strides.clone(),
            scoring: ScoringRules {
                small_int_threshold: self.threshold,
                window: self.window.into(),
                floats: self.floats,
                ascii: self.ascii,
            },
            probe_header: self.header,
            pattern_width: self.patterns,
            pattern_limit: self.top,
            max_input_bytes: self.max_size,
        }
    }
}

fn parse_stride(s: &str) -> Result<Stride, String> {
    let bytes: usize = s.trim().parse().map_err(|e| format!("{e}"))?;
    Stride::from_bytes(bytes)
        .ok_or_else(|| format!("unsupported stride {bytes} (expected 2, 4 or 8)"))
}

fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load(path: &Path, config: &AnalysisConfig) -> Result<AnalysisReport> {
    analyze_path(path, config).with_context(|| format!("cannot analyze {}", path.display()))
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    reports: Vec<&'a AnalysisReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    differential: Option<DifferentialResult>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config();
    let render = RenderOptions {
        bar_width: cli.bar_width,
    };

    let primary = load(&cli.primary, &config)?;

    if cli.json {
        let secondary = cli
            .compare
            .as_ref()
            .map(|path| load(path, &config))
            .transpose()?;
        let output = JsonOutput {
            reports: std::iter::once(&primary).chain(secondary.as_ref()).collect(),
            differential: secondary.as_ref().map(|other| compare(&primary, other)),
        };
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &output)?;
        writeln!(stdout)?;
        return Ok(());
    }

    let mut stdout = io::stdout().lock();
    stdout.write_all(render_report(&primary, &render).as_bytes())?;
    stdout.flush()?;

    if let Some(path) = &cli.compare {
        let secondary = load(path, &config)?;
        stdout.write_all(render_differential(&compare(&primary, &secondary)).as_bytes())?;
    }

    Ok(())
}
