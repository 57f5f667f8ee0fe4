//! Formatting utility functions.
//!
//! Provides the textual report layout and human-readable helpers. Nothing
//! here derives new facts; it only lays out what a report already holds.

use std::fmt::Write;

use crate::analysis::{DifferentialResult, HeaderProbe, RepeatedPattern, MAX_ENTROPY};
use crate::config::RenderOptions;
use crate::report::AnalysisReport;

/// Format a byte count for log lines, in binary units.
///
/// Counts below 1 KB are printed exactly; larger ones with two decimals.
///
/// ```
/// use fathom::util::format::format_bytes;
/// assert_eq!(format_bytes(240), "240 B");
/// assert_eq!(format_bytes(3 * 1024 * 1024 / 2), "1.50 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut scaled = bytes as f64 / 1024.0;
    let mut unit = 0;
    while scaled >= 1024.0 && unit + 1 < UNITS.len() {
        scaled /= 1024.0;
        unit += 1;
    }
    format!("{scaled:.2} {}", UNITS[unit])
}

/// Format a hex dump string for a data chunk.
///
/// Format: `XXXXXXXX  XX XX XX XX XX XX XX XX  XX XX XX XX XX XX XX XX  |................|`
pub fn hex_dump(data: &[u8], start_offset: usize) -> String {
    const BYTES_PER_LINE: usize = 16;

    let mut output = String::with_capacity(data.len() * 4);

    for (i, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        let _ = write!(output, "{:08X}  ", start_offset + i * BYTES_PER_LINE);

        for (idx, &byte) in chunk.iter().enumerate() {
            let _ = write!(output, "{byte:02X} ");
            if idx == 7 {
                output.push(' ');
            }
        }

        // Padding for incomplete lines
        let remaining = BYTES_PER_LINE - chunk.len();
        if remaining > 0 {
            output.push_str(&"   ".repeat(remaining));
            if chunk.len() <= 8 {
                output.push(' ');
            }
        }

        output.push_str(" |");
        for &byte in chunk {
            output.push(if (32..=126).contains(&byte) {
                byte as char
            } else {
                '.'
            });
        }
        output.push_str("|\n");
    }

    output
}

/// Render an entropy value as a fixed-width bar.
///
/// The bar scales linearly from 0 to [`MAX_ENTROPY`] onto `width` characters.
pub fn entropy_bar(entropy: f64, width: usize) -> String {
    let filled = (entropy * width as f64 / MAX_ENTROPY).round().max(0.0) as usize;
    let filled = filled.min(width);
    format!("{}{}", "#".repeat(filled), " ".repeat(width - filled))
}

fn render_header(out: &mut String, header: &HeaderProbe) {
    out.push_str("Header:\n");
    match &header.magic {
        Some(tag) => {
            let _ = writeln!(out, "  Magic: {} (0x{:08X})", tag.text, tag.value);
        }
        None => out.push_str("  Magic: none\n"),
    }
    out.push_str("  Count candidates:");
    if header.count_candidates.is_empty() {
        out.push_str(" none");
    }
    for candidate in &header.count_candidates {
        let _ = write!(out, " @{}={}", candidate.offset, candidate.value);
    }
    out.push('\n');
    for line in hex_dump(&header.prefix, 0).lines() {
        let _ = writeln!(out, "  {line}");
    }
}

fn render_patterns(out: &mut String, patterns: &[RepeatedPattern]) {
    let _ = writeln!(out, "Repeated Patterns ({}):", patterns.len());
    for pattern in patterns {
        let hex: Vec<String> = pattern.bytes.iter().map(|b| format!("{b:02X}")).collect();
        let _ = writeln!(
            out,
            "  {}  x{} @{}",
            hex.join(" "),
            pattern.count,
            pattern.first_offset
        );
    }
}

/// Render a report as text.
///
/// Layout: file name, size, stride scores, then one line per entropy chunk.
/// Header and pattern sections follow when the report carries them.
pub fn render_report(report: &AnalysisReport, options: &RenderOptions) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "File: {}", report.name());
    let _ = writeln!(out, "Size: {} bytes", report.len());

    out.push_str("Alignment Scores:");
    for entry in report.alignment().iter() {
        let _ = write!(out, " {}:{}", entry.stride.bytes(), entry.score());
    }
    out.push('\n');

    let map = report.entropy();
    let _ = writeln!(out, "Entropy Map ({} chunks):", map.len());
    for (offset, entropy) in map.iter() {
        let _ = writeln!(
            out,
            "{:>4}: [{}] {:.2}",
            offset,
            entropy_bar(entropy, options.bar_width),
            entropy
        );
    }

    if let Some(header) = report.header() {
        render_header(&mut out, header);
    }
    if let Some(patterns) = report.patterns() {
        render_patterns(&mut out, patterns);
    }

    out
}

/// Render the differential section.
pub fn render_differential(diff: &DifferentialResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\nDifferential Analysis ({} vs {}):",
        diff.left_name, diff.right_name
    );
    if diff.is_size_match() {
        out.push_str("Size match.\n");
    } else {
        let _ = writeln!(
            out,
            "Size diff: {} vs {} (Delta: {})",
            diff.left_len, diff.right_len, diff.delta
        );
    }
    out
}
