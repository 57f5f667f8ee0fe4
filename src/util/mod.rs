//! Utility functions shared across the crate.
//!
//! This module provides:
//! - Report and differential text rendering
//! - Data formatting helpers

pub mod format;

pub use format::{entropy_bar, format_bytes, hex_dump, render_differential, render_report};
