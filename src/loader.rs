//! File loading into an immutable byte buffer.
//!
//! Files are memory-mapped read-only so large inputs do not need a second
//! copy in RAM. Pipes, character devices and files whose metadata reports no
//! size (procfs) are read to EOF into an owned vector instead.

use std::fs::File;
use std::io::Read;
use std::ops::Deref;
use std::path::Path;

use memmap2::Mmap;
use tracing::{debug, info};

use crate::error::{AnalysisError, Result};
use crate::util::format_bytes;

/// Immutable bytes under analysis.
#[derive(Debug)]
pub enum ByteBuffer {
    /// Read-only mapping of a file on disk.
    Mapped(Mmap),
    /// Bytes owned in memory.
    Owned(Vec<u8>),
}

impl ByteBuffer {
    /// Number of bytes in the buffer.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the contents.
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Self::Mapped(map) => &map[..],
            Self::Owned(bytes) => &bytes[..],
        }
    }
}

impl Deref for ByteBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Owned(bytes)
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::Owned(bytes.to_vec())
    }
}

/// Load a file into a [`ByteBuffer`].
///
/// `max_bytes` rejects oversized inputs before any mapping happens. For
/// streamed sources the limit is enforced while reading, so the reported
/// size is at most one byte past the limit.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn load(path: &Path, max_bytes: Option<u64>) -> Result<ByteBuffer> {
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    let metadata = file.metadata().map_err(|e| AnalysisError::io(path, e))?;
    let size = metadata.len();

    if !metadata.is_file() || size == 0 {
        debug!(regular = metadata.is_file(), "size unknown, reading to end");
        return read_stream(path, file, max_bytes);
    }

    check_limit(path, size, max_bytes)?;

    // SAFETY: the mapping is read-only and never handed out mutably. Like any
    // mmap, it assumes no other process truncates the file while it is mapped.
    let map = unsafe { Mmap::map(&file) }.map_err(|e| AnalysisError::io(path, e))?;
    info!(size = %format_bytes(size), "loaded file");

    Ok(ByteBuffer::Mapped(map))
}

fn check_limit(path: &Path, size: u64, max_bytes: Option<u64>) -> Result<()> {
    match max_bytes {
        Some(limit) if size > limit => Err(AnalysisError::InputTooLarge {
            path: path.to_path_buf(),
            size,
            limit,
        }),
        _ => Ok(()),
    }
}

fn read_stream(path: &Path, file: File, max_bytes: Option<u64>) -> Result<ByteBuffer> {
    let mut bytes = Vec::new();
    // One byte past the limit is enough to tell the input is oversized.
    let cap = max_bytes.map_or(u64::MAX, |limit| limit.saturating_add(1));
    file.take(cap)
        .read_to_end(&mut bytes)
        .map_err(|e| AnalysisError::io(path, e))?;

    let size = bytes.len() as u64;
    check_limit(path, size, max_bytes)?;
    info!(size = %format_bytes(size), "read stream");

    Ok(ByteBuffer::Owned(bytes))
}
