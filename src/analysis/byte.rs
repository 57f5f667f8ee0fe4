//! Byte classification and header probing.
//!
//! Many binary formats open with a short ASCII tag followed by a handful of
//! little-endian counts. The probe here looks for exactly that shape in the
//! first 16 bytes. It reports candidates only; whether a number really is a
//! record count is for the caller to decide.

use serde::{Deserialize, Serialize};

/// Byte classification flags.
/// Bit 0: Is printable ASCII (32-126)
/// Bit 1: Is ASCII alphanumeric
const FLAG_TEXT: u8 = 0b01;
const FLAG_ALNUM: u8 = 0b10;

/// Precomputed byte classification lookup table.
const fn generate_byte_class_lut() -> [u8; 256] {
    let mut lut = [0u8; 256];
    let mut i = 0usize;
    while i < 256 {
        let mut flags = 0u8;
        if i >= 32 && i <= 126 {
            flags |= FLAG_TEXT;
        }
        let b = i as u8;
        if b.is_ascii_alphanumeric() {
            flags |= FLAG_ALNUM;
        }
        lut[i] = flags;
        i += 1;
    }
    lut
}

/// Static byte classification lookup table (computed at compile time).
static BYTE_CLASS_LUT: [u8; 256] = generate_byte_class_lut();

/// Number of leading bytes the header probe inspects.
pub const HEADER_PROBE_LEN: usize = 16;

/// Length of the magic tag candidate.
const MAGIC_LEN: usize = 4;

/// Whether `byte` is printable ASCII.
#[inline]
pub fn is_printable(byte: u8) -> bool {
    BYTE_CLASS_LUT[byte as usize] & FLAG_TEXT != 0
}

#[inline]
fn is_alnum(byte: u8) -> bool {
    BYTE_CLASS_LUT[byte as usize] & FLAG_ALNUM != 0
}

/// A leading ASCII tag such as `SMSH` or `RIFF`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicTag {
    /// Tag as text.
    pub text: String,
    /// Tag bytes read as a little-endian u32.
    pub value: u32,
}

/// A header word that might be an element count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountCandidate {
    /// Byte offset of the word.
    pub offset: usize,
    /// Little-endian value.
    pub value: u32,
}

/// What the first bytes of the file look like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderProbe {
    /// ASCII tag at offset 0, if the first four bytes are alphanumeric.
    pub magic: Option<MagicTag>,
    /// Words at offsets 4, 8 and 12 that fall below the threshold.
    pub count_candidates: Vec<CountCandidate>,
    /// Up to the first 16 bytes, kept for display.
    pub prefix: Vec<u8>,
}

#[inline]
fn read_u32_le(bytes: &[u8]) -> u32 {
    u32::from(bytes[0])
        | u32::from(bytes[1]) << 8
        | u32::from(bytes[2]) << 16
        | u32::from(bytes[3]) << 24
}

/// Probe the start of `data` for a magic tag and count-like words.
///
/// `threshold` is the same small-integer bound used for alignment scoring.
pub fn probe_header(data: &[u8], threshold: u64) -> HeaderProbe {
    let magic = data
        .get(..MAGIC_LEN)
        .filter(|tag| tag.iter().all(|&b| is_alnum(b)))
        .map(|tag| MagicTag {
            text: tag.iter().map(|&b| b as char).collect(),
            value: read_u32_le(tag),
        });

    let count_candidates = (MAGIC_LEN..HEADER_PROBE_LEN)
        .step_by(4)
        .filter_map(|offset| {
            let word = data.get(offset..offset + 4)?;
            let value = read_u32_le(word);
            (u64::from(value) < threshold).then_some(CountCandidate { offset, value })
        })
        .collect();

    HeaderProbe {
        magic,
        count_candidates,
        prefix: data[..data.len().min(HEADER_PROBE_LEN)].to_vec(),
    }
}
