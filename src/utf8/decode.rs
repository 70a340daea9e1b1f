//! Single-sequence UTF-8 decoding.
//!
//! The decoder reads exactly one sequence starting at a given offset. It
//! checks structure only: lead byte, length, continuation bytes and overlong
//! forms. Whether the decoded value is an acceptable character is decided by
//! [`classify`](super::classify).

use core::fmt;

/// A successfully decoded sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// The decoded scalar. May still be a surrogate or above U+10FFFF.
    pub code_point: u32,
    /// Number of bytes consumed (1-4).
    pub len: usize,
}

/// Why a sequence failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// A continuation byte (`10xxxxxx`) appeared where a lead byte was expected.
    UnexpectedContinuation,
    /// A byte in `0xF8..=0xFF` would start a 5+ byte sequence.
    InvalidLeadByte,
    /// The lead byte announced `needed` bytes but only `available` remain.
    TruncatedSequence { needed: usize, available: usize },
    /// The byte at `index` (relative to the lead byte) is not a continuation byte.
    InvalidContinuation { index: usize },
    /// The sequence encodes `code_point` with more bytes than necessary.
    Overlong { code_point: u32, len: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedContinuation => write!(f, "unexpected continuation byte"),
            Self::InvalidLeadByte => write!(f, "invalid lead byte (5+ byte sequence)"),
            Self::TruncatedSequence { needed, available } => write!(
                f,
                "truncated sequence (expected {} bytes, got {})",
                needed, available
            ),
            Self::InvalidContinuation { index } => {
                write!(f, "invalid continuation byte at position {} of sequence", index)
            }
            Self::Overlong { code_point, len } => {
                write!(f, "overlong {}-byte encoding of U+{:04X}", len, code_point)
            }
        }
    }
}

/// Result of decoding one sequence.
pub type DecodeOutcome = Result<Decoded, DecodeError>;

/// Check if a byte is a UTF-8 continuation byte (0x80-0xBF).
#[inline(always)]
pub fn is_continuation_byte(byte: u8) -> bool {
    (byte & 0xC0) == 0x80
}

/// Get the expected sequence length from a lead byte.
/// Returns 0 for bytes that cannot start a sequence (continuation bytes or 0xF8+).
#[inline]
pub fn sequence_length(lead_byte: u8) -> usize {
    match lead_byte {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

/// Decode the sequence starting at `pos`.
///
/// `pos` must be less than `input.len()`; an out-of-bounds position is
/// reported as a zero-length truncation rather than a panic.
///
/// # Examples
///
/// ```
/// use strictutf8::utf8::{decode_at, DecodeError, Decoded};
///
/// assert_eq!(decode_at(b"A", 0), Ok(Decoded { code_point: 0x41, len: 1 }));
/// assert_eq!(
///     decode_at("x日".as_bytes(), 1),
///     Ok(Decoded { code_point: 0x65E5, len: 3 })
/// );
/// assert_eq!(
///     decode_at(&[0xC0, 0x80], 0),
///     Err(DecodeError::Overlong { code_point: 0, len: 2 })
/// );
/// ```
#[inline]
pub fn decode_at(input: &[u8], pos: usize) -> DecodeOutcome {
    let Some(&lead) = input.get(pos) else {
        return Err(DecodeError::TruncatedSequence {
            needed: 1,
            available: 0,
        });
    };

    if lead <= 0x7F {
        return Ok(Decoded {
            code_point: lead as u32,
            len: 1,
        });
    }

    let (len, min_code_point, mut cp) = if (lead & 0xE0) == 0xC0 {
        (2, 0x80, lead as u32 & 0x1F)
    } else if (lead & 0xF0) == 0xE0 {
        (3, 0x800, lead as u32 & 0x0F)
    } else if (lead & 0xF8) == 0xF0 {
        (4, 0x10000, lead as u32 & 0x07)
    } else if is_continuation_byte(lead) {
        return Err(DecodeError::UnexpectedContinuation);
    } else {
        return Err(DecodeError::InvalidLeadByte);
    };

    let available = input.len() - pos;
    if available < len {
        return Err(DecodeError::TruncatedSequence {
            needed: len,
            available,
        });
    }

    for (index, &byte) in input[pos + 1..pos + len].iter().enumerate() {
        if !is_continuation_byte(byte) {
            return Err(DecodeError::InvalidContinuation { index: index + 1 });
        }
        cp = (cp << 6) | (byte as u32 & 0x3F);
    }

    if cp < min_code_point {
        return Err(DecodeError::Overlong {
            code_point: cp,
            len,
        });
    }

    Ok(Decoded { code_point: cp, len })
}

/// Encode a Unicode code point as UTF-8 using the shortest form.
///
/// Returns `None` for surrogates and values above U+10FFFF. Non-characters
/// are encoded normally, since they are well-formed UTF-8.
///
/// # Examples
///
/// ```
/// use strictutf8::utf8::encode_code_point;
///
/// let (bytes, len) = encode_code_point(0xFFFE).unwrap();
/// assert_eq!(&bytes[..len], &[0xEF, 0xBF, 0xBE]);
///
/// assert!(encode_code_point(0xD800).is_none());
/// assert!(encode_code_point(0x110000).is_none());
/// ```
pub fn encode_code_point(cp: u32) -> Option<([u8; 4], usize)> {
    if (0xD800..=0xDFFF).contains(&cp) || cp > 0x10FFFF {
        return None;
    }

    let mut buf = [0u8; 4];

    let len = if cp < 0x80 {
        buf[0] = cp as u8;
        1
    } else if cp < 0x800 {
        buf[0] = 0xC0 | ((cp >> 6) as u8);
        buf[1] = 0x80 | ((cp & 0x3F) as u8);
        2
    } else if cp < 0x10000 {
        buf[0] = 0xE0 | ((cp >> 12) as u8);
        buf[1] = 0x80 | (((cp >> 6) & 0x3F) as u8);
        buf[2] = 0x80 | ((cp & 0x3F) as u8);
        3
    } else {
        buf[0] = 0xF0 | ((cp >> 18) as u8);
        buf[1] = 0x80 | (((cp >> 12) & 0x3F) as u8);
        buf[2] = 0x80 | (((cp >> 6) & 0x3F) as u8);
        buf[3] = 0x80 | ((cp & 0x3F) as u8);
        4
    };

    Some((buf, len))
}
