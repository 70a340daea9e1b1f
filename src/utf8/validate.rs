//! Whole-buffer validation.
//!
//! Two entry points share one traversal: [`is_valid_utf8`] answers yes or no,
//! [`validate_utf8_detailed`] additionally reports where and why the first
//! rejection happened. They never disagree on the verdict.

use alloc::string::String;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::classify::{classify, is_valid_character, CharClass};
use super::decode::{decode_at, DecodeError};

/// Error information for strict UTF-8 validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utf8Error {
    /// Byte offset of the first byte of the rejected region (0-indexed).
    pub offset: usize,
    /// The line number of `offset` (1-indexed).
    pub line: usize,
    /// The column of `offset` (byte position within the line, 1-indexed).
    pub column: usize,
    /// The kind of violation.
    pub kind: Utf8ErrorKind,
    /// The byte found at `offset`.
    pub byte: u8,
    /// The decoded scalar, when the bytes were structurally well-formed.
    pub code_point: Option<u32>,
}

/// The specific rule a buffer violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Utf8ErrorKind {
    /// A continuation byte (0x80-0xBF) appeared where a lead byte was expected.
    UnexpectedContinuationByte,
    /// A byte in 0xF8-0xFF, which would start a 5+ byte sequence.
    InvalidLeadByte,
    /// A multi-byte sequence was cut off by the end of input.
    TruncatedSequence,
    /// A non-continuation byte appeared inside a multi-byte sequence.
    InvalidContinuationByte,
    /// A character was encoded using more bytes than necessary.
    OverlongEncoding,
    /// A surrogate code point (U+D800-U+DFFF) was encoded.
    SurrogateCodepoint,
    /// A code point above U+10FFFF was encoded.
    OutOfRangeCodepoint,
    /// U+FFFE or U+FFFF of some plane was encoded.
    NonCharacter,
    /// A code point in U+FDD0-U+FDEF was encoded.
    ReservedNonCharacter,
}

impl Utf8ErrorKind {
    /// True when the bytes were not well-formed UTF-8 at all.
    ///
    /// The other kinds are well-formed sequences whose scalar is refused.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            Self::UnexpectedContinuationByte
                | Self::InvalidLeadByte
                | Self::TruncatedSequence
                | Self::InvalidContinuationByte
                | Self::OverlongEncoding
        )
    }
}

impl fmt::Display for Utf8ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedContinuationByte => write!(f, "unexpected continuation byte"),
            Self::InvalidLeadByte => write!(f, "invalid UTF-8 lead byte"),
            Self::TruncatedSequence => write!(f, "truncated UTF-8 sequence"),
            Self::InvalidContinuationByte => write!(f, "invalid UTF-8 continuation byte"),
            Self::OverlongEncoding => write!(f, "overlong UTF-8 encoding"),
            Self::SurrogateCodepoint => write!(f, "surrogate code point"),
            Self::OutOfRangeCodepoint => write!(f, "code point above U+10FFFF"),
            Self::NonCharacter => write!(f, "non-character code point"),
            Self::ReservedNonCharacter => write!(f, "reserved non-character code point"),
        }
    }
}

impl From<DecodeError> for Utf8ErrorKind {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::UnexpectedContinuation => Self::UnexpectedContinuationByte,
            DecodeError::InvalidLeadByte => Self::InvalidLeadByte,
            DecodeError::TruncatedSequence { .. } => Self::TruncatedSequence,
            DecodeError::InvalidContinuation { .. } => Self::InvalidContinuationByte,
            DecodeError::Overlong { .. } => Self::OverlongEncoding,
        }
    }
}

impl Utf8Error {
    fn new(input: &[u8], offset: usize, kind: Utf8ErrorKind, code_point: Option<u32>) -> Self {
        let (line, column) = line_and_column(input, offset);
        Self {
            offset,
            line,
            column,
            kind,
            byte: input[offset],
            code_point,
        }
    }

    /// A one-line description without location, e.g.
    /// `non-character code point U+FFFE`.
    pub fn message(&self) -> String {
        alloc::format!("{}", Message(self))
    }
}

struct Message<'a>(&'a Utf8Error);

impl fmt::Display for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let err = self.0;
        let cp = err.code_point.unwrap_or_default();
        match err.kind {
            Utf8ErrorKind::UnexpectedContinuationByte => {
                write!(f, "unexpected continuation byte 0x{:02X}", err.byte)
            }
            Utf8ErrorKind::InvalidLeadByte => write!(
                f,
                "invalid lead byte 0x{:02X} (5+ byte sequence not allowed)",
                err.byte
            ),
            Utf8ErrorKind::TruncatedSequence => {
                write!(f, "truncated UTF-8 sequence starting with 0x{:02X}", err.byte)
            }
            Utf8ErrorKind::InvalidContinuationByte => write!(
                f,
                "invalid continuation byte in sequence starting with 0x{:02X}",
                err.byte
            ),
            Utf8ErrorKind::OverlongEncoding => {
                write!(f, "overlong UTF-8 sequence starting with 0x{:02X}", err.byte)
            }
            Utf8ErrorKind::SurrogateCodepoint => {
                write!(f, "surrogate code point U+{:04X} not allowed in UTF-8", cp)
            }
            Utf8ErrorKind::OutOfRangeCodepoint => {
                write!(f, "code point U+{:04X} above U+10FFFF", cp)
            }
            Utf8ErrorKind::NonCharacter => write!(f, "non-character code point U+{:04X}", cp),
            Utf8ErrorKind::ReservedNonCharacter => write!(
                f,
                "non-character code point U+{:04X} (in U+FDD0..U+FDEF range)",
                cp
            ),
        }
    }
}

impl fmt::Display for Utf8Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at byte {}, line {}, column {}",
            Message(self),
            self.offset,
            self.line,
            self.column
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Utf8Error {}

/// Result of detailed validation.
pub type ValidationResult = Result<(), Utf8Error>;

/// Fast check: true if `input` passes the strict rule.
///
/// # Examples
///
/// ```
/// use strictutf8::utf8::is_valid_utf8;
///
/// assert!(is_valid_utf8(b"Hello"));
/// assert!(is_valid_utf8("你好".as_bytes()));
/// assert!(!is_valid_utf8(&[0xC0, 0x80]));
/// // Well-formed UTF-8, but U+FFFE is a non-character.
/// assert!(!is_valid_utf8(&[0xEF, 0xBF, 0xBE]));
/// ```
pub fn is_valid_utf8(input: &[u8]) -> bool {
    first_rejection(input).is_none()
}

/// Detailed check: `Ok(())` or the first violation.
///
/// # Examples
///
/// ```
/// use strictutf8::utf8::{validate_utf8_detailed, Utf8ErrorKind};
///
/// assert!(validate_utf8_detailed(b"Hello").is_ok());
///
/// let err = validate_utf8_detailed(&[b'a', 0xED, 0xA0, 0x80]).unwrap_err();
/// assert_eq!(err.offset, 1);
/// assert_eq!(err.kind, Utf8ErrorKind::SurrogateCodepoint);
/// assert_eq!(err.code_point, Some(0xD800));
/// ```
pub fn validate_utf8_detailed(input: &[u8]) -> ValidationResult {
    let Some((pos, rejection)) = first_rejection(input) else {
        return Ok(());
    };
    let (kind, code_point) = match rejection {
        Rejection::Malformed(err) => (err.into(), None),
        Rejection::Refused(cp) => {
            let kind = match classify(cp) {
                CharClass::Surrogate => Utf8ErrorKind::SurrogateCodepoint,
                CharClass::OutOfRange => Utf8ErrorKind::OutOfRangeCodepoint,
                CharClass::NonCharacter => Utf8ErrorKind::NonCharacter,
                CharClass::ReservedNonCharacter => Utf8ErrorKind::ReservedNonCharacter,
                // Only scalars failing `is_valid_character` are refused.
                CharClass::Valid => unreachable!("accepted scalar U+{:04X} refused", cp),
            };
            (kind, Some(cp))
        }
    };
    Err(Utf8Error::new(input, pos, kind, code_point))
}

/// Why the traversal stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    /// The bytes at the position do not form a sequence.
    Malformed(DecodeError),
    /// A well-formed sequence whose scalar fails [`is_valid_character`].
    Refused(u32),
}

/// The traversal behind both entry points: offset and cause of the first
/// rejected sequence, or `None` when the whole buffer passes.
fn first_rejection(input: &[u8]) -> Option<(usize, Rejection)> {
    let mut pos = 0;
    while pos < input.len() {
        match decode_at(input, pos) {
            Ok(decoded) if is_valid_character(decoded.code_point) => pos += decoded.len,
            Ok(decoded) => return Some((pos, Rejection::Refused(decoded.code_point))),
            Err(err) => return Some((pos, Rejection::Malformed(err))),
        }
    }
    None
}

/// Compute the 1-indexed line and byte column of `offset`.
fn line_and_column(input: &[u8], offset: usize) -> (usize, usize) {
    let prefix = &input[..offset];
    let line = 1 + prefix.iter().filter(|&&b| b == b'\n').count();
    let line_start = prefix
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    (line, offset - line_start + 1)
}

/// Flat summary of a validation result.
///
/// Fields are zero or empty when the input is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValidationReport {
    pub valid: bool,
    pub error_position: usize,
    pub error_message: String,
    pub bad_codepoint: u32,
}

impl ValidationReport {
    /// Validate `input` and summarise the outcome.
    pub fn of(input: &[u8]) -> Self {
        Self::from(&validate_utf8_detailed(input))
    }
}

impl From<&ValidationResult> for ValidationReport {
    fn from(result: &ValidationResult) -> Self {
        match result {
            Ok(()) => Self {
                valid: true,
                ..Self::default()
            },
            Err(err) => Self {
                valid: false,
                error_position: err.offset,
                error_message: err.message(),
                bad_codepoint: err.code_point.unwrap_or(0),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err_of(input: &[u8]) -> Utf8Error {
        validate_utf8_detailed(input).unwrap_err()
    }

    // =========================================================================
    // Accepted input
    // =========================================================================

    mod valid {
        use super::*;

        #[test]
        fn empty_input() {
            assert!(is_valid_utf8(b""));
            assert!(validate_utf8_detailed(b"").is_ok());
        }

        #[test]
        fn ascii_and_cjk() {
            assert!(is_valid_utf8(&[0x48, 0x65, 0x6C, 0x6C, 0x6F]));
            assert!(is_valid_utf8(&[0xE4, 0xBD, 0xA0, 0xE5, 0xA5, 0xBD]));
        }

        #[test]
        fn boundary_code_points() {
            assert!(is_valid_utf8(&[0x00]));
            assert!(is_valid_utf8(&[0xC2, 0x80])); // U+0080
            assert!(is_valid_utf8(&[0xDF, 0xBF])); // U+07FF
            assert!(is_valid_utf8(&[0xE0, 0xA0, 0x80])); // U+0800
            assert!(is_valid_utf8(&[0xEF, 0xBF, 0xBD])); // U+FFFD
            assert!(is_valid_utf8(&[0xF0, 0x90, 0x80, 0x80])); // U+10000
            assert!(is_valid_utf8(&[0xF4, 0x8F, 0xBF, 0xBD])); // U+10FFFD
        }

        #[test]
        fn byte_order_mark() {
            assert!(is_valid_utf8(&[0xEF, 0xBB, 0xBF, b'h', b'i']));
        }

        #[test]
        fn stopwatch_with_variation_selector() {
            assert!(is_valid_utf8("console.log(\"你好⏱️\");\n".as_bytes()));
        }
    }

    // =========================================================================
    // Structural failures
    // =========================================================================

    mod structural {
        use super::*;

        #[test]
        fn lone_continuation() {
            let err = err_of(&[0x80]);
            assert_eq!(err.offset, 0);
            assert_eq!(err.kind, Utf8ErrorKind::UnexpectedContinuationByte);
            assert_eq!(err.byte, 0x80);
            assert_eq!(err.code_point, None);
        }

        #[test]
        fn invalid_lead() {
            assert_eq!(err_of(&[0xFE]).kind, Utf8ErrorKind::InvalidLeadByte);
            assert_eq!(err_of(&[0xFF]).kind, Utf8ErrorKind::InvalidLeadByte);
            assert_eq!(
                err_of(&[0xF8, 0x88, 0x80, 0x80, 0x80]).kind,
                Utf8ErrorKind::InvalidLeadByte
            );
        }

        #[test]
        fn truncated_reports_lead_offset() {
            let err = err_of(b"abc\xF0\x9F\x98");
            assert_eq!(err.offset, 3);
            assert_eq!(err.kind, Utf8ErrorKind::TruncatedSequence);
            assert_eq!(err.byte, 0xF0);
        }

        #[test]
        fn bad_continuation_reports_lead_offset() {
            let err = err_of(&[b'H', b'i', 0xC4, 0xE3]);
            assert_eq!(err.offset, 2);
            assert_eq!(err.kind, Utf8ErrorKind::InvalidContinuationByte);
        }

        #[test]
        fn gbk_bytes() {
            let err = err_of(&[0xC4, 0xE3, 0xBA, 0xC3]);
            assert_eq!(err.offset, 0);
            assert!(err.kind.is_structural());
        }

        #[test]
        fn overlong() {
            let err = err_of(&[0xC0, 0x80]);
            assert_eq!(err.kind, Utf8ErrorKind::OverlongEncoding);
            assert_eq!(err.code_point, None);
            assert_eq!(err_of(&[0xE0, 0x80, 0x80]).kind, Utf8ErrorKind::OverlongEncoding);
            assert_eq!(
                err_of(&[0xF0, 0x80, 0x80, 0x80]).kind,
                Utf8ErrorKind::OverlongEncoding
            );
        }
    }

    // =========================================================================
    // Well-formed but refused
    // =========================================================================

    mod refused {
        use super::*;

        #[test]
        fn surrogate() {
            let err = err_of(&[0xED, 0xA0, 0x80]);
            assert_eq!(err.kind, Utf8ErrorKind::SurrogateCodepoint);
            assert_eq!(err.code_point, Some(0xD800));
            assert_eq!(err_of(&[0xED, 0xBF, 0xBF]).code_point, Some(0xDFFF));
        }

        #[test]
        fn plane_end() {
            let err = err_of(&[0xEF, 0xBF, 0xBE]);
            assert_eq!(err.kind, Utf8ErrorKind::NonCharacter);
            assert_eq!(err.code_point, Some(0xFFFE));
            assert_eq!(err_of(&[0xF0, 0x9F, 0xBF, 0xBE]).code_point, Some(0x1FFFE));
            assert_eq!(err_of(&[0xF4, 0x8F, 0xBF, 0xBF]).code_point, Some(0x10FFFF));
        }

        #[test]
        fn reserved_range() {
            let err = err_of(&[0xEF, 0xB7, 0x90]);
            assert_eq!(err.kind, Utf8ErrorKind::ReservedNonCharacter);
            assert_eq!(err.code_point, Some(0xFDD0));
            assert_eq!(err_of(&[0xEF, 0xB7, 0xAF]).code_point, Some(0xFDEF));
        }

        #[test]
        fn above_max() {
            let err = err_of(&[0xF4, 0x90, 0x80, 0x80]);
            assert_eq!(err.kind, Utf8ErrorKind::OutOfRangeCodepoint);
            assert_eq!(err.code_point, Some(0x110000));
            assert!(!err.kind.is_structural());
        }

        #[test]
        fn offset_is_first_byte_of_encoding() {
            let mut input = "日本".as_bytes().to_vec();
            input.extend_from_slice(&[0xEF, 0xBF, 0xBF]);
            assert_eq!(err_of(&input).offset, 6);
        }
    }

    // =========================================================================
    // Positions and reports
    // =========================================================================

    mod positions {
        use super::*;

        #[test]
        fn first_line() {
            let err = err_of(b"abc\x80");
            assert_eq!((err.line, err.column), (1, 4));
        }

        #[test]
        fn later_lines() {
            let err = err_of(b"one\ntwo\r\nth\xFF");
            assert_eq!(err.offset, 11);
            assert_eq!((err.line, err.column), (3, 3));
        }

        #[test]
        fn error_right_after_newline() {
            let err = err_of(b"a\n\x80");
            assert_eq!((err.line, err.column), (2, 1));
        }

        #[test]
        fn display_includes_location() {
            let err = err_of(b"ok\n\xEF\xBF\xBE");
            assert_eq!(
                err.to_string(),
                "non-character code point U+FFFE at byte 3, line 2, column 1"
            );
        }

        #[test]
        fn report_for_valid_input() {
            let report = ValidationReport::of(b"fine");
            assert!(report.valid);
            assert_eq!(report.error_position, 0);
            assert!(report.error_message.is_empty());
            assert_eq!(report.bad_codepoint, 0);
        }

        #[test]
        fn report_for_surrogate() {
            let report = ValidationReport::of(&[b'x', 0xED, 0xA0, 0x80]);
            assert!(!report.valid);
            assert_eq!(report.error_position, 1);
            assert_eq!(report.bad_codepoint, 0xD800);
            assert_eq!(
                report.error_message,
                "surrogate code point U+D800 not allowed in UTF-8"
            );
        }

    }

    mod agreement {
        use super::*;

        #[test]
        fn detailed_error_sits_at_first_rejection() {
            let inputs: &[&[u8]] = &[
                b"plain",
                b"ab\x80",
                b"\xE4\xBD\xA0\xE4\xBD",
                b"x\xED\xA0\x80y",
                b"\xF0\x9F\x98\x80\xEF\xBF\xBE",
                b"\xF4\x90\x80\x80",
                b"\xC0\x80",
            ];
            for input in inputs {
                let rejection = first_rejection(input);
                let detailed = validate_utf8_detailed(input);
                assert_eq!(rejection.is_none(), is_valid_utf8(input));
                assert_eq!(rejection.map(|(pos, _)| pos), detailed.err().map(|e| e.offset));
            }
        }

        #[test]
        fn refused_scalars_keep_their_code_point() {
            assert_eq!(
                first_rejection(b"a\xEF\xB7\x90"),
                Some((1, Rejection::Refused(0xFDD0)))
            );
            assert_eq!(
                first_rejection(&[0xC4, 0xE3]),
                Some((0, Rejection::Malformed(DecodeError::InvalidContinuation { index: 1 })))
            );
        }

        #[test]
        fn every_two_byte_input() {
            for a in 0..=255u8 {
                for b in 0..=255u8 {
                    let input = [a, b];
                    assert_eq!(
                        is_valid_utf8(&input),
                        validate_utf8_detailed(&input).is_ok(),
                        "{:02X} {:02X}",
                        a,
                        b
                    );
                }
            }
        }

        #[test]
        fn every_three_byte_sequence_with_e_lead() {
            for a in 0xE0..=0xEFu8 {
                for b in 0x80..=0xBFu8 {
                    for c in 0x80..=0xBFu8 {
                        let input = [a, b, c];
                        let strict = is_valid_utf8(&input);
                        assert_eq!(strict, validate_utf8_detailed(&input).is_ok());
                        if let Ok(s) = core::str::from_utf8(&input) {
                            let cp = s.chars().next().unwrap() as u32;
                            assert_eq!(strict, is_valid_character(cp));
                        } else {
                            assert!(!strict);
                        }
                    }
                }
            }
        }
    }
}
