//! Strict UTF-8 validation.
//!
//! Accepts a byte sequence only if every sequence in it is well-formed,
//! minimal, and decodes to a character that is neither a surrogate nor a
//! Unicode non-character. This is the acceptance rule browsers apply to
//! extension files, which is stricter than RFC 3629.
//!
//! ## Encoding Rules
//!
//! | Bytes | First byte    | Continuation bytes | Code point range     |
//! |-------|---------------|-------------------|----------------------|
//! | 1     | `0xxxxxxx`    | -                 | U+0000 - U+007F      |
//! | 2     | `110xxxxx`    | `10xxxxxx`        | U+0080 - U+07FF      |
//! | 3     | `1110xxxx`    | `10xxxxxx` × 2    | U+0800 - U+FFFF      |
//! | 4     | `11110xxx`    | `10xxxxxx` × 3    | U+10000 - U+10FFFF   |
//!
//! ## Rejected in addition to RFC 3629
//!
//! - U+FFFE and U+FFFF in every plane (U+1FFFE, ..., U+10FFFF)
//! - U+FDD0 to U+FDEF
//!
//! ## Pipeline
//!
//! - [`decode_at`] reads one sequence and checks its structure
//! - [`classify()`] / [`is_valid_character`] judge the decoded scalar
//! - [`is_valid_utf8`] and [`validate_utf8_detailed`] drive both over a buffer

pub mod classify;
pub mod decode;
pub mod validate;

pub use classify::{classify, is_valid_character, CharClass, MAX_CODE_POINT};
pub use decode::{
    decode_at, encode_code_point, is_continuation_byte, sequence_length, DecodeError,
    DecodeOutcome, Decoded,
};
pub use validate::{
    is_valid_utf8, validate_utf8_detailed, Utf8Error, Utf8ErrorKind, ValidationReport,
    ValidationResult,
};
