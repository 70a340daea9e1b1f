//! # strictutf8
//!
//! Strict UTF-8 validation matching the acceptance rule browsers apply to
//! extension files (`base::IsStringUTF8`).
//!
//! Ordinary UTF-8 validators accept every well-formed sequence. This crate
//! additionally rejects the Unicode non-characters (U+FDD0..U+FDEF and the
//! last two code points of every plane), so files that pass
//! `core::str::from_utf8` can still be refused here.
//!
//! ## Module Organization
//!
//! - [`utf8`] - Decoder, character classifier and validators
//! - [`scan`] - File and directory scanning (requires `std`)
//!
//! ## Quick Start
//!
//! ```
//! use strictutf8::{is_valid_utf8, validate_utf8_detailed, Utf8ErrorKind};
//!
//! assert!(is_valid_utf8("Hello, 你好".as_bytes()));
//!
//! // Well-formed UTF-8 for U+FFFE, refused as a non-character
//! let err = validate_utf8_detailed(&[b'a', 0xEF, 0xBF, 0xBE]).unwrap_err();
//! assert_eq!(err.offset, 1);
//! assert_eq!(err.kind, Utf8ErrorKind::NonCharacter);
//! assert_eq!(err.code_point, Some(0xFFFE));
//! ```
//!
//! ## Features
//!
//! - `std` (default) - `std::error::Error` impls and the [`scan`] module
//! - `serde` - Serialization of reports and configuration
//! - `cli` - Dependencies of the `strictutf8` binary

// Use no_std unless std feature is enabled or we're in test mode
#![cfg_attr(not(any(test, feature = "std")), no_std)]

// When using no_std, we need to explicitly link the alloc crate
#[cfg(not(any(test, feature = "std")))]
extern crate alloc;

// When using std, re-export alloc types from std for compatibility
#[cfg(any(test, feature = "std"))]
extern crate std as alloc;

/// Strict UTF-8 decoding, classification and validation.
pub mod utf8;

/// File and directory scanning.
#[cfg(feature = "std")]
pub mod scan;

pub use utf8::{
    is_valid_character, is_valid_utf8, validate_utf8_detailed, Utf8Error, Utf8ErrorKind,
    ValidationReport,
};
