//! Character classification for decoded scalars.
//!
//! A structurally valid sequence may still decode to a value that the strict
//! rule refuses: a UTF-16 surrogate, a value beyond U+10FFFF, or one of the 66
//! Unicode non-characters.

/// Highest Unicode code point.
pub const MAX_CODE_POINT: u32 = 0x10FFFF;

/// First UTF-16 surrogate.
pub const SURROGATE_START: u32 = 0xD800;

/// Last UTF-16 surrogate.
pub const SURROGATE_END: u32 = 0xDFFF;

/// First non-character of the contiguous block in Arabic Presentation Forms-A.
pub const RESERVED_NONCHAR_START: u32 = 0xFDD0;

/// Last non-character of the contiguous block in Arabic Presentation Forms-A.
pub const RESERVED_NONCHAR_END: u32 = 0xFDEF;

/// Which acceptance rule a scalar satisfies or violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    /// An acceptable character.
    Valid,
    /// U+D800..=U+DFFF.
    Surrogate,
    /// Above U+10FFFF.
    OutOfRange,
    /// U+xxFFFE or U+xxFFFF in any plane.
    NonCharacter,
    /// U+FDD0..=U+FDEF.
    ReservedNonCharacter,
}

#[inline(always)]
fn is_surrogate(cp: u32) -> bool {
    (SURROGATE_START..=SURROGATE_END).contains(&cp)
}

#[inline(always)]
fn is_plane_end(cp: u32) -> bool {
    (cp & 0xFFFE) == 0xFFFE
}

#[inline(always)]
fn is_reserved_nonchar(cp: u32) -> bool {
    (RESERVED_NONCHAR_START..=RESERVED_NONCHAR_END).contains(&cp)
}

/// Returns true if `cp` is acceptable under the strict rule.
///
/// # Examples
///
/// ```
/// use strictutf8::utf8::is_valid_character;
///
/// assert!(is_valid_character('A' as u32));
/// assert!(is_valid_character(0xFFFD));
/// assert!(!is_valid_character(0xFFFE));
/// assert!(!is_valid_character(0xDC00));
/// assert!(!is_valid_character(0xFDD5));
/// ```
#[inline]
pub fn is_valid_character(cp: u32) -> bool {
    !(is_surrogate(cp) | (cp > MAX_CODE_POINT) | is_plane_end(cp) | is_reserved_nonchar(cp))
}

/// Name the rule that `cp` violates, if any.
///
/// When several rules apply (a value above U+10FFFF whose low bits also end
/// in FFFE), the range violation is reported.
pub fn classify(cp: u32) -> CharClass {
    if is_surrogate(cp) {
        CharClass::Surrogate
    } else if cp > MAX_CODE_POINT {
        CharClass::OutOfRange
    } else if is_plane_end(cp) {
        CharClass::NonCharacter
    } else if is_reserved_nonchar(cp) {
        CharClass::ReservedNonCharacter
    } else {
        CharClass::Valid
    }
}
