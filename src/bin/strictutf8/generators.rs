//! Fixture generators for testing and benchmarking strict validation.
//!
//! Produces valid UTF-8 text in several styles and can splice in one defect
//! of a known kind, recording where it was placed. The defects model what
//! happens to extension sources that pass through a non-UTF-8 toolchain
//! (GBK on Chinese-locale Windows being the common case).

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Pattern types for text generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Pure ASCII prose
    Ascii,
    /// Latin Extended words (2-byte sequences)
    Latin,
    /// Chinese/Japanese/Korean phrases (3-byte sequences)
    Cjk,
    /// Emoji (4-byte sequences, some with variation selectors)
    Emoji,
    /// Prose with occasional non-ASCII
    Mixed,
    /// JavaScript with unicode in strings and comments
    SourceCode,
}

/// A single injected problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Defect {
    /// "你好" encoded as GBK (`C4 E3 BA C3`)
    Gbk,
    /// U+FFFE, well-formed but refused
    NonCharacter,
    /// U+FDD0, well-formed but refused
    ReservedNonCharacter,
    /// U+D800 encoded as three bytes
    Surrogate,
    /// NUL encoded as `C0 80`
    Overlong,
    /// A 3-byte sequence cut off at end of file
    Truncated,
    /// Bare continuation bytes, as left behind by a lossy re-encode
    StrayContinuation,
    /// A leading byte order mark (accepted)
    Bom,
}

impl Defect {
    /// The raw bytes spliced into the text.
    pub fn bytes(self) -> &'static [u8] {
        match self {
            Self::Gbk => &[0xC4, 0xE3, 0xBA, 0xC3],
            Self::NonCharacter => &[0xEF, 0xBF, 0xBE],
            Self::ReservedNonCharacter => &[0xEF, 0xB7, 0x90],
            Self::Surrogate => &[0xED, 0xA0, 0x80],
            Self::Overlong => &[0xC0, 0x80],
            Self::Truncated => &[0xE4, 0xBD],
            Self::StrayContinuation => &[0x80, 0x81, 0x82],
            Self::Bom => &[0xEF, 0xBB, 0xBF],
        }
    }

    /// Whether a file carrying this defect must be rejected.
    pub fn is_rejected(self) -> bool {
        !matches!(self, Self::Bom)
    }
}

/// Generated bytes plus the offset of the injected defect, if rejected.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub bytes: Vec<u8>,
    pub defect_offset: Option<usize>,
}

/// Generate valid UTF-8 text of exactly `target_size` bytes.
pub fn generate_text(target_size: usize, pattern: Pattern, seed: Option<u64>) -> Vec<u8> {
    let mut rng = seed.map(ChaCha8Rng::seed_from_u64);
    let pieces = pieces_for(pattern);
    let (separator, line_width): (&[u8], usize) = match pattern {
        Pattern::Cjk => (b"", 60),
        Pattern::Emoji => (b" ", 40),
        Pattern::SourceCode => (b"\n", usize::MAX),
        _ => (b" ", 80),
    };

    let mut result = Vec::with_capacity(target_size);
    let mut line_len = 0;

    while result.len() < target_size {
        let idx = rng
            .as_mut()
            .map(|r| r.gen_range(0..pieces.len()))
            .unwrap_or(result.len() % pieces.len());
        let piece = pieces[idx].as_bytes();

        if line_len > 0 && line_len + piece.len() + separator.len() > line_width {
            result.push(b'\n');
            line_len = 0;
        } else if line_len > 0 {
            result.extend_from_slice(separator);
            line_len += separator.len();
        }

        if result.len() + piece.len() > target_size {
            break;
        }
        result.extend_from_slice(piece);
        line_len += piece.len();
    }

    // Pad with ASCII so multi-byte sequences are never split
    result.truncate(target_size);
    while result.len() < target_size {
        result.push(b' ');
    }
    result
}

/// Generate text of `target_size` bytes with `defect` spliced in.
///
/// Non-BOM defects are placed on a character boundary near the middle, except
/// [`Defect::Truncated`] which always ends the file.
pub fn generate_fixture(
    target_size: usize,
    pattern: Pattern,
    defect: Option<Defect>,
    seed: Option<u64>,
) -> Fixture {
    let Some(defect) = defect else {
        return Fixture {
            bytes: generate_text(target_size, pattern, seed),
            defect_offset: None,
        };
    };

    let injected = defect.bytes();
    let mut bytes = generate_text(target_size.saturating_sub(injected.len()), pattern, seed);

    let at = match defect {
        Defect::Bom => 0,
        Defect::Truncated => bytes.len(),
        _ => char_boundary_before(&bytes, bytes.len() / 2),
    };
    bytes.splice(at..at, injected.iter().copied());

    Fixture {
        bytes,
        defect_offset: defect.is_rejected().then_some(at),
    }
}

/// Step back from `pos` until it is not inside a multi-byte sequence.
fn char_boundary_before(bytes: &[u8], mut pos: usize) -> usize {
    while pos > 0 && pos < bytes.len() && (bytes[pos] & 0xC0) == 0x80 {
        pos -= 1;
    }
    pos
}

fn pieces_for(pattern: Pattern) -> &'static [&'static str] {
    match pattern {
        Pattern::Ascii => &[
            "The quick brown fox jumps over the lazy dog.",
            "Pack my box with five dozen liquor jugs.",
            "How vexingly quick daft zebras jump!",
            "Sphinx of black quartz, judge my vow.",
            "The five boxing wizards jump quickly.",
        ],
        Pattern::Latin => &[
            "café", "résumé", "naïve", "über", "fiancée", "façade", "jalapeño", "señor",
            "Ångström", "smörgåsbord", "Müller", "Größe", "Zürich", "Ærø", "Łódź", "Kraków",
        ],
        Pattern::Cjk => &[
            "日本語", "中国語", "漢字", "東京", "北京", "上海", "你好", "再见", "谢谢",
            "欢迎", "안녕하세요", "감사합니다", "こんにちは", "ありがとう", "すみません",
        ],
        Pattern::Emoji => &[
            "😀", "😂", "🥰", "🎉", "🚀", "💻", "🔥", "🌍", "⭐", "⏱️", "☀️", "❄️", "🧭", "🎯",
        ],
        Pattern::Mixed => &[
            "The quick brown fox jumps over the lazy dog.",
            "Hello, world! This is a test message.",
            "Café au lait with crème brûlée is très délicieux.",
            "Great job! 🎉 Keep up the good work! 💪",
            "Meeting at 東京 station at 3pm tomorrow.",
            "Price: €50.00 or £42.00 or ¥6,000 or ₹4,200",
            "Math: α + β = γ, ∑(x²) = n, ∞ > 0",
        ],
        Pattern::SourceCode => &[
            "import { defineManifest } from './manifest';",
            "const greeting = \"你好, 世界\";",
            "console.log(\"⏱️ elapsed:\", performance.now());",
            "// Überprüfung der Eingabe",
            "export function badge(count) { return `✓ ${count}`; }",
            "chrome.runtime.onMessage.addListener((msg) => { /* 处理消息 */ });",
            "const symbols = { alpha: 'α', beta: 'β', pi: 'π' };",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictutf8::utf8::{is_valid_utf8, validate_utf8_detailed};

    const PATTERNS: [Pattern; 6] = [
        Pattern::Ascii,
        Pattern::Latin,
        Pattern::Cjk,
        Pattern::Emoji,
        Pattern::Mixed,
        Pattern::SourceCode,
    ];

    const DEFECTS: [Defect; 8] = [
        Defect::Gbk,
        Defect::NonCharacter,
        Defect::ReservedNonCharacter,
        Defect::Surrogate,
        Defect::Overlong,
        Defect::Truncated,
        Defect::StrayContinuation,
        Defect::Bom,
    ];

    #[test]
    fn text_is_valid_and_exact_size() {
        for pattern in PATTERNS {
            for size in [0, 1, 7, 100, 4096] {
                for seed in [None, Some(42)] {
                    let text = generate_text(size, pattern, seed);
                    assert_eq!(text.len(), size, "{:?} {}", pattern, size);
                    assert!(is_valid_utf8(&text), "{:?} {} {:?}", pattern, size, seed);
                }
            }
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = generate_text(2048, Pattern::Mixed, Some(7));
        let b = generate_text(2048, Pattern::Mixed, Some(7));
        assert_eq!(a, b);
    }

    #[test]
    fn defect_offset_matches_validator() {
        for pattern in PATTERNS {
            for defect in DEFECTS {
                let fixture = generate_fixture(1000, pattern, Some(defect), Some(3));
                assert_eq!(fixture.bytes.len(), 1000);
                let reported = validate_utf8_detailed(&fixture.bytes).err().map(|e| e.offset);
                assert_eq!(reported, fixture.defect_offset, "{:?} {:?}", pattern, defect);
            }
        }
    }

    #[test]
    fn tiny_fixtures() {
        let fixture = generate_fixture(1, Pattern::Cjk, Some(Defect::Gbk), None);
        assert_eq!(fixture.bytes, Defect::Gbk.bytes());
        assert_eq!(fixture.defect_offset, Some(0));
    }

    #[test]
    fn truncated_defect_ends_the_file() {
        let fixture = generate_fixture(64, Pattern::Ascii, Some(Defect::Truncated), None);
        assert_eq!(fixture.defect_offset, Some(62));
        assert!(fixture.bytes.ends_with(&[0xE4, 0xBD]));
    }
}
