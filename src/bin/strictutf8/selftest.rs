//! CLI handler for the `selftest` command.
//!
//! Runs a fixed acceptance table through both validators and prints each
//! verdict, so the rule can be checked on any machine without fixtures.

use anyhow::Result;
use clap::Parser;
use strictutf8::utf8::{is_valid_utf8, validate_utf8_detailed};

use crate::check::{hex_dump, ColorScheme};

/// Run the built-in acceptance table.
#[derive(Debug, Parser)]
pub struct SelftestArgs {
    /// Only print failing cases and the summary
    #[arg(short, long)]
    pub quiet: bool,

    /// Force color output even when not a TTY
    #[arg(short = 'C', long = "color")]
    pub color: bool,

    /// Disable color output
    #[arg(short = 'M', long = "no-color")]
    pub no_color: bool,
}

/// One row of the acceptance table.
pub struct Case {
    pub name: &'static str,
    pub bytes: &'static [u8],
    pub expected_valid: bool,
}

/// The acceptance table.
pub const CASES: &[Case] = &[
    Case {
        name: "ASCII only",
        bytes: b"Hello",
        expected_valid: true,
    },
    Case {
        name: "UTF-8 Chinese (你好)",
        bytes: &[0xE4, 0xBD, 0xA0, 0xE5, 0xA5, 0xBD],
        expected_valid: true,
    },
    Case {
        name: "UTF-8 emoji (U+1F600)",
        bytes: &[0xF0, 0x9F, 0x98, 0x80],
        expected_valid: true,
    },
    Case {
        name: "UTF-8 stopwatch (U+23F1)",
        bytes: &[0xE2, 0x8F, 0xB1],
        expected_valid: true,
    },
    Case {
        name: "Byte order mark",
        bytes: &[0xEF, 0xBB, 0xBF, b'h', b'i'],
        expected_valid: true,
    },
    Case {
        name: "Lone continuation byte",
        bytes: &[0x80],
        expected_valid: false,
    },
    Case {
        name: "Invalid leading byte 0xFF",
        bytes: &[0xFF],
        expected_valid: false,
    },
    Case {
        name: "Invalid leading byte 0xFE",
        bytes: &[0xFE],
        expected_valid: false,
    },
    Case {
        name: "Truncated 2-byte",
        bytes: &[0xC2],
        expected_valid: false,
    },
    Case {
        name: "Truncated 3-byte",
        bytes: &[0xE4, 0xBD],
        expected_valid: false,
    },
    Case {
        name: "Truncated 4-byte",
        bytes: &[0xF0, 0x9F, 0x98],
        expected_valid: false,
    },
    Case {
        name: "Overlong 2-byte NUL",
        bytes: &[0xC0, 0x80],
        expected_valid: false,
    },
    Case {
        name: "Overlong 3-byte NUL",
        bytes: &[0xE0, 0x80, 0x80],
        expected_valid: false,
    },
    Case {
        name: "Surrogate U+D800",
        bytes: &[0xED, 0xA0, 0x80],
        expected_valid: false,
    },
    Case {
        name: "Surrogate U+DFFF",
        bytes: &[0xED, 0xBF, 0xBF],
        expected_valid: false,
    },
    Case {
        name: "Above U+10FFFF",
        bytes: &[0xF4, 0x90, 0x80, 0x80],
        expected_valid: false,
    },
    Case {
        name: "Non-character U+FFFE",
        bytes: &[0xEF, 0xBF, 0xBE],
        expected_valid: false,
    },
    Case {
        name: "Non-character U+FFFF",
        bytes: &[0xEF, 0xBF, 0xBF],
        expected_valid: false,
    },
    Case {
        name: "Non-character U+1FFFE",
        bytes: &[0xF0, 0x9F, 0xBF, 0xBE],
        expected_valid: false,
    },
    Case {
        name: "Non-character U+10FFFF",
        bytes: &[0xF4, 0x8F, 0xBF, 0xBF],
        expected_valid: false,
    },
    Case {
        name: "Non-character U+FDD0",
        bytes: &[0xEF, 0xB7, 0x90],
        expected_valid: false,
    },
    Case {
        name: "Non-character U+FDEF",
        bytes: &[0xEF, 0xB7, 0xAF],
        expected_valid: false,
    },
    Case {
        name: "GBK Chinese (你好)",
        bytes: &[0xC4, 0xE3, 0xBA, 0xC3],
        expected_valid: false,
    },
    Case {
        name: "Valid then GBK",
        bytes: &[b'H', b'i', 0xC4, 0xE3],
        expected_valid: false,
    },
    Case {
        name: "UTF-8 misread as GBK",
        bytes: &[0x80, 0x81, 0x82],
        expected_valid: false,
    },
];

/// Whether both validators give the expected verdict for `case`.
fn passes(case: &Case) -> bool {
    let fast = is_valid_utf8(case.bytes);
    let detailed = validate_utf8_detailed(case.bytes).is_ok();
    fast == case.expected_valid && detailed == case.expected_valid
}

/// Run the selftest command.
pub fn run(args: SelftestArgs) -> Result<i32> {
    let scheme = ColorScheme::from_flags(args.color, args.no_color);
    let mut passed = 0;
    let mut failed = 0;

    for case in CASES {
        let ok = passes(case);
        if ok {
            passed += 1;
        } else {
            failed += 1;
        }
        if args.quiet && ok {
            continue;
        }

        let result = validate_utf8_detailed(case.bytes);
        let highlight = result.as_ref().err().map(|e| e.offset);
        let (color, label) = if ok {
            (scheme.caret, "PASS")
        } else {
            (scheme.error, "FAIL")
        };

        println!("{}{}{}: {}", color, label, scheme.reset, case.name);
        println!("  bytes:    {}", hex_dump(case.bytes, highlight));
        println!(
            "  expected: {}, got: {}",
            verdict(case.expected_valid),
            verdict(result.is_ok())
        );
        if let Err(err) = &result {
            println!("  {}", err);
        }
        println!();
    }

    println!("{} passed, {} failed", passed, failed);
    Ok(if failed == 0 { 0 } else { 1 })
}

fn verdict(valid: bool) -> &'static str {
    if valid {
        "valid"
    } else {
        "invalid"
    }
}
