//! Byte decoding for file sources, with BOM sniffing.
//!
//! Text files in the wild come in three flavours on Windows: UTF-8 (with or
//! without a BOM), UTF-16 with a BOM (what Notepad writes as "Unicode"), and
//! legacy single-byte code pages.  [`decode_text`] handles all three:
//!
//! | Leading bytes | Encoding      |
//! |---------------|---------------|
//! | `EF BB BF`    | UTF-8         |
//! | `FF FE`       | UTF-16 LE     |
//! | `FE FF`       | UTF-16 BE     |
//! | anything else | UTF-8, falling back to Windows-1252 |

/// Encoding detected from a byte-order mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8Bom,
    Utf16LeBom,
    Utf16BeBom,
    /// No BOM: UTF-8 if valid, otherwise the ANSI code page.
    Utf8OrAnsi,
}

/// Detects the encoding from the first bytes of `bytes`.
pub fn detect_encoding(bytes: &[u8]) -> TextEncoding {
    match bytes {
        [0xEF, 0xBB, 0xBF, ..] => TextEncoding::Utf8Bom,
        [0xFF, 0xFE, ..] => TextEncoding::Utf16LeBom,
        [0xFE, 0xFF, ..] => TextEncoding::Utf16BeBom,
        _ => TextEncoding::Utf8OrAnsi,
    }
}

/// Decodes `bytes` into a `String` according to its BOM.
///
/// Decoding is lossy rather than failing: unpaired UTF-16 surrogates become
/// U+FFFD and a trailing odd byte in UTF-16 input is dropped.
pub fn decode_text(bytes: &[u8]) -> String {
    match detect_encoding(bytes) {
        TextEncoding::Utf8Bom => String::from_utf8_lossy(&bytes[3..]).into_owned(),
        TextEncoding::Utf16LeBom => decode_utf16(&bytes[2..], u16::from_le_bytes),
        TextEncoding::Utf16BeBom => decode_utf16(&bytes[2..], u16::from_be_bytes),
        TextEncoding::Utf8OrAnsi => match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => decode_windows_1252(bytes),
        },
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    let units = bytes
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Windows-1252 code points for bytes 0x80..=0x9F; the rest match Latin-1.
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{FFFD}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{FFFD}', '\u{017D}', '\u{FFFD}',
    '\u{FFFD}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{FFFD}', '\u{017E}', '\u{0178}',
];

fn decode_windows_1252(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => CP1252_HIGH[usize::from(b - 0x80)],
            _ => char::from(b),
        })
        .collect()
}
