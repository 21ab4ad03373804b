//! Text helpers shared by the text sources and the injection pipeline.

pub mod decode;
pub mod normalize;

pub use decode::{decode_text, detect_encoding, TextEncoding};
pub use normalize::normalize_typography;

/// Largest file a file source will read.
pub const MAX_FILE_BYTES: u64 = 500 * 1024;

/// Texts of this many characters or more are refused before a run starts.
pub const MAX_TEXT_CHARS: usize = 45_000;
