//! Typographic normalization.
//!
//! Word processors and chat apps silently replace `'`, `"`, `-` and `...` with
//! their typographic forms.  Remote transports frequently garble those, and a
//! shell on the far end rarely wants them anyway, so the pipeline folds them
//! back to ASCII before typing.

/// Replaces curly quotes, en/em dashes and the ellipsis with ASCII.
///
/// Every other character passes through unchanged.
pub fn normalize_typography(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            other => out.push(other),
        }
    }
    out
}
