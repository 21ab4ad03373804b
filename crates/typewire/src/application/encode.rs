//! Character encoder: one logical character → ordered key events.
//!
//! Each [`EncodingMode`] has its own encoding function:
//!
//! - [`encode_unicode`] – one down/up pair per UTF-16 code unit.  Never fails.
//! - [`encode_vk_scancode`] – Shift (if needed) + scancode down/up under the
//!   target's layout.  Appends nothing when the character cannot be typed
//!   safely, which is a signal rather than an error.
//! - Hybrid – scancode first, Unicode when the scancode path declines.
//!
//! [`CharacterEncoder::encode`] dispatches on the mode and guarantees that
//! every character produces at least one event pair.

use tracing::trace;
use typewire_core::domain::event::VK_SHIFT;
use typewire_core::{EncodingMode, KeyInput, KeyboardLayout};

/// Encodes characters for one run: fixed mode, fixed target layout.
pub struct CharacterEncoder<'a> {
    mode: EncodingMode,
    layout: &'a dyn KeyboardLayout,
}

impl<'a> CharacterEncoder<'a> {
    pub fn new(mode: EncodingMode, layout: &'a dyn KeyboardLayout) -> Self {
        Self { mode, layout }
    }

    pub fn mode(&self) -> EncodingMode {
        self.mode
    }

    /// Appends the events for `ch` to `buffer` and returns how many were added.
    ///
    /// In `VkScancode` mode a character with no safe key is still typed via
    /// Unicode, so no character is ever dropped.
    pub fn encode(&self, ch: char, buffer: &mut Vec<KeyInput>) -> usize {
        match self.mode {
            EncodingMode::Unicode => encode_unicode(ch, buffer),
            EncodingMode::VkScancode | EncodingMode::Hybrid => {
                match encode_vk_scancode(ch, self.layout, buffer) {
                    0 => {
                        trace!(?ch, mode = ?self.mode, "no safe key; typing as Unicode");
                        encode_unicode(ch, buffer)
                    }
                    added => added,
                }
            }
        }
    }
}

/// Unicode encoding: a down/up pair for each UTF-16 code unit of `ch`.
///
/// Returns 2 for BMP characters and 4 for characters encoded as a surrogate
/// pair.
pub fn encode_unicode(ch: char, buffer: &mut Vec<KeyInput>) -> usize {
    let mut units = [0u16; 2];
    let encoded = ch.encode_utf16(&mut units);
    for &unit in encoded.iter() {
        buffer.extend(KeyInput::unicode_pair(unit));
    }
    encoded.len() * 2
}

/// Scancode encoding under `layout`.
///
/// Emits `[Shift down] key down, key up [Shift up]` and returns 2 or 4.
/// Returns 0 without touching `buffer` when the character has no key, needs
/// Ctrl/Alt, or lies outside the Basic Multilingual Plane.
pub fn encode_vk_scancode(ch: char, layout: &dyn KeyboardLayout, buffer: &mut Vec<KeyInput>) -> usize {
    let Ok(unit) = u16::try_from(u32::from(ch)) else {
        return 0;
    };
    let Some(mapping) = layout.map_char(unit) else {
        return 0;
    };

    let vk = u16::from(mapping.vk);
    let shift_scan = layout.shift_scancode();
    let start = buffer.len();

    if mapping.needs_shift {
        buffer.push(KeyInput::Scancode { vk: VK_SHIFT, scan: shift_scan, key_up: false });
    }
    buffer.extend(KeyInput::scancode_pair(vk, mapping.scancode));
    if mapping.needs_shift {
        buffer.push(KeyInput::Scancode { vk: VK_SHIFT, scan: shift_scan, key_up: true });
    }

    buffer.len() - start
}
