//! Keyboard layout abstraction for virtual-key encoding.
//!
//! # What is a keyboard layout here? (for beginners)
//!
//! To type `@` with real key presses you must know which physical key
//! produces `@` and which modifiers to hold.  On US-QWERTY that is Shift+2; on
//! a German layout it is AltGr+Q; on a French layout there is a dedicated key.
//! Windows answers the question with `VkKeyScanExW(char, layout)`, which
//! returns a virtual key in the low byte and a *shift state* bitmask in the
//! high byte (1 = Shift, 2 = Ctrl, 4 = Alt).
//!
//! A [`KeyboardLayout`] wraps that lookup.  On Windows it calls the OS with the
//! target window's layout handle; [`UsQwertyLayout`] is a fixed table used in
//! tests, benchmarks and on platforms without an OS lookup.
//!
//! # Safe mappings only
//!
//! [`KeyboardLayout::map_char`] accepts a mapping only when it needs no
//! modifier or Shift alone.  Anything involving Ctrl or Alt is rejected,
//! because holding those on the target would fire shortcuts instead of typing.

pub mod us_qwerty;

pub use us_qwerty::UsQwertyLayout;

use crate::domain::event::{SCAN_LSHIFT, VK_SHIFT};

/// Shift-state bit: Shift.
pub const SHIFT_STATE_SHIFT: u8 = 0x01;
/// Shift-state bit: Ctrl.
pub const SHIFT_STATE_CTRL: u8 = 0x02;
/// Shift-state bit: Alt.
pub const SHIFT_STATE_ALT: u8 = 0x04;

/// Raw layout lookup result: virtual key plus shift-state bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VkKeyScan {
    pub vk: u8,
    pub shift_state: u8,
}

impl VkKeyScan {
    /// Decodes the packed `i16` returned by `VkKeyScanExW`.
    ///
    /// Returns `None` for the "no key produces this character" sentinel (-1).
    pub fn from_packed(packed: i16) -> Option<Self> {
        if packed == -1 {
            return None;
        }
        let [vk, shift_state] = packed.to_le_bytes();
        Some(Self { vk, shift_state })
    }
}

/// A mapping that is safe to emit: at most Shift is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VkMapping {
    pub vk: u8,
    pub scancode: u16,
    pub needs_shift: bool,
}

/// Resolves characters to keys under one specific keyboard layout.
pub trait KeyboardLayout: Send + Sync {
    /// Raw lookup of the key that produces `unit`, or `None` if no key does.
    fn vk_key_scan(&self, unit: u16) -> Option<VkKeyScan>;

    /// Hardware scancode for a virtual key, or 0 if the layout has none.
    fn scancode_for_vk(&self, vk: u8) -> u16;

    /// Maps a UTF-16 code unit to a Shift-only key combination.
    ///
    /// Returns `None` when the character has no key, needs Ctrl/Alt (or any
    /// other modifier bit), or the key has no scancode.
    fn map_char(&self, unit: u16) -> Option<VkMapping> {
        let scan = self.vk_key_scan(unit)?;
        if scan.shift_state & !SHIFT_STATE_SHIFT != 0 {
            return None;
        }
        let scancode = self.scancode_for_vk(scan.vk);
        if scancode == 0 {
            return None;
        }
        Some(VkMapping {
            vk: scan.vk,
            scancode,
            needs_shift: scan.shift_state & SHIFT_STATE_SHIFT != 0,
        })
    }

    /// Scancode used to press Shift around shifted characters.
    fn shift_scancode(&self) -> u16 {
        // VK_SHIFT is 0x10 and always fits in a byte.
        match self.scancode_for_vk(VK_SHIFT as u8) {
            0 => SCAN_LSHIFT,
            scan => scan,
        }
    }
}
