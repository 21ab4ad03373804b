//! Low-level keyboard input records.
//!
//! A [`KeyInput`] is one atomic key-down or key-up, in the shape the OS input
//! queue accepts.  Encoders append them to an ordered buffer; the flusher
//! submits the buffer in order.
//!
//! # Three encodings
//!
//! - [`KeyInput::Unicode`] carries a UTF-16 code unit and no key semantics.
//!   The OS turns it into a `WM_CHAR` without touching modifier state.
//! - [`KeyInput::Scancode`] carries a hardware scancode (plus the virtual key
//!   it came from, for logging).  Remote-session keyboard drivers honour these
//!   more uniformly than virtual keys.
//! - [`KeyInput::Virtual`] carries only a virtual key.  Used for the modifier
//!   reset fence, where the physical position is irrelevant.

/// Virtual key: either Shift key (layout-neutral).
pub const VK_SHIFT: u16 = 0x10;
/// Virtual key: Escape.
pub const VK_ESCAPE: u16 = 0x1B;
/// Virtual key: left Shift.
pub const VK_LSHIFT: u16 = 0xA0;
/// Virtual key: right Shift.
pub const VK_RSHIFT: u16 = 0xA1;
/// Virtual key: left Ctrl.
pub const VK_LCONTROL: u16 = 0xA2;
/// Virtual key: right Ctrl.
pub const VK_RCONTROL: u16 = 0xA3;
/// Virtual key: left Alt.
pub const VK_LMENU: u16 = 0xA4;
/// Virtual key: right Alt (AltGr on many layouts).
pub const VK_RMENU: u16 = 0xA5;

/// Set-1 hardware scancode of the main Enter key.
pub const SCAN_ENTER: u16 = 0x1C;
/// Set-1 hardware scancode of the left Shift key.
pub const SCAN_LSHIFT: u16 = 0x2A;

/// The six modifier keys released by the reset fence, in release order.
pub const MODIFIER_KEYS: [u16; 6] = [
    VK_LSHIFT,
    VK_RSHIFT,
    VK_LCONTROL,
    VK_RCONTROL,
    VK_LMENU,
    VK_RMENU,
];

/// One atomic key-down or key-up record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyInput {
    /// A UTF-16 code unit delivered without virtual-key resolution.
    Unicode { unit: u16, key_up: bool },
    /// A hardware scancode delivery.  `vk` is informational.
    Scancode { vk: u16, scan: u16, key_up: bool },
    /// A virtual-key delivery with no scancode.
    Virtual { vk: u16, key_up: bool },
}

impl KeyInput {
    /// Returns `true` for a key-up record.
    pub fn is_key_up(&self) -> bool {
        match *self {
            KeyInput::Unicode { key_up, .. }
            | KeyInput::Scancode { key_up, .. }
            | KeyInput::Virtual { key_up, .. } => key_up,
        }
    }

    /// Key-down + key-up pair for a single UTF-16 code unit.
    pub fn unicode_pair(unit: u16) -> [KeyInput; 2] {
        [
            KeyInput::Unicode { unit, key_up: false },
            KeyInput::Unicode { unit, key_up: true },
        ]
    }

    /// Key-down + key-up pair for a scancode.
    pub fn scancode_pair(vk: u16, scan: u16) -> [KeyInput; 2] {
        [
            KeyInput::Scancode { vk, scan, key_up: false },
            KeyInput::Scancode { vk, scan, key_up: true },
        ]
    }

    /// Hardware Enter press and release.
    ///
    /// Some editors (Scintilla-based ones in particular) ignore a Unicode
    /// CR/LF and only break the line on a real Enter scancode.
    pub fn enter_pair() -> [KeyInput; 2] {
        KeyInput::scancode_pair(0, SCAN_ENTER)
    }

    /// Key-up for every modifier in [`MODIFIER_KEYS`].
    pub fn modifier_reset() -> [KeyInput; 6] {
        MODIFIER_KEYS.map(|vk| KeyInput::Virtual { vk, key_up: true })
    }
}
