//! Built-in US-QWERTY layout table.
//!
//! Reference: Windows Virtual-Key Codes (winuser.h) and the IBM PC/AT Set 1
//! scancode table.  Covers printable ASCII plus Tab, which is everything a
//! US keyboard can type with at most Shift held.
//!
//! # How this table works
//!
//! `CHAR_TO_KEY` is a compile-time array of 128 entries indexed by ASCII code.
//! Each entry packs `(shift_state << 8) | vk`, exactly like `VkKeyScanExW`
//! does, and 0 means "no key".  Scancodes are a second 256-entry array
//! indexed by VK.  Both lookups are O(1).

use super::{KeyboardLayout, VkKeyScan, SHIFT_STATE_SHIFT};

/// Fixed US-QWERTY layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsQwertyLayout;

impl KeyboardLayout for UsQwertyLayout {
    fn vk_key_scan(&self, unit: u16) -> Option<VkKeyScan> {
        let packed = *CHAR_TO_KEY.get(usize::from(unit))?;
        if packed == 0 {
            return None;
        }
        let [vk, shift_state] = packed.to_le_bytes();
        Some(VkKeyScan { vk, shift_state })
    }

    fn scancode_for_vk(&self, vk: u8) -> u16 {
        VK_TO_SCANCODE[usize::from(vk)]
    }
}

const SHIFT: u16 = (SHIFT_STATE_SHIFT as u16) << 8;

/// ASCII → packed `(shift_state << 8) | vk`.
const CHAR_TO_KEY: [u16; 128] = {
    let mut t = [0u16; 128];

    // ── Letters ───────────────────────────────────────────────────────────────
    let mut c = 0;
    while c < 26 {
        t[b'a' as usize + c] = 0x41 + c as u16;
        t[b'A' as usize + c] = SHIFT | (0x41 + c as u16);
        c += 1;
    }

    // ── Digit row ─────────────────────────────────────────────────────────────
    let mut d = 0;
    while d < 10 {
        t[b'0' as usize + d] = 0x30 + d as u16;
        d += 1;
    }
    t[b')' as usize] = SHIFT | 0x30;
    t[b'!' as usize] = SHIFT | 0x31;
    t[b'@' as usize] = SHIFT | 0x32;
    t[b'#' as usize] = SHIFT | 0x33;
    t[b'$' as usize] = SHIFT | 0x34;
    t[b'%' as usize] = SHIFT | 0x35;
    t[b'^' as usize] = SHIFT | 0x36;
    t[b'&' as usize] = SHIFT | 0x37;
    t[b'*' as usize] = SHIFT | 0x38;
    t[b'(' as usize] = SHIFT | 0x39;

    // ── Whitespace ────────────────────────────────────────────────────────────
    t[b' ' as usize] = 0x20; // VK_SPACE
    t[b'\t' as usize] = 0x09; // VK_TAB

    // ── OEM punctuation ───────────────────────────────────────────────────────
    t[b';' as usize] = 0xBA; // VK_OEM_1
    t[b':' as usize] = SHIFT | 0xBA;
    t[b'=' as usize] = 0xBB; // VK_OEM_PLUS
    t[b'+' as usize] = SHIFT | 0xBB;
    t[b',' as usize] = 0xBC; // VK_OEM_COMMA
    t[b'<' as usize] = SHIFT | 0xBC;
    t[b'-' as usize] = 0xBD; // VK_OEM_MINUS
    t[b'_' as usize] = SHIFT | 0xBD;
    t[b'.' as usize] = 0xBE; // VK_OEM_PERIOD
    t[b'>' as usize] = SHIFT | 0xBE;
    t[b'/' as usize] = 0xBF; // VK_OEM_2
    t[b'?' as usize] = SHIFT | 0xBF;
    t[b'`' as usize] = 0xC0; // VK_OEM_3
    t[b'~' as usize] = SHIFT | 0xC0;
    t[b'[' as usize] = 0xDB; // VK_OEM_4
    t[b'{' as usize] = SHIFT | 0xDB;
    t[b'\\' as usize] = 0xDC; // VK_OEM_5
    t[b'|' as usize] = SHIFT | 0xDC;
    t[b']' as usize] = 0xDD; // VK_OEM_6
    t[b'}' as usize] = SHIFT | 0xDD;
    t[b'\'' as usize] = 0xDE; // VK_OEM_7
    t[b'"' as usize] = SHIFT | 0xDE;

    t
};

/// VK → Set 1 scancode, 0 where the key does not exist.
const VK_TO_SCANCODE: [u16; 256] = {
    let mut t = [0u16; 256];

    // Letters in VK order A..Z.
    let letters: [u16; 26] = [
        0x1E, 0x30, 0x2E, 0x20, 0x12, 0x21, 0x22, 0x23, 0x17, 0x24, 0x25, 0x26, 0x32, 0x31,
        0x18, 0x19, 0x10, 0x13, 0x1F, 0x14, 0x16, 0x2F, 0x11, 0x2D, 0x15, 0x2C,
    ];
    let mut i = 0;
    while i < 26 {
        t[0x41 + i] = letters[i];
        i += 1;
    }

    // Digits: VK_1..VK_9 are 0x02..0x0A, VK_0 is 0x0B.
    let mut d = 1;
    while d < 10 {
        t[0x30 + d] = 0x01 + d as u16;
        d += 1;
    }
    t[0x30] = 0x0B;

    t[0x08] = 0x0E; // VK_BACK
    t[0x09] = 0x0F; // VK_TAB
    t[0x0D] = 0x1C; // VK_RETURN
    t[0x10] = 0x2A; // VK_SHIFT
    t[0x11] = 0x1D; // VK_CONTROL
    t[0x12] = 0x38; // VK_MENU
    t[0x1B] = 0x01; // VK_ESCAPE
    t[0x20] = 0x39; // VK_SPACE
    t[0xA0] = 0x2A; // VK_LSHIFT
    t[0xA1] = 0x36; // VK_RSHIFT
    t[0xBA] = 0x27;
    t[0xBB] = 0x0D;
    t[0xBC] = 0x33;
    t[0xBD] = 0x0C;
    t[0xBE] = 0x34;
    t[0xBF] = 0x35;
    t[0xC0] = 0x29;
    t[0xDB] = 0x1A;
    t[0xDC] = 0x2B;
    t[0xDD] = 0x1B;
    t[0xDE] = 0x28;

    t
};
