//! Windows input injection via `SendInput`.
//!
//! Maps [`KeyInput`] records to `KEYBDINPUT` structures:
//!
//! | `KeyInput`  | `wVk` | `wScan` | flags                    |
//! |-------------|-------|---------|--------------------------|
//! | `Unicode`   | 0     | unit    | `KEYEVENTF_UNICODE`      |
//! | `Scancode`  | vk    | scan    | `KEYEVENTF_SCANCODE`     |
//! | `Virtual`   | vk    | 0       | none                     |
//!
//! plus `KEYEVENTF_KEYUP` for key-up records.  Every event carries
//! [`INJECTION_TAG`] in `dwExtraInfo`.

#![cfg(target_os = "windows")]

use std::ffi::c_void;
use std::time::Duration;

use typewire_core::keymap::VkKeyScan;
use typewire_core::{KeyInput, KeyboardLayout, KeyboardLayoutId};
use windows::Win32::Media::{timeBeginPeriod, timeEndPeriod};
use windows::Win32::System::Threading::SwitchToThread;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    MapVirtualKeyExW, SendInput, VkKeyScanExW, HKL, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT,
    KEYBD_EVENT_FLAGS, KEYEVENTF_KEYUP, KEYEVENTF_SCANCODE, KEYEVENTF_UNICODE, MAPVK_VK_TO_VSC,
    VIRTUAL_KEY,
};

use super::{DRAIN_ROUNDS, DRAIN_ROUND_PAUSE, INJECTION_TAG, TIMER_RESOLUTION_MS};
use crate::application::ports::{InputSink, Pacer};

// ── SendInput sink ────────────────────────────────────────────────────────────

/// [`InputSink`] that submits events with `SendInput`.
#[derive(Debug, Default)]
pub struct SendInputSink;

impl SendInputSink {
    pub fn new() -> Self {
        Self
    }
}

impl InputSink for SendInputSink {
    fn submit(&self, events: &[KeyInput]) -> usize {
        if events.is_empty() {
            return 0;
        }
        let inputs: Vec<INPUT> = events.iter().map(to_input).collect();
        // SAFETY: `inputs` is a contiguous slice of fully initialised INPUT
        // structures and cbSize matches the element size.
        let accepted = unsafe { SendInput(&inputs, std::mem::size_of::<INPUT>() as i32) };
        accepted as usize
    }
}

fn to_input(event: &KeyInput) -> INPUT {
    let (vk, scan, mut flags) = match *event {
        KeyInput::Unicode { unit, .. } => (0, unit, KEYEVENTF_UNICODE),
        KeyInput::Scancode { vk, scan, .. } => (vk, scan, KEYEVENTF_SCANCODE),
        KeyInput::Virtual { vk, .. } => (vk, 0, KEYBD_EVENT_FLAGS(0)),
    };
    if event.is_key_up() {
        flags |= KEYEVENTF_KEYUP;
    }

    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(vk),
                wScan: scan,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: INJECTION_TAG,
            },
        },
    }
}

// ── Target keyboard layout ────────────────────────────────────────────────────

/// [`KeyboardLayout`] backed by a Windows `HKL`.
///
/// Holds the raw handle value so the type stays `Send + Sync`; `HKL` itself
/// wraps a raw pointer.
#[derive(Debug, Clone, Copy)]
pub struct WindowsKeyboardLayout {
    id: KeyboardLayoutId,
}

impl WindowsKeyboardLayout {
    pub fn new(id: KeyboardLayoutId) -> Self {
        Self { id }
    }

    fn hkl(&self) -> HKL {
        HKL(self.id.0 as *mut c_void)
    }
}

impl KeyboardLayout for WindowsKeyboardLayout {
    fn vk_key_scan(&self, unit: u16) -> Option<VkKeyScan> {
        // SAFETY: VkKeyScanExW only reads layout tables; an unknown HKL makes
        // it return -1, which `from_packed` maps to None.
        let packed = unsafe { VkKeyScanExW(unit, self.hkl()) };
        VkKeyScan::from_packed(packed)
    }

    fn scancode_for_vk(&self, vk: u8) -> u16 {
        // SAFETY: MapVirtualKeyExW is a pure table lookup; 0 means "no mapping".
        let scan = unsafe { MapVirtualKeyExW(u32::from(vk), MAPVK_VK_TO_VSC, Some(self.hkl())) };
        u16::try_from(scan).unwrap_or(0)
    }
}

// ── Pacer ─────────────────────────────────────────────────────────────────────

/// [`Pacer`] that blocks the calling thread.
#[derive(Debug, Default)]
pub struct ThreadPacer;

impl ThreadPacer {
    pub fn new() -> Self {
        Self
    }
}

impl Pacer for ThreadPacer {
    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }

    fn drain_input_queue(&self) {
        for _ in 0..DRAIN_ROUNDS {
            // SAFETY: SwitchToThread has no preconditions.
            let _ = unsafe { SwitchToThread() };
            std::thread::sleep(DRAIN_ROUND_PAUSE);
        }
    }

    fn begin_precise_timing(&self) {
        // SAFETY: paired with timeEndPeriod in `end_precise_timing`, which the
        // pipeline's run scope calls on every exit path.
        unsafe {
            timeBeginPeriod(TIMER_RESOLUTION_MS);
        }
    }

    fn end_precise_timing(&self) {
        // SAFETY: releases the request made in `begin_precise_timing`.
        unsafe {
            timeEndPeriod(TIMER_RESOLUTION_MS);
        }
    }
}
