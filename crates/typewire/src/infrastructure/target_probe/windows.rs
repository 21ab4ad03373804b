//! Windows target probe via `GetForegroundWindow`.
//!
//! The class name decides remote-versus-local; the owning thread's `HKL`
//! decides which layout the scancode encoder resolves characters against.
//! Using the target thread's layout (not ours) matters when the remote
//! session and the local desktop have different layouts configured.

#![cfg(target_os = "windows")]

use std::sync::Arc;

use tracing::trace;
use typewire_core::{KeyboardLayout, KeyboardLayoutId, RemoteClientInfo};
use windows::Win32::Foundation::HWND;
use windows::Win32::UI::Input::KeyboardAndMouse::GetKeyboardLayout;
use windows::Win32::UI::WindowsAndMessaging::{
    GetClassNameW, GetForegroundWindow, GetWindowThreadProcessId,
};

use crate::application::ports::TargetProbe;
use crate::infrastructure::input_injection::windows::WindowsKeyboardLayout;

/// Window class names are capped at 256 characters by the OS.
const CLASS_NAME_CAPACITY: usize = 256;

/// [`TargetProbe`] for the interactive desktop.
#[derive(Debug, Default)]
pub struct ForegroundWindowProbe;

impl ForegroundWindowProbe {
    pub fn new() -> Self {
        Self
    }
}

impl TargetProbe for ForegroundWindowProbe {
    fn classify(&self) -> RemoteClientInfo {
        let Some(hwnd) = foreground_window() else {
            return RemoteClientInfo::no_focus();
        };

        let class = class_name(hwnd);
        let mut process_id = 0u32;
        // SAFETY: hwnd was just returned by GetForegroundWindow and the out
        // pointer refers to a live stack variable.
        let thread_id = unsafe { GetWindowThreadProcessId(hwnd, Some(&mut process_id as *mut u32)) };
        // SAFETY: GetKeyboardLayout accepts any thread id; an exited thread
        // yields a null HKL.
        let hkl = unsafe { GetKeyboardLayout(thread_id) };

        let info = RemoteClientInfo::classify(
            class,
            thread_id,
            process_id,
            KeyboardLayoutId(hkl.0 as usize),
        );
        trace!(class = %info.window_class, remote = info.is_remote, thread_id, "classified foreground window");
        info
    }

    fn foreground_class(&self) -> Option<String> {
        foreground_window().map(class_name)
    }

    fn keyboard_layout(&self, target: &RemoteClientInfo) -> Arc<dyn KeyboardLayout> {
        let id = if target.keyboard_layout.0 == 0 {
            // No target thread: fall back to our own thread's layout.
            // SAFETY: thread id 0 means the calling thread.
            KeyboardLayoutId(unsafe { GetKeyboardLayout(0) }.0 as usize)
        } else {
            target.keyboard_layout
        };
        Arc::new(WindowsKeyboardLayout::new(id))
    }
}

fn foreground_window() -> Option<HWND> {
    // SAFETY: GetForegroundWindow has no preconditions and may return null.
    let hwnd = unsafe { GetForegroundWindow() };
    (!hwnd.is_invalid()).then_some(hwnd)
}

fn class_name(hwnd: HWND) -> String {
    let mut buf = [0u16; CLASS_NAME_CAPACITY];
    // SAFETY: buf is a writable buffer whose length is passed implicitly by
    // the slice; the call writes at most that many units.
    let len = unsafe { GetClassNameW(hwnd, &mut buf) };
    let len = usize::try_from(len).unwrap_or(0).min(buf.len());
    String::from_utf16_lossy(&buf[..len])
}
