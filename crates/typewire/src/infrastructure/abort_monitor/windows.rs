//! Windows abort monitor: a `WH_KEYBOARD_LL` hook that watches for Escape.
//!
//! A low-level hook sees keys before any window does, including keys aimed at
//! an RDP or Citrix window that would otherwise swallow them.  Hook callbacks
//! are only delivered to a thread that pumps messages, and the injection
//! thread is busy sleeping, so the hook lives on its own message-loop thread
//! for exactly the duration of one run.
//!
//! Escape presses flagged `LLKHF_INJECTED`, or carrying our injection tag,
//! are ignored: only a physical Escape aborts.
//!
//! # Safety
//!
//! `unsafe` is used only for Win32 FFI calls; each block carries a
//! `// SAFETY:` comment.

#![cfg(target_os = "windows")]

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};
use typewire_core::domain::event::VK_ESCAPE;
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PeekMessageW, PostThreadMessageW,
    SetWindowsHookExW, UnhookWindowsHookEx, HC_ACTION, KBDLLHOOKSTRUCT, LLKHF_INJECTED, MSG,
    PM_NOREMOVE, WH_KEYBOARD_LL, WM_KEYDOWN, WM_QUIT, WM_SYSKEYDOWN, WM_USER,
};

use super::{is_abort_requested, request_abort, reset_abort_flag};
use crate::application::ports::{AbortGuard, AbortMonitor};
use crate::infrastructure::input_injection::INJECTION_TAG;
use crate::infrastructure::PlatformError;

/// [`AbortMonitor`] backed by a low-level keyboard hook.
#[derive(Debug, Default)]
pub struct EscapeHookMonitor;

impl EscapeHookMonitor {
    pub fn new() -> Self {
        Self
    }
}

impl AbortMonitor for EscapeHookMonitor {
    fn install(&self) -> Box<dyn AbortGuard> {
        reset_abort_flag();
        let hook_thread = match HookThread::spawn() {
            Ok(thread) => Some(thread),
            Err(err) => {
                // The run still works; only Escape is unavailable.
                warn!(error = %err, "Escape hook unavailable; abort with Ctrl+C instead");
                None
            }
        };
        Box::new(EscapeHookGuard { hook_thread })
    }
}

struct EscapeHookGuard {
    hook_thread: Option<HookThread>,
}

impl AbortGuard for EscapeHookGuard {
    fn is_requested(&self) -> bool {
        is_abort_requested()
    }
}

impl Drop for EscapeHookGuard {
    fn drop(&mut self) {
        if let Some(thread) = self.hook_thread.take() {
            thread.stop();
        }
        reset_abort_flag();
    }
}

// ── Hook thread ───────────────────────────────────────────────────────────────

struct HookThread {
    thread_id: u32,
    handle: JoinHandle<()>,
}

impl HookThread {
    /// Starts the message-loop thread and waits until the hook is installed.
    fn spawn() -> Result<Self, PlatformError> {
        let (ready_tx, ready_rx) = mpsc::channel::<Result<u32, String>>();

        let handle = thread::Builder::new()
            .name("typewire-escape-hook".to_string())
            .spawn(move || run_hook_message_loop(ready_tx))
            .map_err(|e| PlatformError::HookInstall(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(thread_id)) => {
                debug!(thread_id, "Escape hook installed");
                Ok(Self { thread_id, handle })
            }
            Ok(Err(reason)) => {
                let _ = handle.join();
                Err(PlatformError::HookInstall(reason))
            }
            Err(_) => Err(PlatformError::HookInstall("hook thread exited early".to_string())),
        }
    }

    /// Posts `WM_QUIT` to the loop and waits for the hook to be removed.
    fn stop(self) {
        // SAFETY: thread_id names the live hook thread, whose message queue was
        // created before it reported ready.
        let posted = unsafe { PostThreadMessageW(self.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) };
        if let Err(err) = posted {
            warn!(error = %err, "could not stop Escape hook thread");
            return;
        }
        if self.handle.join().is_err() {
            warn!("Escape hook thread panicked");
        }
        debug!("Escape hook removed");
    }
}

/// Body of the hook thread: install, pump until `WM_QUIT`, uninstall.
fn run_hook_message_loop(ready: mpsc::Sender<Result<u32, String>>) {
    let mut msg = MSG::default();
    // SAFETY: forces creation of this thread's message queue so that
    // PostThreadMessageW from the owner cannot race the first GetMessageW.
    unsafe {
        let _ = PeekMessageW(&mut msg, None, WM_USER, WM_USER, PM_NOREMOVE);
    }

    // SAFETY: the callback is a plain `extern "system"` fn with no captured
    // state; this thread pumps messages below, as WH_KEYBOARD_LL requires.
    let hook = match unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(escape_hook_proc), None, 0) } {
        Ok(hook) => hook,
        Err(err) => {
            let _ = ready.send(Err(err.to_string()));
            return;
        }
    };

    // SAFETY: GetCurrentThreadId has no preconditions.
    let thread_id = unsafe { GetCurrentThreadId() };
    if ready.send(Ok(thread_id)).is_err() {
        // Owner gave up waiting; nothing will ever post WM_QUIT.
        // SAFETY: hook was installed above on this thread.
        unsafe {
            let _ = UnhookWindowsHookEx(hook);
        }
        return;
    }

    // SAFETY: standard Win32 GetMessage/DispatchMessage loop on the thread
    // that owns the hook; exits when WM_QUIT arrives or GetMessageW fails.
    unsafe {
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            DispatchMessageW(&msg);
        }
        let _ = UnhookWindowsHookEx(hook);
    }
}

/// Low-level keyboard callback.
///
/// # Safety
///
/// Called by Windows on the hook thread.  Must return quickly and always
/// chain to `CallNextHookEx`.
unsafe extern "system" fn escape_hook_proc(n_code: i32, w_param: WPARAM, l_param: LPARAM) -> LRESULT {
    let is_key_down = w_param.0 == WM_KEYDOWN as usize || w_param.0 == WM_SYSKEYDOWN as usize;
    if n_code == HC_ACTION as i32 && is_key_down {
        // SAFETY: l_param points to a KBDLLHOOKSTRUCT when n_code == HC_ACTION.
        let kbs = unsafe { &*(l_param.0 as *const KBDLLHOOKSTRUCT) };
        let injected = (kbs.flags.0 & LLKHF_INJECTED.0) != 0 || kbs.dwExtraInfo == INJECTION_TAG;
        if kbs.vkCode == u32::from(VK_ESCAPE) && !injected {
            request_abort();
        }
    }
    // SAFETY: chaining is required for every hook invocation.
    unsafe { CallNextHookEx(None, n_code, w_param, l_param) }
}
