//! Target classification: is the focused window a remote-access client?
//!
//! The classification is captured once at the start of a run and drives two
//! decisions:
//!
//! 1. The [`PacingStrategy`](super::pacing::PacingStrategy): remote clients get
//!    conservative per-character pacing.
//! 2. Virtual-key resolution: characters are mapped under the keyboard layout
//!    of the *focused window's thread*, not the injector's own layout.

/// Window classes of known remote-desktop and remote-browser clients.
///
/// Compared case-insensitively against the focused window's class name.
pub const REMOTE_WINDOW_CLASSES: &[&str] = &[
    "TscShellContainerClass",     // mstsc.exe (RDP)
    "ICAClientClass",             // Citrix Workspace / Receiver
    "RAIL_WINDOW",                // Citrix seamless apps, RemoteApp
    "Transparent Windows Client", // Azure Virtual Desktop
    "vncviewer",
    "TightVNC",
    "RealVNC",
    "MozillaWindowClass",         // Firefox (noVNC, Guacamole)
    "Chrome_WidgetWin_1",         // Chrome/Edge (noVNC, Azure Bastion)
];

/// Opaque keyboard layout handle (an `HKL` on Windows).
///
/// `KeyboardLayoutId::default()` means "unknown"; layout resolvers treat it as
/// the system default layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyboardLayoutId(pub usize);

/// What the classifier learned about the focused window.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemoteClientInfo {
    pub is_remote: bool,
    /// Window class name; empty when no window has focus.
    pub window_class: String,
    pub owner_thread_id: u32,
    pub owner_process_id: u32,
    pub keyboard_layout: KeyboardLayoutId,
}

impl RemoteClientInfo {
    /// Classifies a focused window from its raw attributes.
    pub fn classify(
        window_class: impl Into<String>,
        owner_thread_id: u32,
        owner_process_id: u32,
        keyboard_layout: KeyboardLayoutId,
    ) -> Self {
        let window_class = window_class.into();
        Self {
            is_remote: is_known_remote_class(&window_class),
            window_class,
            owner_thread_id,
            owner_process_id,
            keyboard_layout,
        }
    }

    /// Result used when nothing has focus: local, empty class.
    pub fn no_focus() -> Self {
        Self::default()
    }

    /// Class name for reports, with a placeholder for the empty case.
    pub fn display_class(&self) -> &str {
        if self.window_class.is_empty() {
            "(no focused window)"
        } else {
            &self.window_class
        }
    }
}

/// Returns `true` if `class_name` matches a known remote client class.
pub fn is_known_remote_class(class_name: &str) -> bool {
    !class_name.is_empty()
        && REMOTE_WINDOW_CLASSES
            .iter()
            .any(|known| known.eq_ignore_ascii_case(class_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rdp_class_is_remote() {
        assert!(is_known_remote_class("TscShellContainerClass"));
    }

    #[test]
    fn test_match_is_case_insensitive() {
        assert!(is_known_remote_class("icaclientclass"));
        assert!(is_known_remote_class("CHROME_WIDGETWIN_1"));
    }

    #[test]
    fn test_notepad_is_not_remote() {
        assert!(!is_known_remote_class("Notepad"));
    }

    #[test]
    fn test_empty_class_is_not_remote() {
        assert!(!is_known_remote_class(""));
    }

    #[test]
    fn test_partial_match_is_not_remote() {
        assert!(!is_known_remote_class("vncviewer2"));
        assert!(!is_known_remote_class("RAIL"));
    }

    #[test]
    fn test_classify_sets_remote_flag_and_keeps_handles() {
        let info = RemoteClientInfo::classify("RAIL_WINDOW", 42, 7, KeyboardLayoutId(0x0409));
        assert!(info.is_remote);
        assert_eq!(info.owner_thread_id, 42);
        assert_eq!(info.owner_process_id, 7);
        assert_eq!(info.keyboard_layout, KeyboardLayoutId(0x0409));
    }

    #[test]
    fn test_no_focus_is_local_with_empty_class() {
        let info = RemoteClientInfo::no_focus();
        assert!(!info.is_remote);
        assert!(info.window_class.is_empty());
        assert_eq!(info.display_class(), "(no focused window)");
    }
}
