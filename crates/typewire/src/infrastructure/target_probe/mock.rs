//! Scripted target probe for tests.
//!
//! Returns a fixed classification and replays a queue of focus observations,
//! so a test can simulate the user clicking into another window halfway
//! through a run.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use typewire_core::keymap::UsQwertyLayout;
use typewire_core::{KeyboardLayout, KeyboardLayoutId, RemoteClientInfo};

use crate::application::ports::TargetProbe;

/// [`TargetProbe`] with a fixed target and an optional focus script.
pub struct ScriptedTargetProbe {
    target: RemoteClientInfo,
    layout: Arc<dyn KeyboardLayout>,
    /// Answers for successive `foreground_class` calls; once empty, the
    /// target's own class is reported.
    focus_script: Mutex<VecDeque<Option<String>>>,
    focus_queries: AtomicUsize,
}

impl ScriptedTargetProbe {
    /// A focused window of class `window_class`, classified like the real
    /// probe would.  Uses the US QWERTY layout.
    pub fn focused(window_class: &str) -> Self {
        Self {
            target: RemoteClientInfo::classify(window_class, 1000, 2000, KeyboardLayoutId(0x0409_0409)),
            layout: Arc::new(UsQwertyLayout),
            focus_script: Mutex::default(),
            focus_queries: AtomicUsize::new(0),
        }
    }

    /// Nothing has focus.
    pub fn unfocused() -> Self {
        Self {
            target: RemoteClientInfo::no_focus(),
            ..Self::focused("")
        }
    }

    pub fn with_layout(mut self, layout: Arc<dyn KeyboardLayout>) -> Self {
        self.layout = layout;
        self
    }

    /// Queues the classes `foreground_class` reports, one per call.
    pub fn with_focus_sequence<I, S>(self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut script = self.focus_script.lock().unwrap();
            script.extend(classes.into_iter().map(|c| Some(c.into())));
        }
        self
    }

    pub fn focus_queries(&self) -> usize {
        self.focus_queries.load(Ordering::SeqCst)
    }
}

impl TargetProbe for ScriptedTargetProbe {
    fn classify(&self) -> RemoteClientInfo {
        self.target.clone()
    }

    fn foreground_class(&self) -> Option<String> {
        self.focus_queries.fetch_add(1, Ordering::SeqCst);
        match self.focus_script.lock().unwrap().pop_front() {
            Some(answer) => answer,
            None if self.target.window_class.is_empty() => None,
            None => Some(self.target.window_class.clone()),
        }
    }

    fn keyboard_layout(&self, _target: &RemoteClientInfo) -> Arc<dyn KeyboardLayout> {
        Arc::clone(&self.layout)
    }
}
