//! Injection modes: what the caller asks for versus what the encoder runs.
//!
//! The caller (config file, CLI flag) picks an [`InjectionMode`], which may be
//! `Auto`.  Before a run starts, `Auto` is resolved into a concrete
//! [`EncodingMode`].  The character encoder only ever sees `EncodingMode`, so
//! there is no "auto" branch for it to get wrong.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Encoding mode requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InjectionMode {
    /// Raw UTF-16 code units (`KEYEVENTF_UNICODE`).  Reliable for local apps.
    Unicode,
    /// Virtual key + hardware scancode under the target's layout.
    #[serde(rename = "vk", alias = "vkscancode")]
    VkScancode,
    /// Virtual key where possible, Unicode for anything unmappable.
    Hybrid,
    /// Let the injector decide.  Resolves to [`EncodingMode::Hybrid`].
    #[default]
    Auto,
}

/// Concrete encoding executed by the character encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingMode {
    Unicode,
    VkScancode,
    Hybrid,
}

/// Error returned when a mode string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown injection mode {0:?} (expected auto, unicode, vk or hybrid)")]
pub struct ParseModeError(pub String);

impl InjectionMode {
    /// Eliminates `Auto`.  Hybrid gives remote sessions scancode-level keys
    /// while still covering characters that have no key on the layout.
    pub fn resolve(self) -> EncodingMode {
        match self {
            InjectionMode::Unicode => EncodingMode::Unicode,
            InjectionMode::VkScancode => EncodingMode::VkScancode,
            InjectionMode::Hybrid | InjectionMode::Auto => EncodingMode::Hybrid,
        }
    }

    /// Key used in the config file and on the command line.
    pub fn as_key(self) -> &'static str {
        match self {
            InjectionMode::Unicode => "unicode",
            InjectionMode::VkScancode => "vk",
            InjectionMode::Hybrid => "hybrid",
            InjectionMode::Auto => "auto",
        }
    }

    /// Human-readable name of the mode a run actually used, for reports.
    ///
    /// `Auto` is shown together with its resolution, e.g. `Auto → Hybrid`.
    pub fn report_name(self) -> String {
        match self {
            InjectionMode::Auto => format!("Auto → {}", self.resolve().display_name()),
            other => other.resolve().display_name().to_string(),
        }
    }
}

impl EncodingMode {
    /// Display name used in diagnostic reports.
    pub fn display_name(self) -> &'static str {
        match self {
            EncodingMode::Unicode => "Unicode",
            EncodingMode::VkScancode => "VK Scancode",
            EncodingMode::Hybrid => "Hybrid",
        }
    }
}

impl fmt::Display for InjectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

impl FromStr for InjectionMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unicode" => Ok(InjectionMode::Unicode),
            "vk" | "vkscancode" => Ok(InjectionMode::VkScancode),
            "hybrid" => Ok(InjectionMode::Hybrid),
            "auto" => Ok(InjectionMode::Auto),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}
