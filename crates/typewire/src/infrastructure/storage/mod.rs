//! Storage infrastructure: settings file and diagnostic log persistence.
//!
//! - **`config`** – reads and writes `config.toml` in the platform config
//!   directory, with defaults for first run and clamping for hand-edited
//!   values.
//! - **`diagnostic_log`** – appends rendered run reports to
//!   `typewire-diag.log` next to the config file.

pub mod config;
pub mod diagnostic_log;
