//! Typewire entry point.
//!
//! Reads text from the clipboard or a file, waits a few seconds so the user
//! can click into the target window, then types the text there.
//!
//! # Usage
//!
//! ```text
//! typewire [OPTIONS]
//!
//! Options:
//!   --mode <MODE>             auto | unicode | vk | hybrid
//!   --file <PATH>             Type this file instead of the clipboard
//!   --clipboard               Type the clipboard even if a file is configured
//!   --delay <SECS>            Countdown before typing starts (0-60)
//!   --keystroke-delay <MS>    Baseline added to every pause (0-100)
//!   --pacing <STRATEGY>       burst | per-character | per-event
//!   --diag                    Print and log a diagnostic report
//!   --save                    Persist these settings to config.toml
//! ```
//!
//! Unset options fall back to `config.toml`, then to built-in defaults.
//! Press Escape (or Ctrl+C here) to stop typing early.
//!
//! # Architecture overview
//!
//! ```text
//! main()  (tokio runtime)
//!  ├─ load config, merge CLI, read text
//!  ├─ countdown            tokio::time::sleep
//!  ├─ Ctrl+C task          request_abort()
//!  └─ spawn_blocking ──▶ InjectTextUseCase::send_text
//!        │ progress (mpsc)
//!        ▼
//!     progress log, then report → stdout + typewire-diag.log
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use typewire::application::{InjectTextUseCase, InjectionRequest, RunState};
use typewire::infrastructure::abort_monitor::{is_abort_requested, request_abort};
use typewire::infrastructure::platform_ports;
use typewire::infrastructure::storage::config::{
    self, AppConfig, SourceKind, MAX_ARM_DELAY_SECS,
};
use typewire::infrastructure::storage::diagnostic_log::DiagnosticLog;
use typewire::infrastructure::text_source::{ClipboardSource, FileSource, TextSource};
use typewire_core::domain::pacing::MAX_BASE_DELAY_MS;
use typewire_core::{InjectionMode, PacingStrategy, ReportStyle};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Types clipboard or file text into the focused window.
#[derive(Debug, Parser)]
#[command(
    name = "typewire",
    about = "Types clipboard or file text into the focused window",
    version
)]
struct Cli {
    /// Encoding mode: auto, unicode, vk or hybrid.
    #[arg(long, env = "TYPEWIRE_MODE")]
    mode: Option<InjectionMode>,

    /// Text file to type (UTF-8, UTF-16 with BOM, or Windows-1252).
    #[arg(long, value_name = "PATH", conflicts_with = "clipboard")]
    file: Option<PathBuf>,

    /// Type the clipboard even when config.toml names a file.
    #[arg(long)]
    clipboard: bool,

    /// Seconds to wait before typing starts.
    #[arg(long, value_name = "SECS")]
    delay: Option<u32>,

    /// Baseline delay in milliseconds added to every pause.
    #[arg(long, value_name = "MS", env = "TYPEWIRE_KEYSTROKE_DELAY")]
    keystroke_delay: Option<u32>,

    /// Force a pacing strategy instead of choosing from the target window.
    #[arg(long, value_enum)]
    pacing: Option<PacingArg>,

    /// Record a diagnostic report for this run.
    #[arg(long)]
    diag: bool,

    /// Write the effective settings back to config.toml.
    #[arg(long)]
    save: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PacingArg {
    Burst,
    PerCharacter,
    PerEvent,
}

impl From<PacingArg> for PacingStrategy {
    fn from(arg: PacingArg) -> Self {
        match arg {
            PacingArg::Burst => PacingStrategy::Burst,
            PacingArg::PerCharacter => PacingStrategy::PerCharacter,
            PacingArg::PerEvent => PacingStrategy::PerEvent,
        }
    }
}

impl Cli {
    /// Overlays the CLI flags on `config`, clamping to the allowed ranges.
    fn apply_to(&self, mut config: AppConfig) -> AppConfig {
        if let Some(mode) = self.mode {
            config.general.injection_mode = mode;
        }
        if let Some(delay) = self.delay {
            config.general.arm_delay_secs = delay;
        }
        if let Some(ms) = self.keystroke_delay {
            config.general.keystroke_delay_ms = ms;
        }
        if self.diag {
            config.general.diagnostics = true;
        }
        if let Some(path) = &self.file {
            config.source.kind = SourceKind::File;
            config.source.last_file_path = Some(path.clone());
        } else if self.clipboard {
            config.source.kind = SourceKind::Clipboard;
        }
        config.clamped()
    }
}

/// Picks the text source the merged settings describe.
fn text_source(config: &AppConfig) -> Box<dyn TextSource + Send> {
    match (config.source.kind, &config.source.last_file_path) {
        (SourceKind::File, Some(path)) => Box::new(FileSource::new(path.clone())),
        _ => Box::new(ClipboardSource::new()),
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config is read before logging starts because it carries the log level;
    // a load failure is reported once the subscriber is up.
    let loaded = config::load_config();
    let base = loaded.as_ref().cloned().unwrap_or_default();
    let settings = cli.apply_to(base);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.general.log_level)),
        )
        .init();

    if let Err(e) = &loaded {
        warn!("could not load config, using defaults: {e}");
    }

    if cli.save {
        config::save_config(&settings).context("failed to save settings")?;
        info!("settings saved");
    }

    // ── Read text ─────────────────────────────────────────────────────────────
    let source = text_source(&settings);
    let text = source
        .read_text()
        .with_context(|| format!("could not read text from {}", source.describe()))?;
    info!(source = %source.describe(), chars = text.chars().count(), "text loaded");

    let ports = platform_ports().context("cannot inject keystrokes here")?;

    // ── Ctrl+C → abort flag ──────────────────────────────────────────────────
    tokio::spawn(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, stopping");
                request_abort();
            }
            Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    // ── Countdown ─────────────────────────────────────────────────────────────
    let arm_delay = settings.general.arm_delay_secs.min(MAX_ARM_DELAY_SECS);
    for remaining in (1..=arm_delay).rev() {
        info!("typing starts in {remaining}s, focus the target window");
        tokio::time::sleep(Duration::from_secs(1)).await;
        if is_abort_requested() {
            info!("cancelled before typing started");
            return Ok(());
        }
    }

    // ── Inject ────────────────────────────────────────────────────────────────
    let mut request = InjectionRequest::new(text, settings.general.injection_mode)
        .with_base_delay(settings.general.keystroke_delay_ms.min(MAX_BASE_DELAY_MS))
        .with_diagnostics(settings.general.diagnostics);
    if let Some(pacing) = cli.pacing {
        request = request.with_pacing(pacing.into());
    }

    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<(usize, usize)>();
    let worker = tokio::task::spawn_blocking(move || {
        let mut use_case = InjectTextUseCase::new(ports);
        use_case.send_text(&request, &mut |sent, total| {
            let _ = progress_tx.send((sent, total));
        })
    });

    let mut last_decile = 0;
    while let Some((sent, total)) = progress_rx.recv().await {
        let decile = if total == 0 { 10 } else { sent * 10 / total };
        if decile > last_decile {
            last_decile = decile;
            info!("{sent}/{total} characters typed");
        }
    }

    let outcome = worker.await.context("injection task panicked")?;

    // ── Report ────────────────────────────────────────────────────────────────
    if let Some(report) = &outcome.report {
        println!("{}", report.render(ReportStyle::Dialog));
        match config::diagnostic_log_path() {
            Ok(path) => {
                if let Err(e) = DiagnosticLog::new(path).append(report) {
                    warn!("{e}");
                }
            }
            Err(e) => warn!("diagnostic log not written: {e}"),
        }
    }

    match outcome.state {
        RunState::Completed => {
            info!("typed {} characters", outcome.chars_sent);
            Ok(())
        }
        RunState::Aborted => {
            info!(
                "stopped after {} of {} characters",
                outcome.chars_sent, outcome.chars_requested
            );
            Ok(())
        }
        _ => anyhow::bail!(
            "typed {} of {} characters before the target stopped accepting input",
            outcome.chars_sent,
            outcome.chars_requested
        ),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
