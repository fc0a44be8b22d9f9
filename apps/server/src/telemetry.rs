//! Tracing setup.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  registry                                                               │
//! │   ├── EnvFilter (RUST_LOG, default below) ──► fmt layer → stdout        │
//! │   └── target == "jangbu::error_log"       ──► fmt layer → error file    │
//! │                                               (only if configured)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Handlers emit to [`ERROR_LOG_TARGET`] when a failure should also land in
//! the error file with its full `Debug` chain.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::filter::{filter_fn, EnvFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Target of events that also go to the error log file.
pub const ERROR_LOG_TARGET: &str = "jangbu::error_log";

const DEFAULT_FILTER: &str = "info,jangbu=debug,sqlx=warn,tower_http=debug";

/// Installs the global subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=jangbu_db=trace` - Trace one crate
pub fn init_tracing(error_log: Option<&Path>) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let stdout = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_filter(filter);

    let error_file = match error_log {
        Some(path) => Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(open_append(path)?))
                .with_filter(filter_fn(|meta| meta.target() == ERROR_LOG_TARGET)),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(stdout)
        .with(error_file)
        .init();

    Ok(())
}

fn open_append(path: &Path) -> std::io::Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
