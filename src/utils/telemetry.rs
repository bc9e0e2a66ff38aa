//! Diagnostic output setup.

use std::io::IsTerminal;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset: skipped records and failing
/// commands show up, internal tracing does not.
pub const DEFAULT_FILTER: &str = "warn";

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Installs a tracing subscriber that writes diagnostics to stderr.
///
/// Honours `RUST_LOG`, otherwise falls back to [`DEFAULT_FILTER`]. Calling
/// this more than once is harmless.
pub fn init_tracing() {
    if TRACING_INIT.get().is_some() {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .try_init();

    let _ = TRACING_INIT.set(());
}
