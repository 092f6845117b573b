use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the standard `~/.bikeshare/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.bikeshare/`
/// - `~/.bikeshare/logs/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let bikeshare_dir = home.join(".bikeshare");
    std::fs::create_dir_all(&bikeshare_dir)?;
    std::fs::create_dir_all(bikeshare_dir.join("logs"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive.
/// Falls back to `"info"` if the level string is not recognised.
///
/// The `log_file` parameter is accepted for forward-compatibility but file
/// logging is not yet wired – all output currently goes to stderr.
pub fn setup_logging(log_level: &str, _log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let upper = log_level.to_uppercase();
    let normalised = match upper.as_str() {
        "DEBUG" | "CRITICAL" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" => "error",
        other => other,
    };

    let filter = EnvFilter::try_new(normalised).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .init();

    Ok(())
}

// ── Data-path discovery ────────────────────────────────────────────────────────

/// Attempt to locate the directory holding the city CSV exports.
///
/// Checks the following paths in order and returns the first that exists:
/// 1. `./data/`
/// 2. `~/.bikeshare/data/`
///
/// Returns `None` when neither path exists.
pub fn discover_data_dir() -> Option<PathBuf> {
    discover_data_dir_from(Path::new("."), dirs::home_dir().as_deref())
}

/// Implementation with explicit roots so tests never have to mutate the
/// process working directory or `HOME`.
fn discover_data_dir_from(cwd: &Path, home: Option<&Path>) -> Option<PathBuf> {
    let mut candidates = vec![cwd.join("data")];
    if let Some(home) = home {
        candidates.push(home.join(".bikeshare").join("data"));
    }
    candidates.into_iter().find(|p| p.is_dir())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
