mod bootstrap;
mod render;
mod session;

use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use bikeshare_core::models::{City, FilterSpec};
use bikeshare_core::settings::Settings;
use bikeshare_data::analysis::explore;

use crate::session::Session;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("bikeshare v{} starting", env!("CARGO_PKG_VERSION"));

    let data_dir = settings
        .data_dir
        .clone()
        .or_else(bootstrap::discover_data_dir)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "no data directory found; pass --data-dir or place the city CSVs under ./data"
            )
        })?;
    tracing::info!("Using data directory {}", data_dir.display());

    if bikeshare_data::reader::find_csv_files(&data_dir).is_empty() {
        tracing::warn!("No CSV files found under {}", data_dir.display());
    }

    match settings.city.as_deref() {
        Some(city) => run_once(city, &settings, &data_dir),
        None => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            let mut session = Session::new(
                stdin.lock(),
                stdout.lock(),
                data_dir,
                settings.page_size as usize,
            );
            session.run()
        }
    }
}

/// Non-interactive mode: a single exploration for the city given on the
/// command line, reports printed straight to stdout.
fn run_once(city: &str, settings: &Settings, data_dir: &Path) -> Result<()> {
    let spec = FilterSpec {
        city: City::from_str(city)?,
        month: settings.month.clone(),
        day: settings.day.clone(),
    };

    let exploration = explore(&spec, data_dir)?;
    let mut out = std::io::stdout().lock();
    session::write_reports(&mut out, &exploration)?;
    Ok(())
}
