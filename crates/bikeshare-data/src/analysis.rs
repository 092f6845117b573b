//! The exploration pipeline: load a city's trips, apply the filters and
//! return the table together with timing metadata for the session report.

use std::path::Path;
use std::time::Instant;

use bikeshare_core::error::Result;
use bikeshare_core::models::{day_title, month_index, FilterSpec, TripTable};
use chrono::Utc;
use tracing::debug;

use crate::reader::{apply_filters, read_city_table};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside an exploration run.
#[derive(Debug, Clone)]
pub struct ExplorationMetadata {
    /// ISO-8601 timestamp when this exploration was run.
    pub generated_at: String,
    /// Rows read from the city CSV before filtering.
    pub rows_loaded: usize,
    /// Rows surviving the month/day filters.
    pub rows_matching: usize,
    /// Wall-clock seconds spent reading and parsing the CSV.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent applying the filters.
    pub filter_time_seconds: f64,
}

/// The output of [`explore`]: the filtered table plus run metadata.
#[derive(Debug, Clone)]
pub struct Exploration {
    pub table: TripTable,
    pub metadata: ExplorationMetadata,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run one exploration: validate the filter vocabulary, load the city's
/// trips, apply the filters and collect timing metadata.
///
/// The table is consumed by the four aggregation groups and discarded when
/// the session iteration ends; nothing is cached across runs.
pub fn explore(spec: &FilterSpec, data_dir: &Path) -> Result<Exploration> {
    let month = month_index(&spec.month)?;
    let day = day_title(&spec.day)?;

    let load_start = Instant::now();
    let full = read_city_table(data_dir, spec.city)?;
    let load_time = load_start.elapsed().as_secs_f64();
    let rows_loaded = full.len();

    let filter_start = Instant::now();
    let table = apply_filters(full, month, day.as_deref());
    let filter_time = filter_start.elapsed().as_secs_f64();

    debug!(
        "Explored {}: {} rows loaded, {} matching (load {:.3}s, filter {:.3}s)",
        spec.city,
        rows_loaded,
        table.len(),
        load_time,
        filter_time,
    );

    let metadata = ExplorationMetadata {
        generated_at: Utc::now().to_rfc3339(),
        rows_loaded,
        rows_matching: table.len(),
        load_time_seconds: load_time,
        filter_time_seconds: filter_time,
    };

    Ok(Exploration { table, metadata })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::DurationStats;
    use bikeshare_core::error::ExploreError;
    use bikeshare_core::models::City;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_chicago(dir: &Path, lines: &[&str]) {
        let mut file = std::fs::File::create(dir.join("chicago.csv")).unwrap();
        writeln!(
            file,
            "Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year"
        )
        .unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
    }

    #[test]
    fn test_explore_unfiltered() {
        let dir = TempDir::new().unwrap();
        write_chicago(
            dir.path(),
            &[
                "2017-01-01 08:00:00,,100,A,B,Subscriber,Male,1989",
                "2017-01-01 08:05:00,,200,A,B,Customer,Female,1992",
            ],
        );

        let spec = FilterSpec::unfiltered(City::Chicago);
        let result = explore(&spec, dir.path()).unwrap();

        assert_eq!(result.metadata.rows_loaded, 2);
        assert_eq!(result.metadata.rows_matching, 2);
        assert_eq!(result.table.len(), 2);
    }

    #[test]
    fn test_explore_metadata_fields_populated() {
        let dir = TempDir::new().unwrap();
        write_chicago(dir.path(), &["2017-01-01 08:00:00,,100,A,B,Subscriber,,"]);

        let spec = FilterSpec::unfiltered(City::Chicago);
        let result = explore(&spec, dir.path()).unwrap();

        assert!(!result.metadata.generated_at.is_empty());
        assert!(result.metadata.load_time_seconds >= 0.0);
        assert!(result.metadata.filter_time_seconds >= 0.0);
    }

    #[test]
    fn test_explore_invalid_month_rejected() {
        let dir = TempDir::new().unwrap();
        let spec = FilterSpec {
            city: City::Chicago,
            month: "december".to_string(),
            day: "all".to_string(),
        };
        let err = explore(&spec, dir.path()).unwrap_err();
        assert!(matches!(err, ExploreError::InvalidFilter(_)));
    }

    #[test]
    fn test_explore_missing_dataset() {
        let dir = TempDir::new().unwrap();
        let spec = FilterSpec::unfiltered(City::Washington);
        let err = explore(&spec, dir.path()).unwrap_err();
        assert!(matches!(err, ExploreError::DatasetUnavailable { .. }));
    }

    // The worked scenario: three trips, February filter keeps exactly one,
    // and its duration statistics decompose as 0h 5m 0s / 5m 0s.
    #[test]
    fn test_explore_february_scenario() {
        let dir = TempDir::new().unwrap();
        write_chicago(
            dir.path(),
            &[
                "2017-01-01 08:00:00,,100,A,B,Subscriber,Male,1989",
                "2017-01-01 08:05:00,,200,A,B,Customer,Female,1992",
                "2017-02-01 09:00:00,,300,A,B,Subscriber,Male,1985",
            ],
        );

        let spec = FilterSpec {
            city: City::Chicago,
            month: "february".to_string(),
            day: "all".to_string(),
        };
        let result = explore(&spec, dir.path()).unwrap();

        assert_eq!(result.metadata.rows_loaded, 3);
        assert_eq!(result.table.len(), 1);

        let durations = DurationStats::from_table(&result.table).unwrap();
        assert_eq!(durations.total_seconds, 300);
        assert_eq!(durations.total_hms(), (0, 5, 0));
        assert_eq!(durations.average_seconds, 300);
        assert_eq!(durations.average_ms(), (5, 0));
    }
}
