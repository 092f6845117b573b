//! CSV discovery and loading for the bikeshare explorer.
//!
//! Reads the per-city trip exports into a [`TripTable`], deriving the
//! calendar fields every downstream aggregation relies on, and applies the
//! month/day filters of a [`FilterSpec`].

use std::fs::File;
use std::path::{Path, PathBuf};

use bikeshare_core::error::{ExploreError, Result};
use bikeshare_core::models::{
    day_title, month_index, City, ColumnPresence, FilterSpec, TripRecord, TripTable,
};
use bikeshare_core::timestamps;
use chrono::Datelike;
use serde::Deserialize;
use tracing::{debug, warn};

// ── Raw CSV row ───────────────────────────────────────────────────────────────

/// One row of a city CSV, with the column names the upstream exports use.
///
/// `Gender` and `Birth Year` only exist in some exports; `default` lets serde
/// fill `None` when the column is structurally absent.
#[derive(Debug, Deserialize)]
struct RawTrip {
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "End Time", default)]
    end_time: Option<String>,
    #[serde(rename = "Trip Duration")]
    trip_duration: f64,
    #[serde(rename = "Start Station")]
    start_station: String,
    #[serde(rename = "End Station")]
    end_station: String,
    #[serde(rename = "User Type", default)]
    user_type: Option<String>,
    #[serde(rename = "Gender", default)]
    gender: Option<String>,
    #[serde(rename = "Birth Year", default)]
    birth_year: Option<f64>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.csv` files recursively under `data_dir`, sorted by path.
pub fn find_csv_files(data_dir: &Path) -> Vec<PathBuf> {
    if !data_dir.exists() {
        warn!("Data path does not exist: {}", data_dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "csv")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Path of `city`'s CSV export inside `data_dir`.
pub fn dataset_path(data_dir: &Path, city: City) -> PathBuf {
    data_dir.join(city.csv_file_name())
}

/// Cities whose dataset file is present under `data_dir`.
pub fn available_cities(data_dir: &Path) -> Vec<City> {
    City::ALL
        .into_iter()
        .filter(|city| dataset_path(data_dir, *city).is_file())
        .collect()
}

/// Read every trip for `city` from its CSV export, deriving `month` and
/// `day_of_week` for each record.
///
/// The file handle is scoped to this call; the table is fully materialised
/// in memory before returning. An unparsable start timestamp fails the whole
/// load – the exports carry no per-row tolerance policy.
pub fn read_city_table(data_dir: &Path, city: City) -> Result<TripTable> {
    let path = dataset_path(data_dir, city);
    let file = File::open(&path).map_err(|source| ExploreError::DatasetUnavailable {
        city: city.display_name().to_string(),
        path: path.clone(),
        source,
    })?;

    let mut reader = csv::Reader::from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| corrupt(&path, e))?
        .clone();
    let columns = ColumnPresence {
        gender: headers.iter().any(|h| h == "Gender"),
        birth_year: headers.iter().any(|h| h == "Birth Year"),
    };

    let mut records = Vec::new();
    for row in reader.deserialize::<RawTrip>() {
        let raw = row.map_err(|e| corrupt(&path, e))?;
        records.push(into_record(raw, &path)?);
    }

    debug!(
        "Read {} trips from {} (gender: {}, birth year: {})",
        records.len(),
        path.display(),
        columns.gender,
        columns.birth_year,
    );

    Ok(TripTable { records, columns })
}

/// Load `spec.city`'s trips and apply its month/day filters.
///
/// The filter vocabulary is validated before the file is touched, so an
/// unrecognised month/day never pays for a full CSV read.
pub fn load_trips(spec: &FilterSpec, data_dir: &Path) -> Result<TripTable> {
    let month = month_index(&spec.month)?;
    let day = day_title(&spec.day)?;

    let table = read_city_table(data_dir, spec.city)?;
    let total = table.len();

    let table = apply_filters(table, month, day.as_deref());
    debug!(
        "Loaded {} trips for {}; {} match month={} day={}",
        total,
        spec.city,
        table.len(),
        spec.month,
        spec.day,
    );

    Ok(table)
}

/// Apply pre-validated month/day filters, preserving row order.
pub fn apply_filters(table: TripTable, month: Option<u32>, day: Option<&str>) -> TripTable {
    let table = match month {
        Some(m) => table.filter_by_month(m),
        None => table,
    };
    match day {
        Some(d) => table.filter_by_day(d),
        None => table,
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn corrupt(path: &Path, err: impl std::fmt::Display) -> ExploreError {
    ExploreError::DatasetCorrupt {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Convert a raw CSV row into a [`TripRecord`] with derived calendar fields.
fn into_record(raw: RawTrip, path: &Path) -> Result<TripRecord> {
    let start_time = timestamps::parse_timestamp(&raw.start_time)
        .ok_or_else(|| ExploreError::TimestampParse(raw.start_time.clone()))?;

    // End times are informational only; an unparsable one degrades to None.
    let end_time = raw
        .end_time
        .as_deref()
        .and_then(timestamps::parse_timestamp);

    if raw.trip_duration < 0.0 {
        return Err(corrupt(
            path,
            format!("negative trip duration {}", raw.trip_duration),
        ));
    }

    Ok(TripRecord {
        month: start_time.month(),
        day_of_week: timestamps::weekday_name(&start_time).to_string(),
        start_time,
        end_time,
        // Some exports store durations and birth years float-formatted.
        trip_duration: raw.trip_duration.round() as u64,
        start_station: raw.start_station,
        end_station: raw.end_station,
        user_type: raw.user_type.filter(|s| !s.trim().is_empty()),
        gender: raw.gender.filter(|s| !s.trim().is_empty()),
        birth_year: raw.birth_year.map(|y| y.round() as u32),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
