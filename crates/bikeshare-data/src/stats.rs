//! The four descriptive-statistic groups computed over a filtered trip table.
//!
//! Every group is a pure function of `&TripTable`: no caching, no mutation
//! of the input. All of them fail with [`ExploreError::EmptyDataset`] on an
//! empty table, independently of one another, so a caller can keep running
//! the remaining groups after one fails.
//!
//! "Most frequent" ties are always broken toward the smallest value –
//! numeric order for months and hours, lexicographic order for names and
//! station pairs.

use std::collections::BTreeMap;

use bikeshare_core::error::{ExploreError, Result};
use bikeshare_core::formatting::{split_average_duration, split_total_duration};
use bikeshare_core::models::TripTable;

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Most frequent value in `values`; ties break toward the smallest value.
///
/// Returns `None` for an empty input. Counting goes through a `BTreeMap` so
/// the tie-break is structural rather than an accident of hash ordering.
fn most_frequent<T: Ord>(values: impl Iterator<Item = T>) -> Option<T> {
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut best: Option<(T, usize)> = None;
    for (value, count) in counts {
        // Strictly greater: on a tie the earlier (smaller) key wins.
        let replace = match &best {
            Some((_, best_count)) => count > *best_count,
            None => true,
        };
        if replace {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

/// Frequency table ordered by descending count, ties by name ascending.
fn frequency_table(values: impl Iterator<Item = String>) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut rows: Vec<(String, usize)> = counts.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows
}

// ── TimeStats ─────────────────────────────────────────────────────────────────

/// Most frequent times of travel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeStats {
    /// Most frequent calendar month (1-12) of trip starts.
    pub popular_month: u32,
    /// Most frequent weekday name of trip starts.
    pub popular_day: String,
    /// Most frequent start hour (0-23).
    pub popular_hour: u32,
}

impl TimeStats {
    pub fn from_table(table: &TripTable) -> Result<Self> {
        if table.is_empty() {
            return Err(ExploreError::EmptyDataset("time statistics"));
        }

        let empty = || ExploreError::EmptyDataset("time statistics");
        Ok(TimeStats {
            popular_month: most_frequent(table.records.iter().map(|r| r.month))
                .ok_or_else(empty)?,
            popular_day: most_frequent(table.records.iter().map(|r| r.day_of_week.clone()))
                .ok_or_else(empty)?,
            popular_hour: most_frequent(table.records.iter().map(|r| r.start_hour()))
                .ok_or_else(empty)?,
        })
    }
}

// ── StationStats ──────────────────────────────────────────────────────────────

/// Most popular stations and trip combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationStats {
    /// Most frequent start-station name.
    pub popular_start: String,
    /// Most frequent end-station name.
    pub popular_end: String,
    /// Most frequent (start, end) pair. Aggregated on the structured pair,
    /// so station names containing the rendering separator cannot conflate
    /// distinct trips.
    pub popular_trip: (String, String),
}

impl StationStats {
    pub fn from_table(table: &TripTable) -> Result<Self> {
        if table.is_empty() {
            return Err(ExploreError::EmptyDataset("station statistics"));
        }

        let empty = || ExploreError::EmptyDataset("station statistics");
        Ok(StationStats {
            popular_start: most_frequent(table.records.iter().map(|r| r.start_station.clone()))
                .ok_or_else(empty)?,
            popular_end: most_frequent(table.records.iter().map(|r| r.end_station.clone()))
                .ok_or_else(empty)?,
            popular_trip: most_frequent(
                table
                    .records
                    .iter()
                    .map(|r| (r.start_station.clone(), r.end_station.clone())),
            )
            .ok_or_else(empty)?,
        })
    }

    /// The trip combination rendered the way the reports show it.
    pub fn trip_label(&self) -> String {
        format!("{} and {}", self.popular_trip.0, self.popular_trip.1)
    }
}

// ── DurationStats ─────────────────────────────────────────────────────────────

/// Total and average trip duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationStats {
    /// Sum of all trip durations, in seconds.
    pub total_seconds: u64,
    /// Mean trip duration rounded half-up to the nearest whole second.
    pub average_seconds: u64,
}

impl DurationStats {
    pub fn from_table(table: &TripTable) -> Result<Self> {
        if table.is_empty() {
            return Err(ExploreError::EmptyDataset("duration statistics"));
        }

        let total_seconds: u64 = table.records.iter().map(|r| r.trip_duration).sum();
        let average_seconds =
            (total_seconds as f64 / table.len() as f64).round() as u64;

        Ok(DurationStats {
            total_seconds,
            average_seconds,
        })
    }

    /// Total duration decomposed as (hours, minutes, seconds).
    pub fn total_hms(&self) -> (u64, u64, u64) {
        split_total_duration(self.total_seconds)
    }

    /// Average duration decomposed as (minutes, seconds).
    pub fn average_ms(&self) -> (u64, u64) {
        split_average_duration(self.average_seconds)
    }
}

// ── UserStats ─────────────────────────────────────────────────────────────────

/// Availability wrapper for per-city demographic fields.
///
/// Distinguishes a column the export never carries (`NotRecorded`) from one
/// that is present but holds no values (`Empty`). Both are normal outcomes,
/// not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSummary<T> {
    Present(T),
    Empty,
    NotRecorded,
}

impl<T> FieldSummary<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, FieldSummary::Present(_))
    }
}

/// Earliest, most recent and most common rider birth year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthYearStats {
    pub earliest: u32,
    pub most_recent: u32,
    pub most_common: u32,
}

/// Rider demographics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStats {
    /// Counts per user type, ordered by descending count (ties by name).
    pub user_types: Vec<(String, usize)>,
    /// Counts per gender, where the city records it.
    pub genders: FieldSummary<Vec<(String, usize)>>,
    /// Birth-year extremes and mode, where the city records it.
    pub birth_years: FieldSummary<BirthYearStats>,
}

impl UserStats {
    pub fn from_table(table: &TripTable) -> Result<Self> {
        if table.is_empty() {
            return Err(ExploreError::EmptyDataset("user statistics"));
        }

        let user_types = frequency_table(
            table
                .records
                .iter()
                .filter_map(|r| r.user_type.clone()),
        );

        let genders = if !table.columns.gender {
            FieldSummary::NotRecorded
        } else {
            let counts = frequency_table(table.records.iter().filter_map(|r| r.gender.clone()));
            if counts.is_empty() {
                FieldSummary::Empty
            } else {
                FieldSummary::Present(counts)
            }
        };

        let birth_years = if !table.columns.birth_year {
            FieldSummary::NotRecorded
        } else {
            let years: Vec<u32> = table.records.iter().filter_map(|r| r.birth_year).collect();
            match Self::birth_year_stats(&years) {
                Some(stats) => FieldSummary::Present(stats),
                None => FieldSummary::Empty,
            }
        };

        Ok(UserStats {
            user_types,
            genders,
            birth_years,
        })
    }

    fn birth_year_stats(years: &[u32]) -> Option<BirthYearStats> {
        Some(BirthYearStats {
            earliest: years.iter().copied().min()?,
            most_recent: years.iter().copied().max()?,
            most_common: most_frequent(years.iter().copied())?,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
