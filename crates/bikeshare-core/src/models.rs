use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ExploreError;

/// Month names accepted by the month filter.
///
/// The bundled datasets only cover the first half of 2017, so the filter
/// vocabulary deliberately stops at June.
pub const MONTHS: [&str; 6] = ["january", "february", "march", "april", "may", "june"];

/// Day names accepted by the day filter.
pub const DAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Full calendar month names, used for rendering derived month numbers.
const CALENDAR_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// ── City ──────────────────────────────────────────────────────────────────────

/// One of the three cities with a bundled trip dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum City {
    Chicago,
    NewYorkCity,
    Washington,
}

impl City {
    /// Every supported city, in prompt order.
    pub const ALL: [City; 3] = [City::Chicago, City::NewYorkCity, City::Washington];

    /// File name of the city's CSV export inside the data directory.
    pub fn csv_file_name(&self) -> &'static str {
        match self {
            City::Chicago => "chicago.csv",
            City::NewYorkCity => "new_york_city.csv",
            City::Washington => "washington.csv",
        }
    }

    /// Human-readable city name.
    pub fn display_name(&self) -> &'static str {
        match self {
            City::Chicago => "Chicago",
            City::NewYorkCity => "New York City",
            City::Washington => "Washington",
        }
    }
}

impl FromStr for City {
    type Err = ExploreError;

    /// Accepts the lowercase prompt vocabulary, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chicago" => Ok(City::Chicago),
            "new york city" => Ok(City::NewYorkCity),
            "washington" => Ok(City::Washington),
            other => Err(ExploreError::UnknownCity(other.to_string())),
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ── FilterSpec ────────────────────────────────────────────────────────────────

/// A validated-vocabulary filter selection for one exploration run.
///
/// `month` and `day` hold the user's lowercase selection or `"all"` when the
/// dimension was not requested. The loader maps them to concrete filters and
/// rejects anything outside [`MONTHS`] / [`DAYS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub city: City,
    pub month: String,
    pub day: String,
}

impl FilterSpec {
    /// A selection that keeps every trip for `city`.
    pub fn unfiltered(city: City) -> Self {
        FilterSpec {
            city,
            month: "all".to_string(),
            day: "all".to_string(),
        }
    }
}

/// Map a month-filter name to its 1-based index within [`MONTHS`].
///
/// `"all"` means no filter and maps to `None`. Names outside the vocabulary
/// are rejected.
pub fn month_index(month: &str) -> crate::error::Result<Option<u32>> {
    let needle = month.trim().to_lowercase();
    if needle == "all" {
        return Ok(None);
    }
    MONTHS
        .iter()
        .position(|&name| name == needle)
        .map(|i| Some(i as u32 + 1))
        .ok_or_else(|| ExploreError::InvalidFilter(format!("month '{month}' is not recognised")))
}

/// Validate a day-filter name and return its title-cased form.
///
/// `"all"` means no filter and maps to `None`.
pub fn day_title(day: &str) -> crate::error::Result<Option<String>> {
    let needle = day.trim().to_lowercase();
    if needle == "all" {
        return Ok(None);
    }
    if DAYS.contains(&needle.as_str()) {
        Ok(Some(title_case(&needle)))
    } else {
        Err(ExploreError::InvalidFilter(format!(
            "day '{day}' is not recognised"
        )))
    }
}

/// Render a derived month number (1-12) as its calendar name.
pub fn month_display(month: u32) -> String {
    CALENDAR_MONTHS
        .get(month.wrapping_sub(1) as usize)
        .map(|name| name.to_string())
        .unwrap_or_else(|| month.to_string())
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ── TripRecord ────────────────────────────────────────────────────────────────

/// One trip read from a city CSV, plus the calendar fields derived from its
/// start timestamp at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    /// When the trip started.
    pub start_time: NaiveDateTime,
    /// When the trip ended. The Washington export omits this column.
    pub end_time: Option<NaiveDateTime>,
    /// Trip length in whole seconds.
    pub trip_duration: u64,
    /// Name of the station the trip started from.
    pub start_station: String,
    /// Name of the station the trip ended at.
    pub end_station: String,
    /// Rider category ("Subscriber" / "Customer"); blank source fields are `None`.
    pub user_type: Option<String>,
    /// Rider gender, where the city records it.
    pub gender: Option<String>,
    /// Rider birth year, where the city records it.
    pub birth_year: Option<u32>,
    /// Calendar month (1-12) of `start_time`, derived at load.
    pub month: u32,
    /// Full weekday name of `start_time`, derived at load.
    pub day_of_week: String,
}

impl TripRecord {
    /// Hour component (0-23) of the start timestamp.
    pub fn start_hour(&self) -> u32 {
        self.start_time.hour()
    }
}

// ── TripTable ─────────────────────────────────────────────────────────────────

/// Which optional demographic columns the source CSV actually carries.
///
/// Detected once from the header at load time, so that a structurally absent
/// column is distinguishable from one that is present but empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnPresence {
    pub gender: bool,
    pub birth_year: bool,
}

/// An ordered collection of trips for one city, in source-file order.
#[derive(Debug, Clone, Default)]
pub struct TripTable {
    pub records: Vec<TripRecord>,
    pub columns: ColumnPresence,
}

impl TripTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keep only trips whose derived month equals `month` (1-based).
    ///
    /// Selection never mutates a record; survivors keep their original order.
    pub fn filter_by_month(&self, month: u32) -> TripTable {
        TripTable {
            records: self
                .records
                .iter()
                .filter(|r| r.month == month)
                .cloned()
                .collect(),
            columns: self.columns,
        }
    }

    /// Keep only trips whose derived weekday matches `day` exactly
    /// (title-cased, e.g. `"Monday"`).
    pub fn filter_by_day(&self, day: &str) -> TripTable {
        TripTable {
            records: self
                .records
                .iter()
                .filter(|r| r.day_of_week == day)
                .cloned()
                .collect(),
            columns: self.columns,
        }
    }

    /// A window of up to `size` rows starting at `offset`, in table order.
    ///
    /// Requests past the end yield an empty slice, never an error.
    pub fn window(&self, offset: usize, size: usize) -> &[TripRecord] {
        if offset >= self.records.len() {
            return &[];
        }
        let end = usize::min(offset + size, self.records.len());
        &self.records[offset..end]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn trip(start: &str, duration: u64) -> TripRecord {
        let start_time = NaiveDateTime::parse_from_str(start, "%Y-%m-%d %H:%M:%S").unwrap();
        TripRecord {
            start_time,
            end_time: None,
            trip_duration: duration,
            start_station: "A".to_string(),
            end_station: "B".to_string(),
            user_type: Some("Subscriber".to_string()),
            gender: None,
            birth_year: None,
            month: start_time.month(),
            day_of_week: start_time.format("%A").to_string(),
        }
    }

    // ── City ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_city_from_str_accepts_vocabulary() {
        assert_eq!("chicago".parse::<City>().unwrap(), City::Chicago);
        assert_eq!("new york city".parse::<City>().unwrap(), City::NewYorkCity);
        assert_eq!("washington".parse::<City>().unwrap(), City::Washington);
    }

    #[test]
    fn test_city_from_str_case_insensitive() {
        assert_eq!("Chicago".parse::<City>().unwrap(), City::Chicago);
        assert_eq!("  WASHINGTON ".parse::<City>().unwrap(), City::Washington);
    }

    #[test]
    fn test_city_from_str_unknown() {
        let err = "boston".parse::<City>().unwrap_err();
        assert!(matches!(err, ExploreError::UnknownCity(ref c) if c == "boston"));
    }

    #[test]
    fn test_city_csv_file_names() {
        assert_eq!(City::Chicago.csv_file_name(), "chicago.csv");
        assert_eq!(City::NewYorkCity.csv_file_name(), "new_york_city.csv");
        assert_eq!(City::Washington.csv_file_name(), "washington.csv");
    }

    #[test]
    fn test_city_display() {
        assert_eq!(City::NewYorkCity.to_string(), "New York City");
    }

    // ── month_index ───────────────────────────────────────────────────────────

    #[test]
    fn test_month_index_all_is_none() {
        assert_eq!(month_index("all").unwrap(), None);
    }

    #[test]
    fn test_month_index_maps_vocabulary() {
        assert_eq!(month_index("january").unwrap(), Some(1));
        assert_eq!(month_index("june").unwrap(), Some(6));
    }

    #[test]
    fn test_month_index_case_insensitive() {
        assert_eq!(month_index("February").unwrap(), Some(2));
    }

    #[test]
    fn test_month_index_outside_vocabulary() {
        // July exists on the calendar but not in the dataset range.
        let err = month_index("july").unwrap_err();
        assert!(matches!(err, ExploreError::InvalidFilter(_)));
    }

    // ── day_title ─────────────────────────────────────────────────────────────

    #[test]
    fn test_day_title_all_is_none() {
        assert_eq!(day_title("all").unwrap(), None);
    }

    #[test]
    fn test_day_title_title_cases() {
        assert_eq!(day_title("monday").unwrap(), Some("Monday".to_string()));
        assert_eq!(day_title("SUNDAY").unwrap(), Some("Sunday".to_string()));
    }

    #[test]
    fn test_day_title_outside_vocabulary() {
        let err = day_title("someday").unwrap_err();
        assert!(matches!(err, ExploreError::InvalidFilter(_)));
    }

    // ── month_display ─────────────────────────────────────────────────────────

    #[test]
    fn test_month_display_names() {
        assert_eq!(month_display(1), "January");
        assert_eq!(month_display(6), "June");
        assert_eq!(month_display(12), "December");
    }

    #[test]
    fn test_month_display_out_of_range_falls_back_to_number() {
        assert_eq!(month_display(0), "0");
        assert_eq!(month_display(13), "13");
    }

    // ── FilterSpec ────────────────────────────────────────────────────────────

    #[test]
    fn test_filter_spec_unfiltered() {
        let spec = FilterSpec::unfiltered(City::Chicago);
        assert_eq!(spec.month, "all");
        assert_eq!(spec.day, "all");
    }

    // ── TripRecord ────────────────────────────────────────────────────────────

    #[test]
    fn test_trip_record_start_hour() {
        let r = trip("2017-01-01 08:30:00", 100);
        assert_eq!(r.start_hour(), 8);
    }

    // ── TripTable filtering ───────────────────────────────────────────────────

    fn sample_table() -> TripTable {
        TripTable {
            records: vec![
                trip("2017-01-02 08:00:00", 100), // January, Monday
                trip("2017-01-03 09:00:00", 200), // January, Tuesday
                trip("2017-02-06 10:00:00", 300), // February, Monday
            ],
            columns: ColumnPresence {
                gender: true,
                birth_year: false,
            },
        }
    }

    #[test]
    fn test_filter_by_month_selects_subset_in_order() {
        let table = sample_table();
        let jan = table.filter_by_month(1);
        assert_eq!(jan.len(), 2);
        assert_eq!(jan.records[0].trip_duration, 100);
        assert_eq!(jan.records[1].trip_duration, 200);
    }

    #[test]
    fn test_filter_by_month_is_idempotent() {
        let table = sample_table();
        let once = table.filter_by_month(2);
        let twice = once.filter_by_month(2);
        assert_eq!(once.records, twice.records);
    }

    #[test]
    fn test_filter_by_day_exact_match() {
        let table = sample_table();
        let mondays = table.filter_by_day("Monday");
        assert_eq!(mondays.len(), 2);
        assert!(mondays.records.iter().all(|r| r.day_of_week == "Monday"));
    }

    #[test]
    fn test_filters_preserve_column_presence() {
        let table = sample_table();
        let filtered = table.filter_by_month(1).filter_by_day("Monday");
        assert_eq!(filtered.columns, table.columns);
    }

    #[test]
    fn test_filter_combination() {
        let table = sample_table();
        let feb_mondays = table.filter_by_month(2).filter_by_day("Monday");
        assert_eq!(feb_mondays.len(), 1);
        assert_eq!(feb_mondays.records[0].trip_duration, 300);
    }

    // ── TripTable::window ─────────────────────────────────────────────────────

    #[test]
    fn test_window_first_page() {
        let table = sample_table();
        let page = table.window(0, 2);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].trip_duration, 100);
    }

    #[test]
    fn test_window_partial_last_page() {
        let table = sample_table();
        let page = table.window(2, 5);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].trip_duration, 300);
    }

    #[test]
    fn test_window_past_end_is_empty() {
        let table = sample_table();
        assert!(table.window(3, 5).is_empty());
        assert!(table.window(100, 5).is_empty());
    }

    #[test]
    fn test_window_on_empty_table() {
        let table = TripTable::default();
        assert!(table.window(0, 5).is_empty());
    }
}
