//! Plain-text rendering of the statistic reports.
//!
//! Every function returns a `String` so the session loop (and the tests)
//! can route output through any `Write`. Each report block ends with the
//! 40-dash separator the prompts use as a visual break.

use bikeshare_core::error::ExploreError;
use bikeshare_core::formatting::{format_count, format_elapsed};
use bikeshare_core::models::{month_display, TripRecord};
use bikeshare_data::analysis::ExplorationMetadata;
use bikeshare_data::stats::{DurationStats, FieldSummary, StationStats, TimeStats, UserStats};

/// The visual break between prompt sections and reports.
pub fn separator() -> String {
    "-".repeat(40)
}

/// One-line summary of what an exploration loaded and matched.
pub fn exploration_summary(meta: &ExplorationMetadata) -> String {
    format!(
        "Loaded {} trips; {} match the current filter (load {}s, filter {}s).",
        format_count(meta.rows_loaded as u64),
        format_count(meta.rows_matching as u64),
        format_elapsed(meta.load_time_seconds),
        format_elapsed(meta.filter_time_seconds),
    )
}

/// Report header + body for the most frequent times of travel.
pub fn time_stats(stats: &TimeStats, elapsed: f64) -> String {
    let mut out = String::new();
    out.push_str("\nCalculating The Most Frequent Times of Travel...\n\n");
    out.push_str(&format!(
        "The most popular month is: {}\n",
        month_display(stats.popular_month)
    ));
    out.push_str(&format!(
        "The most popular day of the week is: {}\n",
        stats.popular_day
    ));
    out.push_str(&format!(
        "The most popular start hour is: {}\n",
        stats.popular_hour
    ));
    out.push_str(&footer(elapsed));
    out
}

/// Report for the most popular stations and trip combination.
pub fn station_stats(stats: &StationStats, elapsed: f64) -> String {
    let mut out = String::new();
    out.push_str("\nCalculating The Most Popular Stations and Trip...\n\n");
    out.push_str(&format!(
        "The most commonly used start station is: {}\n",
        stats.popular_start
    ));
    out.push_str(&format!(
        "The most commonly used end station is: {}\n",
        stats.popular_end
    ));
    out.push_str(&format!(
        "The most frequent combination of start and end stations is: {}\n",
        stats.trip_label()
    ));
    out.push_str(&footer(elapsed));
    out
}

/// Report for total and average trip duration.
pub fn duration_stats(stats: &DurationStats, elapsed: f64) -> String {
    let (hours, minutes, seconds) = stats.total_hms();
    let (avg_minutes, avg_seconds) = stats.average_ms();

    let mut out = String::new();
    out.push_str("\nCalculating Trip Duration...\n\n");
    out.push_str(&format!(
        "The total trip duration is {} hours, {} minutes and {} seconds.\n",
        format_count(hours),
        minutes,
        seconds
    ));
    out.push_str(&format!(
        "The average trip duration is {} minutes and {} seconds.\n",
        avg_minutes, avg_seconds
    ));
    out.push_str(&footer(elapsed));
    out
}

/// Report for rider demographics.
pub fn user_stats(stats: &UserStats, elapsed: f64) -> String {
    let mut out = String::new();
    out.push_str("\nCalculating User Stats...\n\n");

    out.push_str("Types of users:\n");
    out.push_str(&count_block(&stats.user_types));

    out.push('\n');
    match &stats.genders {
        FieldSummary::Present(counts) => {
            out.push_str("Gender breakdown:\n");
            out.push_str(&count_block(counts));
        }
        FieldSummary::Empty => {
            out.push_str("The Gender column holds no values for this filter.\n");
        }
        FieldSummary::NotRecorded => {
            out.push_str("Gender is not recorded in this dataset.\n");
        }
    }

    out.push('\n');
    match &stats.birth_years {
        FieldSummary::Present(years) => {
            out.push_str(&format!(
                "The earliest year of birth is: {}\n",
                years.earliest
            ));
            out.push_str(&format!(
                "The most recent year of birth is: {}\n",
                years.most_recent
            ));
            out.push_str(&format!(
                "The most common year of birth is: {}\n",
                years.most_common
            ));
        }
        FieldSummary::Empty => {
            out.push_str("The Birth Year column holds no values for this filter.\n");
        }
        FieldSummary::NotRecorded => {
            out.push_str("Birth years are not recorded in this dataset.\n");
        }
    }

    out.push_str(&footer(elapsed));
    out
}

/// Rendered when a statistic group cannot run (e.g. the filter matched
/// nothing). A normal outcome, not a crash.
pub fn nothing_to_report(title: &str, err: &ExploreError) -> String {
    format!("\nCalculating {}...\n\n{}.\n{}\n", title, err, separator())
}

/// A page of raw trip rows, one line per record, in table order.
pub fn raw_rows(rows: &[TripRecord]) -> String {
    let mut out = String::new();
    for record in rows {
        out.push_str(&format!(
            "{}  {:>7}s  {} -> {}  [{}]\n",
            record.start_time.format("%Y-%m-%d %H:%M:%S"),
            record.trip_duration,
            record.start_station,
            record.end_station,
            record.user_type.as_deref().unwrap_or("unknown"),
        ));
    }
    out
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn footer(elapsed: f64) -> String {
    format!(
        "\nThis took {} seconds.\n{}\n",
        format_elapsed(elapsed),
        separator()
    )
}

/// Indented `name  count` lines, names padded to a common width.
fn count_block(rows: &[(String, usize)]) -> String {
    let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (name, count) in rows {
        out.push_str(&format!(
            "  {:<width$}  {}\n",
            name,
            format_count(*count as u64),
            width = width
        ));
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use bikeshare_data::stats::BirthYearStats;
    use chrono::NaiveDateTime;

    #[test]
    fn test_separator_is_forty_dashes() {
        assert_eq!(separator().len(), 40);
        assert!(separator().chars().all(|c| c == '-'));
    }

    #[test]
    fn test_exploration_summary_counts() {
        let meta = ExplorationMetadata {
            generated_at: "2017-07-01T00:00:00+00:00".to_string(),
            rows_loaded: 1_500,
            rows_matching: 42,
            load_time_seconds: 0.25,
            filter_time_seconds: 0.001,
        };
        let line = exploration_summary(&meta);
        assert!(line.contains("1,500 trips"));
        assert!(line.contains("42 match"));
    }

    #[test]
    fn test_time_stats_renders_month_name() {
        let stats = TimeStats {
            popular_month: 2,
            popular_day: "Monday".to_string(),
            popular_hour: 8,
        };
        let text = time_stats(&stats, 0.001);
        assert!(text.contains("The most popular month is: February"));
        assert!(text.contains("The most popular day of the week is: Monday"));
        assert!(text.contains("The most popular start hour is: 8"));
        assert!(text.contains("This took 0.001 seconds."));
        assert!(text.contains(&separator()));
    }

    #[test]
    fn test_station_stats_renders_pair_with_and() {
        let stats = StationStats {
            popular_start: "Canal St".to_string(),
            popular_end: "State St".to_string(),
            popular_trip: ("Canal St".to_string(), "State St".to_string()),
        };
        let text = station_stats(&stats, 0.0);
        assert!(text.contains("start station is: Canal St"));
        assert!(text.contains("end station is: State St"));
        assert!(text.contains("start and end stations is: Canal St and State St"));
    }

    #[test]
    fn test_duration_stats_decomposition_in_text() {
        let stats = DurationStats {
            total_seconds: 3_661,
            average_seconds: 61,
        };
        let text = duration_stats(&stats, 0.0);
        assert!(text.contains("1 hours, 1 minutes and 1 seconds"));
        assert!(text.contains("1 minutes and 1 seconds."));
    }

    #[test]
    fn test_user_stats_full_demographics() {
        let stats = UserStats {
            user_types: vec![("Subscriber".to_string(), 2), ("Customer".to_string(), 1)],
            genders: FieldSummary::Present(vec![("Female".to_string(), 2)]),
            birth_years: FieldSummary::Present(BirthYearStats {
                earliest: 1956,
                most_recent: 2002,
                most_common: 1989,
            }),
        };
        let text = user_stats(&stats, 0.0);
        assert!(text.contains("Subscriber"));
        assert!(text.contains("Gender breakdown:"));
        assert!(text.contains("The earliest year of birth is: 1956"));
        assert!(text.contains("The most recent year of birth is: 2002"));
        assert!(text.contains("The most common year of birth is: 1989"));
    }

    #[test]
    fn test_user_stats_absent_demographics() {
        let stats = UserStats {
            user_types: vec![("Subscriber".to_string(), 1)],
            genders: FieldSummary::NotRecorded,
            birth_years: FieldSummary::NotRecorded,
        };
        let text = user_stats(&stats, 0.0);
        assert!(text.contains("Gender is not recorded in this dataset."));
        assert!(text.contains("Birth years are not recorded in this dataset."));
    }

    #[test]
    fn test_user_stats_empty_demographics_distinct_from_absent() {
        let stats = UserStats {
            user_types: vec![("Subscriber".to_string(), 1)],
            genders: FieldSummary::Empty,
            birth_years: FieldSummary::Empty,
        };
        let text = user_stats(&stats, 0.0);
        assert!(text.contains("The Gender column holds no values"));
        assert!(text.contains("The Birth Year column holds no values"));
    }

    #[test]
    fn test_nothing_to_report_mentions_cause() {
        let err = ExploreError::EmptyDataset("time statistics");
        let text = nothing_to_report("The Most Frequent Times of Travel", &err);
        assert!(text.contains("Calculating The Most Frequent Times of Travel..."));
        assert!(text.contains("No trips to aggregate for time statistics"));
    }

    #[test]
    fn test_raw_rows_one_line_per_record() {
        let start = NaiveDateTime::parse_from_str("2017-01-02 08:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        let record = TripRecord {
            start_time: start,
            end_time: None,
            trip_duration: 100,
            start_station: "Canal St".to_string(),
            end_station: "State St".to_string(),
            user_type: Some("Subscriber".to_string()),
            gender: None,
            birth_year: None,
            month: 1,
            day_of_week: "Monday".to_string(),
        };
        let text = raw_rows(&[record.clone(), record]);
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Canal St -> State St"));
        assert!(text.contains("[Subscriber]"));
    }

    #[test]
    fn test_raw_rows_empty_is_empty() {
        assert!(raw_rows(&[]).is_empty());
    }
}
