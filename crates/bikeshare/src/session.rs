//! The interactive session loop.
//!
//! Collects a city/month/day selection, runs the exploration pipeline,
//! offers raw-row pagination, renders the four statistic groups and loops
//! until the user declines to restart. Reads from an injected [`BufRead`]
//! and writes to an injected [`Write`] so the whole flow is testable with
//! string buffers.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use bikeshare_core::models::{City, FilterSpec, TripTable, DAYS, MONTHS};
use bikeshare_data::analysis::{explore, Exploration};
use bikeshare_data::reader;
use bikeshare_data::stats::{DurationStats, StationStats, TimeStats, UserStats};
use tracing::{info, warn};

use crate::render;

// ── Session ───────────────────────────────────────────────────────────────────

pub struct Session<R: BufRead, W: Write> {
    input: R,
    output: W,
    data_dir: PathBuf,
    page_size: usize,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W, data_dir: PathBuf, page_size: usize) -> Self {
        Session {
            input,
            output,
            data_dir,
            page_size,
        }
    }

    /// Run session iterations until the user declines to restart (or the
    /// input stream ends).
    pub fn run(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "Hello! Let's explore some US bikeshare data!")?;

        loop {
            let Some(spec) = self.prompt_filters()? else {
                break;
            };

            info!(
                "Exploring {} (month={}, day={})",
                spec.city, spec.month, spec.day
            );

            // A load failure aborts only this iteration; the restart prompt
            // below hands control back to the user.
            match explore(&spec, &self.data_dir) {
                Ok(exploration) => {
                    self.page_raw_rows(&exploration.table)?;
                    write_reports(&mut self.output, &exploration)?;
                }
                Err(err) => {
                    warn!("exploration failed: {err}");
                    writeln!(self.output, "Could not load that dataset: {err}")?;
                    let available = reader::available_cities(&self.data_dir);
                    if !available.is_empty() {
                        let names: Vec<&str> =
                            available.iter().map(|c| c.display_name()).collect();
                        writeln!(
                            self.output,
                            "Datasets available here: {}",
                            names.join(", ")
                        )?;
                    }
                    writeln!(self.output, "{}", render::separator())?;
                }
            }

            if !self.prompt_yes("\nWould you like to restart? Enter yes or no.\n")? {
                break;
            }
        }

        Ok(())
    }

    // ── Prompts ───────────────────────────────────────────────────────────────

    /// Collect a full filter selection. Returns `None` when input ends.
    fn prompt_filters(&mut self) -> anyhow::Result<Option<FilterSpec>> {
        let city = loop {
            let Some(answer) =
                self.prompt("Would you like to see data for Chicago, New York City or Washington? ")?
            else {
                return Ok(None);
            };
            match answer.parse::<City>() {
                Ok(city) => break city,
                Err(_) => {
                    writeln!(
                        self.output,
                        "Invalid input. Please choose one of the listed cities."
                    )?;
                }
            }
        };

        let (month, day) = loop {
            let Some(kind) = self.prompt(
                "Would you like to filter the data by month, day, or \"none\" for no time filter? ",
            )?
            else {
                return Ok(None);
            };
            match kind.to_lowercase().as_str() {
                "month" => {
                    let Some(month) = self.prompt_month()? else {
                        return Ok(None);
                    };
                    let Some(day) = self.prompt_day()? else {
                        return Ok(None);
                    };
                    break (month, day);
                }
                "day" => {
                    let Some(day) = self.prompt_day()? else {
                        return Ok(None);
                    };
                    break ("all".to_string(), day);
                }
                "none" => break ("all".to_string(), "all".to_string()),
                _ => {
                    writeln!(self.output, "Invalid answer. Please try again.")?;
                }
            }
        };

        writeln!(self.output, "{}", render::separator())?;
        Ok(Some(FilterSpec { city, month, day }))
    }

    fn prompt_month(&mut self) -> anyhow::Result<Option<String>> {
        loop {
            let Some(answer) =
                self.prompt("Which month - January, February, March, April, May, or June? ")?
            else {
                return Ok(None);
            };
            let lower = answer.to_lowercase();
            if MONTHS.contains(&lower.as_str()) {
                return Ok(Some(lower));
            }
            writeln!(self.output, "Please choose one of the listed months.")?;
        }
    }

    fn prompt_day(&mut self) -> anyhow::Result<Option<String>> {
        loop {
            let Some(answer) = self.prompt(
                "Which day - Monday, Tuesday, Wednesday, Thursday, Friday, Saturday, or Sunday? ",
            )?
            else {
                return Ok(None);
            };
            let lower = answer.to_lowercase();
            if DAYS.contains(&lower.as_str()) {
                return Ok(Some(lower));
            }
            writeln!(self.output, "Please choose one of the listed days.")?;
        }
    }

    /// Show `message`, read one trimmed line. `None` means end of input.
    fn prompt(&mut self, message: &str) -> anyhow::Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// A yes/no prompt; anything other than "yes" (and end of input) is no.
    fn prompt_yes(&mut self, message: &str) -> anyhow::Result<bool> {
        match self.prompt(message)? {
            Some(answer) => Ok(answer.eq_ignore_ascii_case("yes")),
            None => Ok(false),
        }
    }

    // ── Raw-row pagination ────────────────────────────────────────────────────

    /// Offer windows of raw rows, advancing by `page_size` per request.
    /// Requests past the end of the table report an empty window and stop.
    fn page_raw_rows(&mut self, table: &TripTable) -> anyhow::Result<()> {
        let mut offset = 0;
        let mut question = format!(
            "Would you like to view {} rows of individual trip data? Enter yes or no: ",
            self.page_size
        );

        loop {
            if !self.prompt_yes(&question)? {
                break;
            }
            let page = table.window(offset, self.page_size);
            if page.is_empty() {
                writeln!(self.output, "No more raw data to display.")?;
                break;
            }
            write!(self.output, "{}", render::raw_rows(page))?;
            offset += self.page_size;
            question = "Do you wish to view more raw data? Enter yes or no: ".to_string();
        }

        writeln!(self.output, "{}", render::separator())?;
        Ok(())
    }
}

// ── Reports ───────────────────────────────────────────────────────────────────

/// Render all four statistic groups for one exploration.
///
/// Each group runs independently: a group that cannot be computed (an empty
/// filtered table) reports "nothing" while the remaining groups still run.
pub fn write_reports<W: Write>(out: &mut W, exploration: &Exploration) -> anyhow::Result<()> {
    let table = &exploration.table;
    writeln!(out, "{}", render::exploration_summary(&exploration.metadata))?;

    let start = Instant::now();
    match TimeStats::from_table(table) {
        Ok(stats) => write!(out, "{}", render::time_stats(&stats, elapsed(start)))?,
        Err(err) => write!(
            out,
            "{}",
            render::nothing_to_report("The Most Frequent Times of Travel", &err)
        )?,
    }

    let start = Instant::now();
    match StationStats::from_table(table) {
        Ok(stats) => write!(out, "{}", render::station_stats(&stats, elapsed(start)))?,
        Err(err) => write!(
            out,
            "{}",
            render::nothing_to_report("The Most Popular Stations and Trip", &err)
        )?,
    }

    let start = Instant::now();
    match DurationStats::from_table(table) {
        Ok(stats) => write!(out, "{}", render::duration_stats(&stats, elapsed(start)))?,
        Err(err) => write!(
            out,
            "{}",
            render::nothing_to_report("Trip Duration", &err)
        )?,
    }

    let start = Instant::now();
    match UserStats::from_table(table) {
        Ok(stats) => write!(out, "{}", render::user_stats(&stats, elapsed(start)))?,
        Err(err) => write!(out, "{}", render::nothing_to_report("User Stats", &err))?,
    }

    Ok(())
}

fn elapsed(start: Instant) -> f64 {
    start.elapsed().as_secs_f64()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
