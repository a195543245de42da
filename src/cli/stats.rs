use std::fmt::Display;

use ansi_term::{Colour, Style};
use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};

use crate::{
    app::AppState,
    core::{
        aggregate::{self, Intensity},
        settings::Settings,
    },
    storage::blob_store::BlobStore,
    utils::{
        time::{date_to_key, date_to_readable},
        units::{format_count, format_units},
    },
};

use super::Args;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct AnchorCommand {
    #[arg(
        long = "date",
        short,
        help = "Anchor date. Examples are \"yesterday\", \"15/03/2025\""
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

/// Width of the weekly bars in characters.
const BAR_WIDTH: usize = 24;
/// Scale floor so a quiet week still renders proportionate bars.
const BAR_SCALE_FLOOR: u64 = 5;

/// A conversion rate at or above this makes the raw tap cutoffs meaningless
/// for the heatmap, so days are classified by their converted value instead.
const LARGE_SCALE_RATE: f64 = 10.0;

/// Command to show today's tally without recording anything.
pub fn print_today(state: &AppState<impl BlobStore>) {
    println!("{}", date_to_readable(state.today()));
    println!("{}", format_count(state.todays_count(), state.settings()));
}

/// Command to print the weekly view: one bar per day for the seven days
/// ending at the anchor, then weekly and lifetime totals.
pub fn process_stats_command(
    command: AnchorCommand,
    state: &AppState<impl BlobStore>,
) -> Result<()> {
    let anchor = resolve_anchor(command)?;
    let store = state.store();
    let settings = state.settings();

    let week = aggregate::last_n_days(anchor, 7);
    let max = week
        .iter()
        .map(|&date| store.get(date))
        .max()
        .unwrap_or(0)
        .max(BAR_SCALE_FLOOR);

    println!("Last 7 days");
    for &date in &week {
        let count = store.get(date);
        let line = format!(
            "{} {}  {:<bar_width$} {}",
            date.format("%a"),
            date_to_key(date),
            bar(count, max),
            format_count(count, settings),
            bar_width = BAR_WIDTH,
        );
        let style = if date == state.today() {
            Colour::Blue.bold()
        } else {
            Style::default()
        };
        println!("  {}", style.paint(line));
    }

    println!();
    println!(
        "Week total     {}",
        store.range_total(week.iter().copied())
    );
    println!("Lifetime taps  {}", store.lifetime_total());
    if settings.enable_conversion {
        println!(
            "Lifetime {}  {}",
            settings.conversion_label,
            format_units(aggregate::convert(store.lifetime_total(), settings))
        );
    }
    Ok(())
}

/// Command to print a month as a weekday-aligned heatmap. Day cells are
/// colored by intensity; today is underlined.
pub fn process_month_command(
    command: AnchorCommand,
    state: &AppState<impl BlobStore>,
) -> Result<()> {
    let anchor = resolve_anchor(command)?;
    let grid = aggregate::month_grid(anchor);
    let store = state.store();
    let settings = state.settings();

    println!("{}", anchor.format("%B %Y"));
    println!("Su Mo Tu We Th Fr Sa");

    let mut row = String::new();
    for _ in 0..grid.first_weekday_offset {
        row.push_str("   ");
    }
    for day in 1..=grid.days_in_month {
        let date = anchor.with_day(day).expect("day is within the month");
        let style = day_style(store.get(date), settings, date == state.today());
        row.push_str(&style.paint(format!("{day:>2}")).to_string());
        row.push(' ');
        if (grid.first_weekday_offset + day) % 7 == 0 {
            println!("{}", row.trim_end());
            row.clear();
        }
    }
    if !row.trim_end().is_empty() {
        println!("{}", row.trim_end());
    }

    println!();
    let month_total = store.range_total(aggregate::month_days(anchor));
    println!("Month total  {}", format_count(month_total, settings));
    Ok(())
}

/// Also provides the default anchor, which is simply today.
fn resolve_anchor(AnchorCommand { date, date_style }: AnchorCommand) -> Result<NaiveDate> {
    let Some(raw) = date else {
        return Ok(Local::now().date_naive());
    };
    match parse_date_string(&raw, Local::now(), date_style.into()) {
        Ok(v) => Ok(v.date_naive()),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {e}"),
            )
            .into()),
    }
}

fn bar(count: u64, max: u64) -> String {
    if count == 0 {
        return String::new();
    }
    let filled = ((count as f64 / max as f64) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(filled.clamp(1, BAR_WIDTH))
}

fn day_intensity(count: u64, settings: &Settings) -> Intensity {
    if settings.enable_conversion && settings.conversion_rate >= LARGE_SCALE_RATE {
        aggregate::bucket(
            aggregate::convert(count, settings) as u64,
            aggregate::CONVERTED_THRESHOLDS,
        )
    } else {
        aggregate::bucket(count, aggregate::TAP_THRESHOLDS)
    }
}

fn day_style(count: u64, settings: &Settings, is_today: bool) -> Style {
    let style = match day_intensity(count, settings) {
        Intensity::None => Colour::Fixed(240).normal(),
        Intensity::Low => Colour::Fixed(31).normal(),
        Intensity::Medium => Colour::Fixed(39).normal(),
        Intensity::High => Colour::Fixed(15).on(Colour::Fixed(33)),
    };
    if is_today {
        style.underline()
    } else {
        style
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{
        aggregate::Intensity,
        settings::{Settings, SettingsPatch},
    };

    use super::{bar, day_intensity, BAR_WIDTH};

    #[test]
    fn bars_scale_against_the_maximum() {
        assert_eq!(bar(0, 10), "");
        assert_eq!(bar(10, 10).len(), BAR_WIDTH);
        assert_eq!(bar(5, 10).len(), BAR_WIDTH / 2);
    }

    #[test]
    fn tiny_counts_still_show_a_sliver() {
        assert_eq!(bar(1, 1000).len(), 1);
    }

    #[test]
    fn heatmap_classifies_converted_values_on_large_scales() {
        // Default rate is 14, so 20 taps are 280 converted units.
        let settings = Settings::default();
        assert_eq!(day_intensity(20, &settings), Intensity::Low);
        assert_eq!(day_intensity(200, &settings), Intensity::Medium);

        let raw = settings.update(SettingsPatch {
            enable_conversion: Some(false),
            ..Default::default()
        });
        assert_eq!(day_intensity(20, &raw), Intensity::Medium);
        assert_eq!(day_intensity(21, &raw), Intensity::High);
    }
}
