mod report;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use milktally_core::model::settings::KNOWN_UNITS;
use milktally_core::{expand_key, open_file_tracker, parse_amount, FileTracker, MonthKey};

#[derive(Parser)]
#[command(name = "milktally")]
#[command(about = "Track daily milk volume and cost", long_about = None)]
struct Cli {
    /// Directory holding settings.json and calendarData.json (default: $MILKTALLY_HOME or ~/.milktally)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show or change the default settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
    /// Show a month's entries, filling in defaults on first view
    Show {
        /// Month as YYYY-MM (default: current month)
        month: Option<String>,
        /// Lay the month out as a weekly calendar
        #[arg(long)]
        grid: bool,
    },
    /// Record the volume and unit price for one day
    Set {
        /// Month as YYYY-MM
        month: String,
        day: u32,
        volume: String,
        cost: String,
    },
    /// Print total volume and cost for a month
    Totals {
        /// Month as YYYY-MM (default: current month)
        month: Option<String>,
    },
    /// List the months available for browsing
    Months,
}

#[derive(clap::Subcommand)]
enum SettingsAction {
    /// Print the current settings
    Show,
    /// Change one or more settings and save them
    Set {
        /// Volume unit (litre, ounce)
        #[arg(long)]
        unit: Option<String>,
        /// Default daily volume
        #[arg(long)]
        volume: Option<String>,
        /// Default price per unit of volume
        #[arg(long)]
        cost: Option<String>,
        /// Currency code (INR, USD, GBP, EUR)
        #[arg(long)]
        currency: Option<String>,
        /// Currency symbol shown next to amounts
        #[arg(long)]
        symbol: Option<String>,
        /// First day of the week (sunday, monday)
        #[arg(long)]
        weekday_start: Option<String>,
        /// Which days the new defaults reach (future, currentAndFuture)
        #[arg(long)]
        apply_to: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut tracker = open_file_tracker(cli.data_dir)?;
    debug!("Loaded settings: {:?}", tracker.settings());

    match cli.command {
        Some(Commands::Settings { action }) => match action {
            Some(SettingsAction::Set {
                unit,
                volume,
                cost,
                currency,
                symbol,
                weekday_start,
                apply_to,
            }) => {
                let mut settings = tracker.settings().clone();
                if let Some(unit) = unit {
                    // Known units may be abbreviated; anything else is kept verbatim.
                    settings.unit = expand_key(&unit, KNOWN_UNITS).unwrap_or(unit);
                }
                if let Some(volume) = volume {
                    settings.default_volume = parse_amount(&volume);
                }
                if let Some(cost) = cost {
                    settings.cost_per_volume = parse_amount(&cost);
                }
                if let Some(currency) = currency {
                    settings.currency = currency;
                    // Let the known-currency table pick the glyph unless one is given.
                    settings.currency_symbol = String::new();
                }
                if let Some(symbol) = symbol {
                    settings.currency_symbol = symbol;
                }
                if let Some(weekday_start) = weekday_start {
                    settings.weekday_start = weekday_start.parse()?;
                }
                if let Some(apply_to) = apply_to {
                    settings.apply_to = apply_to.parse()?;
                }

                let touched = tracker.save_settings(settings)?;
                println!("Settings saved.");
                if !touched.is_empty() {
                    let names: Vec<String> = touched.iter().map(|m| m.to_string()).collect();
                    println!("Updated months: {}", names.join(", "));
                }
            }
            Some(SettingsAction::Show) | None => {
                report::show_settings(tracker.settings(), tracker.is_first_load());
            }
        },
        Some(Commands::Show { month, grid }) => {
            if !settings_saved(&tracker) {
                return Ok(());
            }
            let month = resolve_month(&tracker, month.as_deref())?;
            tracker.ensure_month_initialized(month)?;
            if let Some(entries) = tracker.month(month) {
                if grid {
                    report::show_grid(month, entries, tracker.settings());
                } else {
                    report::show_month(month, entries, tracker.settings());
                }
            }
            report::show_totals(month, &tracker.month_totals(month), tracker.settings());
        }
        Some(Commands::Set {
            month,
            day,
            volume,
            cost,
        }) => {
            if !settings_saved(&tracker) {
                return Ok(());
            }
            let month = resolve_month(&tracker, Some(&month))?;
            tracker.ensure_month_initialized(month)?;
            tracker.set_day_from_input(month, day, &volume, &cost)?;
            println!("Saved {} day {}.", month, day);
            report::show_totals(month, &tracker.month_totals(month), tracker.settings());
        }
        Some(Commands::Totals { month }) => {
            let month = resolve_month(&tracker, month.as_deref())?;
            report::show_totals(month, &tracker.month_totals(month), tracker.settings());
        }
        Some(Commands::Months) => {
            let current = MonthKey::of(tracker.today());
            report::show_months(&tracker.navigable_months(), current);
        }
        None => {
            report::show_settings(tracker.settings(), tracker.is_first_load());
        }
    }
    Ok(())
}

fn resolve_month(tracker: &FileTracker, month: Option<&str>) -> Result<MonthKey> {
    match month {
        Some(text) => text
            .parse::<MonthKey>()
            .with_context(|| format!("Could not read month '{}'", text)),
        None => Ok(MonthKey::of(tracker.today())),
    }
}

/// The calendar stays locked until the user has saved settings once.
fn settings_saved(tracker: &FileTracker) -> bool {
    if tracker.is_first_load() {
        println!("Monthly view is disabled until you save settings.");
        println!("Run `milktally settings set` first.");
        return false;
    }
    true
}
