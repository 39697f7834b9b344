pub mod config;
pub mod model;
pub mod repository;
pub mod input;
pub mod time;
pub mod service;
pub mod usecase;

pub use model::calendar::{CalendarData, DayEntry, MonthEntries, MonthKey, MonthTotals};
pub use model::settings::{ApplyTo, Settings, WeekdayStart};
pub use repository::{CalendarRepository, FileCalendarRepository, FileSettingsRepository, SettingsRepository};
pub use input::{expand_key, parse_amount};
pub use time::{days_in_month, leading_blank_days};
pub use service::tracker::Tracker;
pub use usecase::propagation::days_to_overwrite;

/// Tracker backed by the JSON files in the data directory.
pub type FileTracker = Tracker<FileSettingsRepository, FileCalendarRepository>;

/// Opens the file-backed tracker rooted at `base_dir` (see [`config::resolve_data_dir`]).
pub fn open_file_tracker(base_dir: Option<std::path::PathBuf>) -> anyhow::Result<FileTracker> {
    let dir = config::resolve_data_dir(base_dir)?;
    let settings = FileSettingsRepository::new(Some(dir.clone()))?;
    let calendar = FileCalendarRepository::new(Some(dir))?;
    Tracker::open(settings, calendar)
}
