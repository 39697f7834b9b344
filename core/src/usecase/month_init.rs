use chrono::NaiveDate;

use crate::model::calendar::{DayEntry, MonthEntries, MonthKey};
use crate::model::settings::{ApplyTo, Settings};

/// Default entry for a day that has never been recorded.
///
/// Under [`ApplyTo::Future`] days before `today` get [`DayEntry::ZERO`], since
/// the current defaults did not exist when those days happened.
pub fn initial_entry(date: NaiveDate, today: NaiveDate, settings: &Settings) -> DayEntry {
    match settings.apply_to {
        ApplyTo::Future if date < today => DayEntry::ZERO,
        _ => settings.default_entry(),
    }
}

/// Returns the full entry set for a month that has nothing recorded yet, or
/// `None` if `existing` holds any entry. Recorded days are never replaced.
pub fn initialize_month(
    month: MonthKey,
    existing: Option<&MonthEntries>,
    settings: &Settings,
    today: NaiveDate,
) -> Option<MonthEntries> {
    if existing.is_some_and(|entries| !entries.is_empty()) {
        return None;
    }

    let entries: MonthEntries = (1..=month.days())
        .filter_map(|day| {
            let date = month.date(day)?;
            Some((day, initial_entry(date, today, settings)))
        })
        .collect();

    if entries.is_empty() {
        None
    } else {
        Some(entries)
    }
}
