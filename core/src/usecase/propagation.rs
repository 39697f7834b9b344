use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use log::debug;

use crate::model::calendar::{CalendarData, MonthKey};
use crate::model::settings::{ApplyTo, Settings};

/// Days of `month` that a settings change made on `today` rewrites.
///
/// Months before the current one are never touched. Later months are
/// rewritten whole. For the current month, [`ApplyTo::Future`] reaches only
/// the days after today, [`ApplyTo::CurrentAndFuture`] the whole month.
pub fn days_to_overwrite(
    today: NaiveDate,
    month: MonthKey,
    tenure: ApplyTo,
) -> Option<RangeInclusive<u32>> {
    let current = MonthKey::of(today);
    let last = month.days();

    if month < current {
        return None;
    }
    if month > current {
        return Some(1..=last);
    }

    let range = match tenure {
        ApplyTo::Future => (today.day() + 1)..=last,
        ApplyTo::CurrentAndFuture => 1..=last,
    };
    if range.is_empty() {
        None
    } else {
        Some(range)
    }
}

/// Rewrites every recorded month reached by `tenure` with the new defaults.
/// Months missing from `data` are not created. Returns the rewritten months.
pub fn propagate(
    data: &mut CalendarData,
    settings: &Settings,
    tenure: ApplyTo,
    today: NaiveDate,
) -> Vec<MonthKey> {
    let entry = settings.default_entry();
    let mut touched = Vec::new();

    for (month, entries) in data.iter_mut() {
        let Some(days) = days_to_overwrite(today, *month, tenure) else {
            continue;
        };
        debug!("Applying new defaults to {} days {:?}", month, days);
        for day in days {
            entries.insert(day, entry);
        }
        touched.push(*month);
    }

    touched
}
