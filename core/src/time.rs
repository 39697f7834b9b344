use chrono::{Datelike, Local, NaiveDate};

use crate::model::calendar::MonthKey;
use crate::model::settings::WeekdayStart;

/// The local calendar date. Initialization and propagation both use this.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    (28..=31)
        .rev()
        .find(|&day| NaiveDate::from_ymd_opt(year, month, day).is_some())
        .unwrap_or(0)
}

/// Number of empty cells before day 1 in a week row that starts on `start`.
pub fn leading_blank_days(month: MonthKey, start: WeekdayStart) -> u32 {
    let weekday = month.first_day().weekday();
    match start {
        WeekdayStart::Sunday => weekday.num_days_from_sunday(),
        WeekdayStart::Monday => weekday.num_days_from_monday(),
    }
}
