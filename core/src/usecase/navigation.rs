use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::model::calendar::MonthKey;

/// Months the user can page through: every recorded month, plus the previous,
/// current and next one. Ascending, no duplicates.
pub fn navigable_months<I>(recorded: I, today: NaiveDate) -> Vec<MonthKey>
where
    I: IntoIterator<Item = MonthKey>,
{
    let current = MonthKey::of(today);
    let mut months: BTreeSet<MonthKey> = recorded.into_iter().collect();
    months.insert(current);
    months.extend(current.previous());
    months.extend(current.next());
    months.into_iter().collect()
}
