use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Error, Result};
use chrono::{Datelike, Months, NaiveDate};
use log::warn;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::input::{deserialize_amount, parse_amount, sanitize_amount};
use crate::time::days_in_month;

/// A calendar month. Written as `YYYY-MM`; `YYYY-M` is accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey(NaiveDate);

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(MonthKey)
            .ok_or_else(|| anyhow!("Invalid month: {}-{}", year, month))
    }

    pub fn of(date: NaiveDate) -> Self {
        MonthKey(date.with_day(1).unwrap_or(date))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn days(&self) -> u32 {
        days_in_month(self.year(), self.month())
    }

    pub fn contains_day(&self, day: u32) -> bool {
        (1..=self.days()).contains(&day)
    }

    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        self.0.with_day(day)
    }

    pub fn next(&self) -> Option<Self> {
        self.0.checked_add_months(Months::new(1)).map(MonthKey)
    }

    pub fn previous(&self) -> Option<Self> {
        self.0.checked_sub_months(Months::new(1)).map(MonthKey)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for MonthKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| anyhow!("Invalid month key '{}', expected YYYY-MM", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| anyhow!("Invalid year in month key '{}'", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| anyhow!("Invalid month in month key '{}'", s))?;
        MonthKey::new(year, month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Volume and unit price recorded for one day. `cost` is the price per unit
/// of volume; the day's spend is [`DayEntry::total`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct DayEntry {
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub volume: f64,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub cost: f64,
}

impl DayEntry {
    pub const ZERO: DayEntry = DayEntry { volume: 0.0, cost: 0.0 };

    pub fn new(volume: f64, cost: f64) -> Self {
        Self {
            volume: sanitize_amount(volume),
            cost: sanitize_amount(cost),
        }
    }

    pub fn from_input(volume: &str, cost: &str) -> Self {
        Self {
            volume: parse_amount(volume),
            cost: parse_amount(cost),
        }
    }

    pub fn sanitized(self) -> Self {
        Self::new(self.volume, self.cost)
    }

    pub fn total(&self) -> f64 {
        self.volume * self.cost
    }
}

/// Day number (1-based) to entry.
pub type MonthEntries = BTreeMap<u32, DayEntry>;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotals {
    pub total_volume: f64,
    pub total_cost: f64,
}

impl MonthTotals {
    pub fn of(entries: &MonthEntries) -> Self {
        entries.values().fold(Self::default(), |acc, e| Self {
            total_volume: acc.total_volume + e.volume,
            total_cost: acc.total_cost + e.total(),
        })
    }
}

/// Every recorded month. Serialized as `{ "YYYY-MM": { "<day>": entry } }`.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct CalendarData {
    months: BTreeMap<MonthKey, MonthEntries>,
}

impl CalendarData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, month: MonthKey) -> Option<&MonthEntries> {
        self.months.get(&month)
    }

    /// Replaces the month's entry set. Days outside the month are dropped.
    pub fn set(&mut self, month: MonthKey, entries: MonthEntries) {
        let entries = entries
            .into_iter()
            .filter(|(day, _)| {
                let valid = month.contains_day(*day);
                if !valid {
                    warn!("Dropping day {} outside of {}", day, month);
                }
                valid
            })
            .map(|(day, entry)| (day, entry.sanitized()))
            .collect();
        self.months.insert(month, entries);
    }

    /// Writes a single day, leaving the rest of the month alone.
    pub fn set_day(&mut self, month: MonthKey, day: u32, entry: DayEntry) -> Result<()> {
        if !month.contains_day(day) {
            bail!("Day {} does not exist in {}", day, month);
        }
        self.months
            .entry(month)
            .or_default()
            .insert(day, entry.sanitized());
        Ok(())
    }

    pub fn month_keys(&self) -> impl Iterator<Item = MonthKey> + '_ {
        self.months.keys().copied()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&MonthKey, &mut MonthEntries)> + '_ {
        self.months.iter_mut()
    }

    pub fn totals(&self, month: MonthKey) -> MonthTotals {
        self.get(month).map(MonthTotals::of).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    fn from_raw(raw: BTreeMap<String, BTreeMap<String, Value>>) -> Self {
        let mut plain = Vec::new();
        let mut dated = Vec::new();

        for (month_str, days) in raw {
            let month = match month_str.parse::<MonthKey>() {
                Ok(month) => month,
                Err(err) => {
                    warn!("Skipping calendar month '{}': {}", month_str, err);
                    continue;
                }
            };
            let mut parsed = Vec::new();
            for (day_str, value) in days {
                let entry = match DayEntry::deserialize(value) {
                    Ok(entry) => entry,
                    Err(err) => {
                        warn!("Skipping entry {} in {}: {}", day_str, month, err);
                        continue;
                    }
                };
                if let Ok(day) = day_str.trim().parse::<u32>() {
                    parsed.push((day, entry));
                } else if let Some(date) = parse_date_key(&day_str) {
                    dated.push((MonthKey::of(date), date.day(), entry));
                } else {
                    warn!("Skipping unrecognized day key '{}' in {}", day_str, month);
                }
            }
            plain.push((month, parsed));
        }

        let mut data = CalendarData::new();
        for (month, entries) in plain {
            let slot = data.months.entry(month).or_default();
            for (day, entry) in entries {
                insert_checked(slot, month, day, entry);
            }
        }
        // Full-date keys were written by the newer code paths, so they win.
        for (month, day, entry) in dated {
            let slot = data.months.entry(month).or_default();
            insert_checked(slot, month, day, entry);
        }
        data
    }
}

fn insert_checked(slot: &mut MonthEntries, month: MonthKey, day: u32, entry: DayEntry) {
    if month.contains_day(day) {
        slot.insert(day, entry);
    } else {
        warn!("Skipping day {} outside of {}", day, month);
    }
}

/// `YYYY-MM-DD`, with or without zero padding.
fn parse_date_key(s: &str) -> Option<NaiveDate> {
    let mut parts = s.trim().splitn(3, '-');
    let year = parts.next()?.parse().ok()?;
    let month = parts.next()?.parse().ok()?;
    let day = parts.next()?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

impl<'de> Deserialize<'de> for CalendarData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = BTreeMap::<String, BTreeMap<String, Value>>::deserialize(deserializer)?;
        Ok(CalendarData::from_raw(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn march() -> MonthKey {
        MonthKey::new(2024, 3).unwrap()
    }

    #[test]
    fn test_month_key_format_and_parse() {
        assert_eq!(march().to_string(), "2024-03");
        assert_eq!("2024-3".parse::<MonthKey>().unwrap(), march());
        assert_eq!("2024-03".parse::<MonthKey>().unwrap(), march());
        assert!("2024-13".parse::<MonthKey>().is_err());
        assert!("2024".parse::<MonthKey>().is_err());
        assert!("abc-01".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_month_key_ordering() {
        let feb = MonthKey::new(2024, 2).unwrap();
        let dec = MonthKey::new(2023, 12).unwrap();
        assert!(dec < feb);
        assert!(feb < march());
        assert_eq!(MonthKey::new(2023, 12).unwrap().next(), Some(MonthKey::new(2024, 1).unwrap()));
        assert_eq!(MonthKey::new(2024, 1).unwrap().previous(), Some(dec));
    }

    #[test]
    fn test_totals() {
        let mut entries = MonthEntries::new();
        entries.insert(1, DayEntry::new(2.0, 10.0));
        entries.insert(2, DayEntry::new(1.0, 12.0));
        entries.insert(3, DayEntry::new(0.0, 5.0));

        let totals = MonthTotals::of(&entries);
        assert_eq!(totals.total_volume, 3.0);
        assert_eq!(totals.total_cost, 32.0);
    }

    #[test]
    fn test_set_day_keeps_other_days() {
        let mut data = CalendarData::new();
        data.set_day(march(), 1, DayEntry::new(1.0, 2.0)).unwrap();
        data.set_day(march(), 2, DayEntry::new(3.0, 4.0)).unwrap();

        let month = data.get(march()).unwrap();
        assert_eq!(month.len(), 2);
        assert_eq!(month[&1], DayEntry::new(1.0, 2.0));

        assert!(data.set_day(march(), 32, DayEntry::ZERO).is_err());
        assert!(data.set_day(march(), 0, DayEntry::ZERO).is_err());
        assert_eq!(data.get(march()).unwrap().len(), 2);
    }

    #[test]
    fn test_set_sanitizes_and_drops_invalid_days() {
        let mut entries = MonthEntries::new();
        entries.insert(1, DayEntry { volume: f64::NAN, cost: -3.0 });
        entries.insert(40, DayEntry::new(1.0, 1.0));

        let mut data = CalendarData::new();
        data.set(march(), entries);

        let month = data.get(march()).unwrap();
        assert_eq!(month.len(), 1);
        assert_eq!(month[&1], DayEntry::ZERO);
    }

    #[test]
    fn test_serialize_canonical_keys() {
        let mut data = CalendarData::new();
        data.set_day(march(), 5, DayEntry::new(2.0, 10.0)).unwrap();

        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(json, r#"{"2024-03":{"5":{"volume":2.0,"cost":10.0}}}"#);
    }

    #[test]
    fn test_legacy_keys_are_normalized() {
        let json = r#"{
            "2024-3": {
                "1": { "volume": 1, "cost": 2 },
                "2": { "volume": 9, "cost": 9 },
                "2024-03-02": { "volume": 3, "cost": 4 },
                "2024-04-07": { "volume": "5", "cost": "x" },
                "31": { "volume": 1, "cost": 1 },
                "32": { "volume": 1, "cost": 1 },
                "junk": { "volume": 1, "cost": 1 }
            },
            "not-a-month": { "1": { "volume": 1, "cost": 1 } }
        }"#;
        let data: CalendarData = serde_json::from_str(json).unwrap();

        let mar = data.get(march()).unwrap();
        assert_eq!(mar.len(), 3);
        assert_eq!(mar[&1], DayEntry::new(1.0, 2.0));
        assert_eq!(mar[&2], DayEntry::new(3.0, 4.0));
        assert_eq!(mar[&31], DayEntry::new(1.0, 1.0));

        let apr = data.get(MonthKey::new(2024, 4).unwrap()).unwrap();
        assert_eq!(apr[&7], DayEntry::new(5.0, 0.0));
        assert_eq!(data.len(), 2);
    }
}
