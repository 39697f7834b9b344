use std::fmt;
use std::str::FromStr;

use anyhow::{Error, Result};
use chrono::Weekday;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::input::{amount_from_value, expand_key, sanitize_amount};
use crate::model::calendar::DayEntry;

pub const KNOWN_UNITS: &[&str] = &["litre", "ounce"];

/// Currency codes offered by the settings screen and their display glyphs.
pub const KNOWN_CURRENCIES: &[(&str, &str)] = &[
    ("INR", "₹"),
    ("USD", "$"),
    ("GBP", "£"),
    ("EUR", "€"),
];

pub fn currency_symbol(code: &str) -> Option<&'static str> {
    KNOWN_CURRENCIES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code.trim()))
        .map(|(_, symbol)| *symbol)
}

/// Which days a change of defaults reaches. Also the policy the month
/// initializer uses for days before today.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ApplyTo {
    Future,
    CurrentAndFuture,
}

impl Default for ApplyTo {
    fn default() -> Self {
        ApplyTo::Future
    }
}

impl ApplyTo {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyTo::Future => "future",
            ApplyTo::CurrentAndFuture => "currentAndFuture",
        }
    }
}

impl fmt::Display for ApplyTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplyTo {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match expand_key(s, &["future", "currentAndFuture"])?.as_str() {
            "future" => Ok(ApplyTo::Future),
            _ => Ok(ApplyTo::CurrentAndFuture),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeekdayStart {
    Sunday,
    Monday,
}

impl Default for WeekdayStart {
    fn default() -> Self {
        WeekdayStart::Sunday
    }
}

impl WeekdayStart {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeekdayStart::Sunday => "sunday",
            WeekdayStart::Monday => "monday",
        }
    }

    pub fn first_weekday(&self) -> Weekday {
        match self {
            WeekdayStart::Sunday => Weekday::Sun,
            WeekdayStart::Monday => Weekday::Mon,
        }
    }
}

impl fmt::Display for WeekdayStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeekdayStart {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match expand_key(s, &["sunday", "monday"])?.as_str() {
            "sunday" => Ok(WeekdayStart::Sunday),
            _ => Ok(WeekdayStart::Monday),
        }
    }
}

/// Global defaults. Missing, null or unreadable fields in a stored record fall
/// back one by one to [`Settings::default`], so a loaded value is always complete.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub unit: String,
    pub default_volume: f64,
    pub cost_per_volume: f64,
    pub currency: String,
    pub currency_symbol: String,
    pub weekday_start: WeekdayStart,
    pub apply_to: ApplyTo,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            unit: "litre".to_string(),
            default_volume: 1.0,
            cost_per_volume: 1.0,
            currency: "INR".to_string(),
            currency_symbol: "₹".to_string(),
            weekday_start: WeekdayStart::default(),
            apply_to: ApplyTo::default(),
        }
    }
}

impl<'de> Deserialize<'de> for Settings {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let record = Map::<String, Value>::deserialize(deserializer)?;
        let mut settings = Settings::default();

        read_field(&record, "unit", &mut settings.unit);
        read_amount(&record, "defaultVolume", &mut settings.default_volume);
        read_amount(&record, "costPerVolume", &mut settings.cost_per_volume);
        read_field(&record, "currency", &mut settings.currency);
        read_field(&record, "currencySymbol", &mut settings.currency_symbol);
        read_field(&record, "weekdayStart", &mut settings.weekday_start);
        read_field(&record, "applyTo", &mut settings.apply_to);

        Ok(settings)
    }
}

fn read_field<T: DeserializeOwned>(record: &Map<String, Value>, name: &str, slot: &mut T) {
    match record.get(name) {
        None | Some(Value::Null) => {}
        Some(value) => match T::deserialize(value) {
            Ok(parsed) => *slot = parsed,
            Err(err) => warn!("Ignoring settings field '{}': {}", name, err),
        },
    }
}

/// Amounts follow the user-input rule: numbers or numeric text, anything else is `0`.
fn read_amount(record: &Map<String, Value>, name: &str, slot: &mut f64) {
    match record.get(name) {
        None | Some(Value::Null) => {}
        Some(value) => *slot = amount_from_value(value),
    }
}

impl Settings {
    /// Clamps amounts and fills a missing currency symbol for known codes.
    pub fn sanitized(mut self) -> Self {
        self.default_volume = sanitize_amount(self.default_volume);
        self.cost_per_volume = sanitize_amount(self.cost_per_volume);
        self.currency = self.currency.trim().to_uppercase();
        if self.currency_symbol.trim().is_empty() {
            if let Some(symbol) = currency_symbol(&self.currency) {
                self.currency_symbol = symbol.to_string();
            }
        }
        self
    }

    /// The entry a defaulted day receives.
    pub fn default_entry(&self) -> DayEntry {
        DayEntry::new(self.default_volume, self.cost_per_volume)
    }
}
