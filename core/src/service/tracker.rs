use anyhow::Result;
use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::model::calendar::{CalendarData, DayEntry, MonthEntries, MonthKey, MonthTotals};
use crate::model::settings::{ApplyTo, Settings};
use crate::repository::{CalendarRepository, SettingsRepository};
use crate::time;
use crate::usecase::month_init::initialize_month;
use crate::usecase::navigation::navigable_months;
use crate::usecase::propagation::propagate;

/// Owns the settings and calendar for one installation.
///
/// Every mutation lands in memory first and is then written through to the
/// matching repository. If that write fails the error is returned, but the
/// in-memory state keeps the change and stays authoritative for the session.
pub struct Tracker<S: SettingsRepository, C: CalendarRepository> {
    settings_repo: S,
    calendar_repo: C,
    settings: Settings,
    calendar: CalendarData,
    first_load: bool,
    clock: fn() -> NaiveDate,
}

impl<S: SettingsRepository, C: CalendarRepository> Tracker<S, C> {
    /// Loads both records. A missing settings record means first load.
    pub fn open(settings_repo: S, calendar_repo: C) -> Result<Self> {
        let stored = settings_repo.load()?;
        let first_load = stored.is_none();
        let settings = stored.unwrap_or_default();
        let calendar = calendar_repo.load()?.unwrap_or_default();
        debug!(
            "Opened tracker: first_load={}, {} month(s) recorded",
            first_load,
            calendar.len()
        );

        Ok(Self {
            settings_repo,
            calendar_repo,
            settings,
            calendar,
            first_load,
            clock: time::today,
        })
    }

    /// Replaces the source of "today".
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn calendar(&self) -> &CalendarData {
        &self.calendar
    }

    pub fn is_first_load(&self) -> bool {
        self.first_load
    }

    /// Stores `settings` as the new defaults. The very first save only ends
    /// first load; every later one propagates using the new `apply_to`.
    /// Returns the months that were rewritten.
    pub fn save_settings(&mut self, settings: Settings) -> Result<Vec<MonthKey>> {
        self.settings = settings.sanitized();
        let was_first_load = self.first_load;
        self.first_load = false;
        let saved = self.persist_settings();

        if was_first_load {
            info!("Initial settings saved");
            return saved.map(|_| Vec::new());
        }

        let settings = self.settings.clone();
        let touched = self.apply_settings_change(&settings, settings.apply_to);
        saved?;
        touched
    }

    /// Rewrites recorded months with the defaults from `settings`, scoped by
    /// `tenure` relative to today.
    pub fn apply_settings_change(
        &mut self,
        settings: &Settings,
        tenure: ApplyTo,
    ) -> Result<Vec<MonthKey>> {
        let today = self.today();
        let touched = propagate(&mut self.calendar, settings, tenure, today);
        info!(
            "Applied new defaults ({}) to {} month(s)",
            tenure,
            touched.len()
        );
        if !touched.is_empty() {
            self.persist_calendar()?;
        }
        Ok(touched)
    }

    pub fn month(&self, month: MonthKey) -> Option<&MonthEntries> {
        self.calendar.get(month)
    }

    /// Fills `month` with default entries unless it already holds any.
    /// Returns whether anything was written.
    pub fn ensure_month_initialized(&mut self, month: MonthKey) -> Result<bool> {
        let today = self.today();
        let Some(entries) = initialize_month(month, self.calendar.get(month), &self.settings, today)
        else {
            return Ok(false);
        };
        debug!("Initialized {} ({} days)", month, entries.len());
        self.calendar.set(month, entries);
        self.persist_calendar()?;
        Ok(true)
    }

    pub fn set_month(&mut self, month: MonthKey, entries: MonthEntries) -> Result<()> {
        self.calendar.set(month, entries);
        self.persist_calendar()
    }

    /// Records one day. A day that does not exist in `month` is rejected
    /// without touching anything.
    pub fn set_day_entry(&mut self, month: MonthKey, day: u32, entry: DayEntry) -> Result<()> {
        self.calendar.set_day(month, day, entry)?;
        debug!("Set {} day {} to {:?}", month, day, entry);
        self.persist_calendar()
    }

    /// Like [`Tracker::set_day_entry`] with raw text; unparseable amounts become `0`.
    pub fn set_day_from_input(
        &mut self,
        month: MonthKey,
        day: u32,
        volume: &str,
        cost: &str,
    ) -> Result<()> {
        self.set_day_entry(month, day, DayEntry::from_input(volume, cost))
    }

    pub fn month_totals(&self, month: MonthKey) -> MonthTotals {
        self.calendar.totals(month)
    }

    pub fn navigable_months(&self) -> Vec<MonthKey> {
        navigable_months(self.calendar.month_keys(), self.today())
    }

    fn persist_settings(&self) -> Result<()> {
        self.settings_repo.save(&self.settings).map_err(|err| {
            warn!("Failed to persist settings: {:#}", err);
            err
        })
    }

    fn persist_calendar(&self) -> Result<()> {
        self.calendar_repo.save(&self.calendar).map_err(|err| {
            warn!("Failed to persist calendar data: {:#}", err);
            err
        })
    }
}
