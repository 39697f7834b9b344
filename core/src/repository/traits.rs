use crate::model::calendar::CalendarData;
use crate::model::settings::Settings;
use anyhow::Result;

/// Persistence for the settings record. `load` yields `None` when nothing
/// usable has been stored yet.
pub trait SettingsRepository {
    fn load(&self) -> Result<Option<Settings>>;
    fn save(&self, settings: &Settings) -> Result<()>;
}

pub trait CalendarRepository {
    fn load(&self) -> Result<Option<CalendarData>>;
    fn save(&self, data: &CalendarData) -> Result<()>;
}
