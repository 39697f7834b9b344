pub mod file;
pub mod traits;

// Re-export
pub use file::{FileCalendarRepository, FileSettingsRepository};
pub use traits::{CalendarRepository, SettingsRepository};
