pub mod calendar;
pub mod settings;
