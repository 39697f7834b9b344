use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::resolve_data_dir;
use crate::model::calendar::CalendarData;
use crate::model::settings::Settings;
use crate::repository::traits::{CalendarRepository, SettingsRepository};

pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const CALENDAR_FILE_NAME: &str = "calendarData.json";

/// One JSON record on disk. A missing or malformed file reads as `None`.
#[derive(Clone, Debug)]
struct JsonRecord {
    file_path: PathBuf,
}

impl JsonRecord {
    fn new(base_dir: Option<PathBuf>, file_name: &str) -> Result<Self> {
        let dir = resolve_data_dir(base_dir)?;
        Ok(Self {
            file_path: dir.join(file_name),
        })
    }

    fn path(&self) -> &Path {
        &self.file_path
    }

    fn read<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let file = match File::open(&self.file_path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to open {}", self.file_path.display()))
            }
        };
        let reader = BufReader::new(file);
        match serde_json::from_reader(reader) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(
                    "Ignoring malformed record {}: {}",
                    self.file_path.display(),
                    err
                );
                Ok(None)
            }
        }
    }

    /// Writes to a sibling temp file and renames it over the record, so a
    /// reader never sees a half-written file.
    fn write<T: Serialize>(&self, value: &T) -> Result<()> {
        let tmp_path = self.file_path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path)
                .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.file_path)
            .with_context(|| format!("Failed to write {}", self.file_path.display()))?;
        debug!("Saved {}", self.file_path.display());
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct FileSettingsRepository {
    record: JsonRecord,
}

impl FileSettingsRepository {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        Ok(Self {
            record: JsonRecord::new(base_dir, SETTINGS_FILE_NAME)?,
        })
    }

    pub fn path(&self) -> &Path {
        self.record.path()
    }
}

impl SettingsRepository for FileSettingsRepository {
    fn load(&self) -> Result<Option<Settings>> {
        self.record.read()
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        self.record.write(settings)
    }
}

#[derive(Clone, Debug)]
pub struct FileCalendarRepository {
    record: JsonRecord,
}

impl FileCalendarRepository {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        Ok(Self {
            record: JsonRecord::new(base_dir, CALENDAR_FILE_NAME)?,
        })
    }

    pub fn path(&self) -> &Path {
        self.record.path()
    }
}

impl CalendarRepository for FileCalendarRepository {
    fn load(&self) -> Result<Option<CalendarData>> {
        self.record.read()
    }

    fn save(&self, data: &CalendarData) -> Result<()> {
        self.record.write(data)
    }
}
