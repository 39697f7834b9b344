use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

/// Overrides the data directory when no explicit one is given.
pub const DATA_DIR_ENV: &str = "MILKTALLY_HOME";

const DEFAULT_DIR_NAME: &str = ".milktally";

/// Picks the directory holding the persisted records: `explicit`, then
/// `$MILKTALLY_HOME`, then `~/.milktally`. The directory is created.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    let path = match explicit {
        Some(dir) => dir,
        None => match env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => {
                let home_dir = dirs::home_dir()
                    .ok_or_else(|| anyhow!("Could not determine home directory"))?;
                home_dir.join(DEFAULT_DIR_NAME)
            }
        },
    };
    fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create data directory {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_dir_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("data");

        let resolved = resolve_data_dir(Some(dir.clone())).unwrap();
        assert_eq!(resolved, dir);
        assert!(dir.is_dir());
    }
}
