use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::error::CatalogError;

/// Write `value` as pretty RON.
pub fn save_ron<T: Serialize>(path: &Path, value: &T) -> Result<(), CatalogError> {
    let pretty_config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .separate_tuple_members(false);

    let ron_string = ron::ser::to_string_pretty(value, pretty_config)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, ron_string)?;
    Ok(())
}

/// Read a RON file. A missing file is reported as [`CatalogError::Missing`].
pub fn load_ron<T: DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::Missing(path.to_path_buf()));
    }
    let contents = fs::read_to_string(path)?;
    let value: T = ron::from_str(&contents)?;
    Ok(value)
}

/// Read a RON file, treating a missing file as `None`.
pub fn load_optional_ron<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, CatalogError> {
    match load_ron(path) {
        Ok(value) => Ok(Some(value)),
        Err(CatalogError::Missing(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// File stem for a wallet address or other free-form key.
pub fn key_filename(key: &str) -> String {
    let sanitized: String = key
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}.ron", sanitized.to_lowercase())
}
