//! Settings persistence
//!
//! Settings are stored as JSON or TOML, chosen by file extension. Unknown
//! fields are ignored and missing fields take their defaults, so files
//! written by newer or older versions still load.

use crate::error::{SettingsError, SettingsResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Version written into every settings file
pub const SCHEMA_VERSION: u32 = 1;

/// On-disk encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Json,
    Toml,
}

impl SettingsFormat {
    /// Format implied by the file extension
    pub fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            _ => Err(SettingsError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn encode<T: Serialize>(self, value: &T) -> SettingsResult<String> {
        Ok(match self {
            Self::Json => serde_json::to_string_pretty(value)?,
            Self::Toml => toml::to_string_pretty(value)?,
        })
    }

    pub fn decode<T: DeserializeOwned>(self, content: &str) -> SettingsResult<T> {
        Ok(match self {
            Self::Json => serde_json::from_str(content)?,
            Self::Toml => toml::from_str(content)?,
        })
    }
}

/// Load settings from a `.json` or `.toml` file.
///
/// A file written with a newer schema loads with its `schema_version`
/// lowered to [`SCHEMA_VERSION`], so saving it again writes this build's
/// version. The result is not validated; call `validate()` to inspect it.
pub fn load_settings<T: DeserializeOwned>(path: &Path) -> SettingsResult<T> {
    let format = SettingsFormat::from_path(path)?;
    let load_error = |reason: String| SettingsError::LoadError {
        path: path.to_path_buf(),
        reason,
    };
    let content = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;

    let settings = match format {
        SettingsFormat::Json => {
            let mut value: serde_json::Value =
                serde_json::from_str(&content).map_err(|e| load_error(e.to_string()))?;
            if let Some(obj) = value.as_object_mut() {
                let version = obj.get("schema_version").and_then(serde_json::Value::as_u64);
                if is_newer(path, version) {
                    obj.insert("schema_version".into(), SCHEMA_VERSION.into());
                }
            }
            serde_json::from_value(value).map_err(|e| load_error(e.to_string()))?
        }
        SettingsFormat::Toml => {
            let mut table: toml::Table = toml::from_str(&content).map_err(|e| load_error(e.to_string()))?;
            let version = table
                .get("schema_version")
                .and_then(toml::Value::as_integer)
                .and_then(|v| u64::try_from(v).ok());
            if is_newer(path, version) {
                table.insert("schema_version".into(), toml::Value::Integer(i64::from(SCHEMA_VERSION)));
            }
            toml::Value::Table(table)
                .try_into()
                .map_err(|e: toml::de::Error| load_error(e.to_string()))?
        }
    };
    tracing::info!("Loaded settings from {:?}", path);
    Ok(settings)
}

/// Save settings to a `.json` or `.toml` file, creating parent directories
pub fn save_settings<T: Serialize>(path: &Path, settings: &T) -> SettingsResult<()> {
    let format = SettingsFormat::from_path(path)?;
    let content = format
        .encode(settings)
        .map_err(|e| SettingsError::SaveError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content).map_err(|e| SettingsError::SaveError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    tracing::debug!("Saved settings to {:?}", path);
    Ok(())
}

fn is_newer(path: &Path, version: Option<u64>) -> bool {
    match version {
        Some(version) if version > u64::from(SCHEMA_VERSION) => {
            tracing::warn!(
                "{:?} was written with settings schema {} (this build reads {}); unknown fields are ignored",
                path,
                version,
                SCHEMA_VERSION
            );
            true
        }
        _ => false,
    }
}
