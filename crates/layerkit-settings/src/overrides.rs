//! Sparse per-part setting overrides
//!
//! An override holds only the settings a user explicitly changed for one
//! part. Applying it to a copy of the global settings produces the part's
//! effective settings; every field not named in the override is inherited.

use crate::binding::SettingValue;
use crate::process::ProcessSettings;
use layerkit_core::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Explicitly set values keyed by binding id
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsOverride {
    values: BTreeMap<String, SettingValue>,
}

impl SettingsOverride {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing an earlier one for the same id
    pub fn set(&mut self, id: impl Into<String>, value: impl Into<SettingValue>) -> &mut Self {
        self.values.insert(id.into(), value.into());
        self
    }

    /// Builder form of [`set`](Self::set)
    pub fn with(mut self, id: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.set(id, value);
        self
    }

    pub fn get(&self, id: &str) -> Option<&SettingValue> {
        self.values.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<SettingValue> {
        self.values.remove(id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Effective settings: a copy of `base` with these values applied
    /// through the settings type's bindings.
    pub fn resolve<S: ProcessSettings>(&self, base: &S) -> Result<S, ConfigurationError> {
        let mut effective = base.clone();
        if !self.is_empty() {
            S::bindings().apply_override(&mut effective, self)?;
        }
        Ok(effective)
    }
}

impl<K: Into<String>, V: Into<SettingValue>> FromIterator<(K, V)> for SettingsOverride {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut overrides = Self::new();
        for (k, v) in iter {
            overrides.set(k, v);
        }
        overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fff::SingleMaterialFffSettings;

    #[test]
    fn test_unset_fields_inherit() {
        let mut global = SingleMaterialFffSettings::default();
        global.shells = 3;
        global.extruder_temp_c = 215;

        let part = SettingsOverride::new().with("shells", 5u32);
        let effective = part.resolve(&global).unwrap();
        assert_eq!(effective.shells, 5);
        assert_eq!(effective.extruder_temp_c, 215);
        assert_eq!(global.shells, 3);
    }

    #[test]
    fn test_empty_override_is_identity() {
        let global = SingleMaterialFffSettings::default();
        assert_eq!(SettingsOverride::new().resolve(&global).unwrap(), global);
    }

    #[test]
    fn test_bad_override_reports_setting() {
        let global = SingleMaterialFffSettings::default();
        let part = SettingsOverride::new().with("layer_height_mm", "thin");
        assert!(matches!(
            part.resolve(&global),
            Err(ConfigurationError::TypeMismatch { .. })
        ));
        let part = SettingsOverride::new().with("no_such_setting", true);
        assert!(matches!(
            part.resolve(&global),
            Err(ConfigurationError::UnknownSetting(_))
        ));
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let part: SettingsOverride = [("shells", SettingValue::Int(4)), ("fan_speed_x", SettingValue::Float(0.5))]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&part).unwrap();
        assert_eq!(json, r#"{"fan_speed_x":0.5,"shells":4}"#);
        let back: SettingsOverride = serde_json::from_str(&json).unwrap();
        assert_eq!(back, part);
    }
}
