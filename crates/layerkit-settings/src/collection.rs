//! Ordered collections of setting bindings

use crate::binding::{SettingValue, UserSetting};
use crate::overrides::SettingsOverride;
use layerkit_core::{ConfigurationError, ValidationReport};
use std::collections::BTreeMap;
use std::fmt;

/// Every user-facing setting of a settings type, in display order.
///
/// Ids are unique within a collection. Hidden bindings keep working for
/// reads and writes; hiding only removes them from [`visible`](Self::visible).
pub struct SettingsCollection<S> {
    bindings: Vec<Box<dyn UserSetting<S>>>,
}

impl<S> Default for SettingsCollection<S> {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }
}

impl<S: 'static> SettingsCollection<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding. A binding with the same id replaces the earlier one
    /// in place.
    pub fn push(&mut self, binding: impl UserSetting<S> + 'static) -> &mut Self {
        let boxed: Box<dyn UserSetting<S>> = Box::new(binding);
        match self.bindings.iter().position(|b| b.id() == boxed.id()) {
            Some(pos) => self.bindings[pos] = boxed,
            None => self.bindings.push(boxed),
        }
        self
    }

    /// Builder form of [`push`](Self::push)
    pub fn with(mut self, binding: impl UserSetting<S> + 'static) -> Self {
        self.push(binding);
        self
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn UserSetting<S>> {
        self.bindings.iter().map(|b| b.as_ref())
    }

    /// Bindings not marked hidden
    pub fn visible(&self) -> impl Iterator<Item = &dyn UserSetting<S>> {
        self.iter().filter(|b| !b.is_hidden())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|b| b.id())
    }

    pub fn find(&self, id: &str) -> Option<&dyn UserSetting<S>> {
        self.bindings
            .iter()
            .find(|b| b.id() == id)
            .map(|b| b.as_ref())
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut dyn UserSetting<S>> {
        match self.bindings.iter_mut().find(|b| b.id() == id) {
            Some(b) => Some(b.as_mut()),
            None => None,
        }
    }

    fn require_mut(&mut self, id: &str) -> Result<&mut dyn UserSetting<S>, ConfigurationError> {
        self.find_mut(id)
            .ok_or_else(|| ConfigurationError::UnknownSetting(id.to_string()))
    }

    /// Mark a binding hidden
    pub fn hide(&mut self, id: &str) -> Result<(), ConfigurationError> {
        self.require_mut(id)?.set_hidden(true);
        Ok(())
    }

    /// Refresh every cached value from `settings`
    pub fn load_all(&mut self, settings: &S) {
        for binding in &mut self.bindings {
            binding.load(settings);
        }
    }

    /// Write every cached value into `settings`
    pub fn apply_all(&self, settings: &mut S) {
        for binding in &self.bindings {
            binding.apply(settings);
        }
    }

    /// Validate the cached values, keyed by binding id
    pub fn validate_cached(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        for binding in &self.bindings {
            report.push(binding.id(), binding.validation());
        }
        report
    }

    /// Validate the values currently held by `settings`, keyed by binding id
    pub fn validate_values(&self, settings: &S) -> ValidationReport {
        let mut report = ValidationReport::new();
        for binding in &self.bindings {
            report.push(binding.id(), binding.validate(&binding.get(settings)));
        }
        report
    }

    pub fn get_by_id(&self, settings: &S, id: &str) -> Result<SettingValue, ConfigurationError> {
        self.find(id)
            .map(|b| b.get(settings))
            .ok_or_else(|| ConfigurationError::UnknownSetting(id.to_string()))
    }

    pub fn set_by_id(
        &mut self,
        settings: &mut S,
        id: &str,
        value: SettingValue,
    ) -> Result<(), ConfigurationError> {
        self.require_mut(id)?.set(settings, value)
    }

    /// Every binding's current value in `settings`
    pub fn snapshot(&self, settings: &S) -> BTreeMap<String, SettingValue> {
        self.bindings
            .iter()
            .map(|b| (b.id().to_string(), b.get(settings)))
            .collect()
    }

    /// Write every explicitly set value of `overrides` into `settings`.
    ///
    /// Every id and value type is checked before anything is written, so an
    /// unknown id or a mismatched value leaves `settings` untouched.
    pub fn apply_override(
        &mut self,
        settings: &mut S,
        overrides: &SettingsOverride,
    ) -> Result<(), ConfigurationError> {
        for (id, value) in overrides.iter() {
            self.find(id)
                .ok_or_else(|| ConfigurationError::UnknownSetting(id.to_string()))?
                .check_type(value)?;
        }
        for (id, value) in overrides.iter() {
            self.set_by_id(settings, id, value.clone())?;
        }
        Ok(())
    }

    /// The values in `settings` that differ from `baseline`, as an override
    pub fn diff(&self, baseline: &S, settings: &S) -> SettingsOverride {
        let mut overrides = SettingsOverride::new();
        for binding in &self.bindings {
            let value = binding.get(settings);
            if value != binding.get(baseline) {
                overrides.set(binding.id(), value);
            }
        }
        overrides
    }
}

impl<S> fmt::Debug for SettingsCollection<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.bindings.iter().map(|b| b.id()))
            .finish()
    }
}
