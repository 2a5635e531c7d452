use layerkit_settings::SettingsOverride;

/// One model to build, with its optional sparse settings override
#[derive(Debug, Clone, PartialEq)]
pub struct PrintPart<M> {
    pub model: M,
    pub overrides: SettingsOverride,
}

impl<M> PrintPart<M> {
    /// A part printed with the global settings
    pub fn new(model: M) -> Self {
        Self {
            model,
            overrides: SettingsOverride::new(),
        }
    }

    pub fn with_overrides(model: M, overrides: SettingsOverride) -> Self {
        Self { model, overrides }
    }

    pub fn has_overrides(&self) -> bool {
        !self.overrides.is_empty()
    }
}
