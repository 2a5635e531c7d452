//! Process settings contract
//!
//! [`ProcessSettings`] is implemented once per machine class. Each settings
//! value owns exactly one capability profile; cloning the settings clones the
//! profile with it.

use crate::collection::SettingsCollection;
use layerkit_core::{ConfigurationError, ValidationReport};
use layerkit_devicedb::{AnyMachine, MachineProfile};
use layerkit_gcode::{AssemblerFactory, JobParameters};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parameters governing one generation call
pub trait ProcessSettings: Clone + fmt::Debug + Send + 'static {
    /// User-facing name of this settings set
    fn identifier(&self) -> &str;

    fn layer_height_mm(&self) -> f64;

    /// The owned capability profile
    fn base_machine(&self) -> &dyn MachineProfile;

    /// Replace the owned profile. Fails when the profile's class does not
    /// match the settings type.
    fn set_base_machine(&mut self, machine: AnyMachine) -> Result<(), ConfigurationError>;

    /// Constructor of the assembler for this settings type.
    ///
    /// Types that do not name a dialect fail with
    /// [`ConfigurationError::MissingDialect`].
    fn assembler_factory(&self) -> Result<AssemblerFactory, ConfigurationError> {
        Err(ConfigurationError::MissingDialect {
            settings_type: std::any::type_name::<Self>().to_string(),
        })
    }

    /// Check every bounded field, including the profile's own checks under
    /// a `machine.` prefix
    fn validate(&self) -> ValidationReport;

    /// Values the assembler needs for start/end sequences and retraction
    fn job_parameters(&self) -> JobParameters;

    /// Layers outside this range are not generated
    fn layer_range_filter(&self) -> LayerRange;

    /// User-facing bindings for this settings type
    fn bindings() -> SettingsCollection<Self>;
}

/// Inclusive range of layer indices.
///
/// A range with `min > max` is empty; it is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerRange {
    #[serde(rename = "layer_range_filter_min")]
    pub min: i64,
    #[serde(rename = "layer_range_filter_max")]
    pub max: i64,
}

impl LayerRange {
    pub const MAX_LAYER: i64 = 999_999_999;

    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, layer: usize) -> bool {
        i64::try_from(layer).is_ok_and(|l| l >= self.min && l <= self.max)
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

impl Default for LayerRange {
    fn default() -> Self {
        Self::new(0, Self::MAX_LAYER)
    }
}

impl fmt::Display for LayerRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Geometric spacings derived from the nozzle diameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpacingField {
    ShellsFillPath,
    SolidFillPath,
    SparseFillPath,
    BridgeFillPath,
    Support,
    SupportAreaOffset,
    SupportRegionJoinTolerance,
    SolidFillBorderOverlap,
    SparseFillBorderOverlap,
    SelfOverlapTolerance,
}

impl SpacingField {
    pub const ALL: [SpacingField; 10] = [
        Self::ShellsFillPath,
        Self::SolidFillPath,
        Self::SparseFillPath,
        Self::BridgeFillPath,
        Self::Support,
        Self::SupportAreaOffset,
        Self::SupportRegionJoinTolerance,
        Self::SolidFillBorderOverlap,
        Self::SparseFillBorderOverlap,
        Self::SelfOverlapTolerance,
    ];
}

/// Identity and bed geometry of a printable configuration, as shown in
/// profile pickers.
pub trait Profile: Send {
    fn manufacturer_name(&self) -> &str;

    fn model_identifier(&self) -> &str;

    fn profile_name(&self) -> &str;

    fn bed_size_x_mm(&self) -> f64;

    fn bed_size_y_mm(&self) -> f64;

    fn bed_size_z_mm(&self) -> f64;

    fn bed_origin_factor_x(&self) -> f64;

    fn bed_origin_factor_y(&self) -> f64;

    fn clone_profile(&self) -> Box<dyn Profile>;
}
