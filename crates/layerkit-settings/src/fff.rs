//! Single-material filament extrusion settings
//!
//! All speeds are mm/min. Fields ending in `_x` are multipliers; most
//! multiply the nozzle diameter of the owned machine profile, and the
//! resulting spacings are recomputed on every call so they always follow
//! the current profile.

use crate::collection::SettingsCollection;
use crate::persistence::SCHEMA_VERSION;
use crate::process::{LayerRange, ProcessSettings, Profile, SpacingField};
use crate::schema;
use layerkit_core::{ConfigurationError, ValidationReport, ValidationResult};
use layerkit_devicedb::{AnyMachine, FffMachineInfo, MachineClass, MachineProfile};
use layerkit_gcode::{AssemblerFactory, JobParameters, MarlinAssembler, RepRapAssembler};
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

/// Settings types built on [`SingleMaterialFffSettings`]
pub trait FffSettings: ProcessSettings {
    fn fff(&self) -> &SingleMaterialFffSettings;

    fn fff_mut(&mut self) -> &mut SingleMaterialFffSettings;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SingleMaterialFffSettings {
    pub schema_version: u32,
    pub identifier: String,
    pub layer_height_mm: f64,

    // Material
    pub material_source: String,
    pub material_type: String,
    pub material_color: String,

    // Temperatures
    pub extruder_temp_c: i32,
    pub heated_bed_temp_c: i32,

    // Retraction
    pub enable_retraction: bool,
    pub retract_distance_mm: f64,
    /// Travel moves shorter than this do not retract
    pub min_retract_travel_length: f64,

    // Speeds
    pub retract_speed: f64,
    pub z_travel_speed: f64,
    pub rapid_travel_speed: f64,
    pub careful_extrude_speed: f64,
    pub rapid_extrude_speed: f64,
    pub min_extrude_speed: f64,
    pub outer_perimeter_speed_x: f64,
    /// Fraction of the fan's maximum
    pub fan_speed_x: f64,

    // Z-lift on travel
    pub travel_lift_enabled: bool,
    pub travel_lift_height: f64,
    pub travel_lift_distance_threshold: f64,

    // Shells
    pub shells: u32,
    /// Shells added around interior solid regions such as roofs and floors
    pub interior_solid_region_shells: u32,
    pub outer_shell_last: bool,

    // Roofs and floors
    pub roof_layers: u32,
    pub floor_layers: u32,

    // Solid and sparse fill
    pub shells_fill_nozzle_diam_step_x: f64,
    pub solid_fill_nozzle_diam_step_x: f64,
    pub solid_fill_border_overlap_x: f64,
    /// Multiplier on the solid fill spacing
    pub sparse_linear_infill_step_x: f64,
    pub sparse_fill_border_overlap_x: f64,

    // Start layers
    pub start_layers: u32,
    /// 0 means the regular layer height
    pub start_layer_height_mm: f64,

    // Support
    pub generate_support: bool,
    pub support_overhang_angle_deg: f64,
    pub support_spacing_step_x: f64,
    pub support_volume_scale: f64,
    pub enable_support_shell: bool,
    pub support_area_offset_x: f64,
    pub support_solid_space: f64,
    pub support_region_join_tol_x: f64,
    pub enable_support_release_opt: bool,
    pub support_release_gap: f64,
    pub support_min_dimension: f64,
    pub support_min_z_tips: bool,
    pub support_point_diam: f64,
    pub support_point_sides: u32,

    // Bridging
    pub enable_bridging: bool,
    pub max_bridge_width_mm: f64,
    pub bridge_fill_nozzle_diam_step_x: f64,
    pub bridge_volume_scale: f64,
    /// Multiplier on the careful extrude speed
    pub bridge_extrude_speed_x: f64,

    // Toolpath filtering
    pub min_layer_time: f64,
    pub clip_self_overlaps: bool,
    pub self_overlap_tolerance_x: f64,

    // Debug
    #[serde(flatten)]
    pub layer_range_filter: LayerRange,

    pub machine: FffMachineInfo,
}

impl Default for SingleMaterialFffSettings {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            identifier: "Defaults".to_string(),
            layer_height_mm: 0.2,

            material_source: "Generic".to_string(),
            material_type: "PLA".to_string(),
            material_color: "Blue".to_string(),

            extruder_temp_c: 210,
            heated_bed_temp_c: 0,

            enable_retraction: true,
            retract_distance_mm: 1.3,
            min_retract_travel_length: 2.5,

            retract_speed: 25.0 * 60.0,
            z_travel_speed: 23.0 * 60.0,
            rapid_travel_speed: 150.0 * 60.0,
            careful_extrude_speed: 30.0 * 60.0,
            rapid_extrude_speed: 90.0 * 60.0,
            min_extrude_speed: 20.0 * 60.0,
            outer_perimeter_speed_x: 0.5,
            fan_speed_x: 1.0,

            travel_lift_enabled: true,
            travel_lift_height: 0.2,
            travel_lift_distance_threshold: 5.0,

            shells: 2,
            interior_solid_region_shells: 0,
            outer_shell_last: false,

            roof_layers: 2,
            floor_layers: 2,

            shells_fill_nozzle_diam_step_x: 1.0,
            solid_fill_nozzle_diam_step_x: 1.0,
            solid_fill_border_overlap_x: 0.25,
            sparse_linear_infill_step_x: 5.0,
            sparse_fill_border_overlap_x: 0.25,

            start_layers: 0,
            start_layer_height_mm: 0.0,

            generate_support: true,
            support_overhang_angle_deg: 35.0,
            support_spacing_step_x: 5.0,
            support_volume_scale: 1.0,
            enable_support_shell: true,
            support_area_offset_x: -0.5,
            support_solid_space: 0.35,
            support_region_join_tol_x: 2.0,
            enable_support_release_opt: true,
            support_release_gap: 0.2,
            support_min_dimension: 1.5,
            support_min_z_tips: true,
            support_point_diam: 2.5,
            support_point_sides: 4,

            enable_bridging: true,
            max_bridge_width_mm: 10.0,
            bridge_fill_nozzle_diam_step_x: 0.85,
            bridge_volume_scale: 1.0,
            bridge_extrude_speed_x: 0.5,

            min_layer_time: 5.0,
            clip_self_overlaps: false,
            self_overlap_tolerance_x: 0.75,

            layer_range_filter: LayerRange::default(),

            machine: FffMachineInfo::default(),
        }
    }
}

impl SingleMaterialFffSettings {
    pub fn new(machine: FffMachineInfo) -> Self {
        Self {
            machine,
            ..Self::default()
        }
    }

    /// `"{source} {type} - {color}"`
    pub fn material_name(&self) -> String {
        format!(
            "{} {} - {}",
            self.material_source, self.material_type, self.material_color
        )
    }

    fn nozzle(&self) -> f64 {
        self.machine.nozzle_diam_mm
    }

    pub fn shells_fill_path_spacing_mm(&self) -> f64 {
        self.nozzle() * self.shells_fill_nozzle_diam_step_x
    }

    pub fn solid_fill_path_spacing_mm(&self) -> f64 {
        self.nozzle() * self.solid_fill_nozzle_diam_step_x
    }

    pub fn sparse_fill_path_spacing_mm(&self) -> f64 {
        self.solid_fill_path_spacing_mm() * self.sparse_linear_infill_step_x
    }

    pub fn bridge_fill_path_spacing_mm(&self) -> f64 {
        self.nozzle() * self.bridge_fill_nozzle_diam_step_x
    }

    pub fn support_spacing_mm(&self) -> f64 {
        self.nozzle() * self.support_spacing_step_x
    }

    /// Inset (negative) or outset added to support regions
    pub fn support_area_offset_mm(&self) -> f64 {
        self.nozzle() * self.support_area_offset_x
    }

    pub fn support_region_join_tolerance_mm(&self) -> f64 {
        self.nozzle() * self.support_region_join_tol_x
    }

    pub fn solid_fill_border_overlap_mm(&self) -> f64 {
        self.nozzle() * self.solid_fill_border_overlap_x
    }

    pub fn sparse_fill_border_overlap_mm(&self) -> f64 {
        self.nozzle() * self.sparse_fill_border_overlap_x
    }

    pub fn self_overlap_tolerance_mm(&self) -> f64 {
        self.nozzle() * self.self_overlap_tolerance_x
    }

    pub fn spacing_for(&self, field: SpacingField) -> f64 {
        match field {
            SpacingField::ShellsFillPath => self.shells_fill_path_spacing_mm(),
            SpacingField::SolidFillPath => self.solid_fill_path_spacing_mm(),
            SpacingField::SparseFillPath => self.sparse_fill_path_spacing_mm(),
            SpacingField::BridgeFillPath => self.bridge_fill_path_spacing_mm(),
            SpacingField::Support => self.support_spacing_mm(),
            SpacingField::SupportAreaOffset => self.support_area_offset_mm(),
            SpacingField::SupportRegionJoinTolerance => self.support_region_join_tolerance_mm(),
            SpacingField::SolidFillBorderOverlap => self.solid_fill_border_overlap_mm(),
            SpacingField::SparseFillBorderOverlap => self.sparse_fill_border_overlap_mm(),
            SpacingField::SelfOverlapTolerance => self.self_overlap_tolerance_mm(),
        }
    }

    pub fn bridge_extrude_speed(&self) -> f64 {
        self.careful_extrude_speed * self.bridge_extrude_speed_x
    }

    pub fn outer_perimeter_speed(&self) -> f64 {
        self.careful_extrude_speed * self.outer_perimeter_speed_x
    }

    /// Height used for the start layers
    pub fn effective_start_layer_height_mm(&self) -> f64 {
        if self.start_layer_height_mm > 0.0 {
            self.start_layer_height_mm
        } else {
            self.layer_height_mm
        }
    }

    /// Height of the given layer, honouring the start layers
    pub fn layer_height_for(&self, layer: usize) -> f64 {
        if layer < self.start_layers as usize {
            self.effective_start_layer_height_mm()
        } else {
            self.layer_height_mm
        }
    }

    /// Minimum spacing between emitted extrusion points at `speed` mm/min.
    ///
    /// The profile value holds at or below the careful extrude speed and
    /// grows linearly with speed above it, up to four times the profile value.
    pub fn min_point_spacing_mm(&self, speed: f64) -> f64 {
        let base = self.machine.min_point_spacing_mm;
        if self.careful_extrude_speed <= 0.0 || !speed.is_finite() {
            return base;
        }
        let scaled = base * speed / self.careful_extrude_speed;
        scaled.clamp(base, base * 4.0)
    }

    pub(crate) fn replace_machine(
        &mut self,
        machine: AnyMachine,
        settings_type: &str,
    ) -> Result<(), ConfigurationError> {
        match machine {
            AnyMachine::Fff(info) => {
                self.machine = info;
                Ok(())
            }
            AnyMachine::Generic(info) if info.class == MachineClass::FilamentExtrusion => {
                tracing::debug!(
                    "Promoting generic profile {} to FFF with default limits",
                    info.model_identifier
                );
                self.machine = FffMachineInfo {
                    base: info,
                    ..FffMachineInfo::default()
                };
                Ok(())
            }
            AnyMachine::Generic(info) => Err(ConfigurationError::ProfileClassMismatch {
                settings_type: settings_type.to_string(),
                expected: MachineClass::FilamentExtrusion.to_string(),
                actual: info.class.to_string(),
            }),
        }
    }

    fn check_speed(&self, report: &mut ValidationReport, field: &str, speed: f64, ceiling: i32) {
        let result = if speed.is_nan() || speed <= 0.0 {
            ValidationResult::positive(speed)
        } else if speed > f64::from(ceiling) {
            ValidationResult::warning(format!(
                "{} mm/min exceeds the machine limit of {} mm/min",
                speed, ceiling
            ))
        } else {
            ValidationResult::ok()
        };
        report.push(field, result);
    }

    fn validate_fields(&self) -> ValidationReport {
        let m = &self.machine;
        let mut report = ValidationReport::new();

        let layer_height = if self.layer_height_mm.is_nan() || self.layer_height_mm <= 0.0 {
            ValidationResult::positive(self.layer_height_mm)
        } else if self.layer_height_mm < m.min_layer_height_mm
            || self.layer_height_mm > m.max_layer_height_mm
        {
            ValidationResult::warning(format!(
                "{} mm is outside the machine range [{}, {}]",
                self.layer_height_mm, m.min_layer_height_mm, m.max_layer_height_mm
            ))
        } else {
            ValidationResult::ok()
        };
        report.push("layer_height_mm", layer_height);

        let extruder = if self.extruder_temp_c < m.min_extruder_temp_c
            || self.extruder_temp_c > m.max_extruder_temp_c
        {
            ValidationResult::warning(format!(
                "{} °C is outside the extruder range [{}, {}]",
                self.extruder_temp_c, m.min_extruder_temp_c, m.max_extruder_temp_c
            ))
        } else {
            ValidationResult::ok()
        };
        report.push("extruder_temp_c", extruder);

        let bed = if self.heated_bed_temp_c < 0 {
            ValidationResult::error("bed temperature must be >= 0")
        } else if self.heated_bed_temp_c > 0 && !m.has_heated_bed {
            ValidationResult::warning("bed temperature set but the machine has no heated bed")
        } else if self.heated_bed_temp_c > 0
            && (self.heated_bed_temp_c < m.min_bed_temp_c
                || self.heated_bed_temp_c > m.max_bed_temp_c)
        {
            ValidationResult::warning(format!(
                "{} °C is outside the bed range [{}, {}]",
                self.heated_bed_temp_c, m.min_bed_temp_c, m.max_bed_temp_c
            ))
        } else {
            ValidationResult::ok()
        };
        report.push("heated_bed_temp_c", bed);

        report.push(
            "retract_distance_mm",
            ValidationResult::non_negative(self.retract_distance_mm),
        );
        report.push(
            "min_retract_travel_length",
            ValidationResult::non_negative(self.min_retract_travel_length),
        );

        self.check_speed(&mut report, "retract_speed", self.retract_speed, m.max_retract_speed_mmm);
        self.check_speed(&mut report, "z_travel_speed", self.z_travel_speed, m.max_z_travel_speed_mmm);
        self.check_speed(
            &mut report,
            "rapid_travel_speed",
            self.rapid_travel_speed,
            m.max_travel_speed_mmm,
        );
        self.check_speed(
            &mut report,
            "careful_extrude_speed",
            self.careful_extrude_speed,
            m.max_extrude_speed_mmm,
        );
        self.check_speed(
            &mut report,
            "rapid_extrude_speed",
            self.rapid_extrude_speed,
            m.max_extrude_speed_mmm,
        );
        self.check_speed(
            &mut report,
            "min_extrude_speed",
            self.min_extrude_speed,
            m.max_extrude_speed_mmm,
        );

        for (field, value) in [
            ("outer_perimeter_speed_x", self.outer_perimeter_speed_x),
            ("travel_lift_height", self.travel_lift_height),
            ("travel_lift_distance_threshold", self.travel_lift_distance_threshold),
            ("solid_fill_border_overlap_x", self.solid_fill_border_overlap_x),
            ("sparse_fill_border_overlap_x", self.sparse_fill_border_overlap_x),
            ("start_layer_height_mm", self.start_layer_height_mm),
            ("support_volume_scale", self.support_volume_scale),
            ("support_solid_space", self.support_solid_space),
            ("support_region_join_tol_x", self.support_region_join_tol_x),
            ("support_release_gap", self.support_release_gap),
            ("support_min_dimension", self.support_min_dimension),
            ("max_bridge_width_mm", self.max_bridge_width_mm),
            ("bridge_volume_scale", self.bridge_volume_scale),
            ("min_layer_time", self.min_layer_time),
            ("self_overlap_tolerance_x", self.self_overlap_tolerance_x),
        ] {
            report.push(field, ValidationResult::non_negative(value));
        }

        for (field, value) in [
            ("shells_fill_nozzle_diam_step_x", self.shells_fill_nozzle_diam_step_x),
            ("solid_fill_nozzle_diam_step_x", self.solid_fill_nozzle_diam_step_x),
            ("sparse_linear_infill_step_x", self.sparse_linear_infill_step_x),
            ("support_spacing_step_x", self.support_spacing_step_x),
            ("bridge_fill_nozzle_diam_step_x", self.bridge_fill_nozzle_diam_step_x),
            ("bridge_extrude_speed_x", self.bridge_extrude_speed_x),
        ] {
            report.push(field, ValidationResult::positive(value));
        }

        report.push("fan_speed_x", ValidationResult::unit_interval(self.fan_speed_x));
        report.push(
            "support_overhang_angle_deg",
            ValidationResult::in_range(self.support_overhang_angle_deg, 0.0, 90.0),
        );

        let point_diam = if self.support_point_diam.is_nan() || self.support_point_diam <= 0.0 {
            ValidationResult::positive(self.support_point_diam)
        } else if self.support_point_diam < self.support_min_dimension {
            ValidationResult::warning("support point diameter is below the minimum support dimension")
        } else {
            ValidationResult::ok()
        };
        report.push("support_point_diam", point_diam);

        let sides = if self.support_point_sides < 3 {
            ValidationResult::error(format!(
                "{} sides cannot form a polygon",
                self.support_point_sides
            ))
        } else {
            ValidationResult::ok()
        };
        report.push("support_point_sides", sides);

        let range = &self.layer_range_filter;
        let range_result = if range.is_empty() {
            ValidationResult::warning(format!("layer range {} is empty", range))
        } else if range.min < 0 {
            ValidationResult::warning(format!("layer range {} starts below 0", range))
        } else {
            ValidationResult::ok()
        };
        report.push("layer_range_filter", range_result);

        report
    }
}

impl ProcessSettings for SingleMaterialFffSettings {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn layer_height_mm(&self) -> f64 {
        self.layer_height_mm
    }

    fn base_machine(&self) -> &dyn MachineProfile {
        &self.machine
    }

    fn set_base_machine(&mut self, machine: AnyMachine) -> Result<(), ConfigurationError> {
        self.replace_machine(machine, std::any::type_name::<Self>())
    }

    fn validate(&self) -> ValidationReport {
        let mut report = self.validate_fields();
        report.merge_prefixed("machine", self.machine.validate());
        report
    }

    fn job_parameters(&self) -> JobParameters {
        let m = &self.machine;
        JobParameters {
            profile_name: self.identifier.clone(),
            material_name: self.material_name(),
            layer_height_mm: self.layer_height_mm,
            extruder_temp_c: self.extruder_temp_c,
            bed_temp_c: self.heated_bed_temp_c,
            has_heated_bed: m.has_heated_bed,
            auto_bed_leveling: m.has_auto_bed_leveling && m.enable_auto_bed_leveling,
            enable_retraction: self.enable_retraction,
            retract_distance_mm: self.retract_distance_mm,
            retract_speed_mmm: self.retract_speed.min(f64::from(m.max_retract_speed_mmm)),
            z_travel_speed_mmm: self.z_travel_speed.min(f64::from(m.max_z_travel_speed_mmm)),
            origin_offset: m.origin_offset(),
        }
    }

    fn layer_range_filter(&self) -> LayerRange {
        self.layer_range_filter
    }

    fn bindings() -> SettingsCollection<Self> {
        schema::fff_settings_collection()
    }
}

impl FffSettings for SingleMaterialFffSettings {
    fn fff(&self) -> &SingleMaterialFffSettings {
        self
    }

    fn fff_mut(&mut self) -> &mut SingleMaterialFffSettings {
        self
    }
}

impl<T: FffSettings> Profile for T {
    fn manufacturer_name(&self) -> &str {
        &self.fff().machine.base.manufacturer_name
    }

    fn model_identifier(&self) -> &str {
        &self.fff().machine.base.model_identifier
    }

    fn profile_name(&self) -> &str {
        &self.fff().identifier
    }

    fn bed_size_x_mm(&self) -> f64 {
        self.fff().machine.base.bed_size_x_mm
    }

    fn bed_size_y_mm(&self) -> f64 {
        self.fff().machine.base.bed_size_y_mm
    }

    fn bed_size_z_mm(&self) -> f64 {
        self.fff().machine.base.max_height_mm
    }

    fn bed_origin_factor_x(&self) -> f64 {
        self.fff().machine.base.bed_origin_factor_x
    }

    fn bed_origin_factor_y(&self) -> f64 {
        self.fff().machine.base.bed_origin_factor_y
    }

    fn clone_profile(&self) -> Box<dyn Profile> {
        Box::new(self.clone())
    }
}

/// Implements the settings traits for a newtype over
/// [`SingleMaterialFffSettings`] that names a dialect.
macro_rules! fff_dialect_settings {
    ($ty:ident, $factory:expr, $collection:path) => {
        impl ProcessSettings for $ty {
            fn identifier(&self) -> &str {
                &self.0.identifier
            }

            fn layer_height_mm(&self) -> f64 {
                self.0.layer_height_mm
            }

            fn base_machine(&self) -> &dyn MachineProfile {
                &self.0.machine
            }

            fn set_base_machine(&mut self, machine: AnyMachine) -> Result<(), ConfigurationError> {
                self.0.replace_machine(machine, std::any::type_name::<Self>())
            }

            fn assembler_factory(&self) -> Result<AssemblerFactory, ConfigurationError> {
                Ok($factory)
            }

            fn validate(&self) -> ValidationReport {
                self.0.validate()
            }

            fn job_parameters(&self) -> JobParameters {
                self.0.job_parameters()
            }

            fn layer_range_filter(&self) -> LayerRange {
                self.0.layer_range_filter
            }

            fn bindings() -> SettingsCollection<Self> {
                $collection()
            }
        }

        impl FffSettings for $ty {
            fn fff(&self) -> &SingleMaterialFffSettings {
                &self.0
            }

            fn fff_mut(&mut self) -> &mut SingleMaterialFffSettings {
                &mut self.0
            }
        }

        impl Deref for $ty {
            type Target = SingleMaterialFffSettings;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl DerefMut for $ty {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl From<SingleMaterialFffSettings> for $ty {
            fn from(settings: SingleMaterialFffSettings) -> Self {
                Self(settings)
            }
        }
    };
}

/// FFF settings for RepRap-dialect printers
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenericRepRapSettings(pub SingleMaterialFffSettings);

fff_dialect_settings!(
    GenericRepRapSettings,
    RepRapAssembler::factory,
    schema::reprap_settings_collection
);

/// FFF settings for Marlin-firmware printers
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarlinSettings(pub SingleMaterialFffSettings);

fff_dialect_settings!(
    MarlinSettings,
    MarlinAssembler::factory,
    schema::marlin_settings_collection
);
