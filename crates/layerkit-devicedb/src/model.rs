use layerkit_core::{ValidationReport, ValidationResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum MachineClass {
    #[default]
    Unknown,
    FilamentExtrusion,
    PowderBedFusion,
}

impl std::fmt::Display for MachineClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::FilamentExtrusion => write!(f, "Filament Extrusion"),
            Self::PowderBedFusion => write!(f, "Powder Bed Fusion"),
        }
    }
}

/// Identity, bed geometry and output coordinate convention shared by every
/// machine class.
///
/// The origin factors place logical (0,0) on the bed rectangle:
/// 0 is the left/front edge, 0.5 the middle, 1 the right/back edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineInfo {
    pub manufacturer_name: String,
    pub manufacturer_uuid: Uuid,
    pub model_identifier: String,
    pub model_uuid: Uuid,
    pub class: MachineClass,

    pub bed_size_x_mm: f64,
    pub bed_size_y_mm: f64,
    pub max_height_mm: f64,

    pub bed_origin_factor_x: f64,
    pub bed_origin_factor_y: f64,
}

impl Default for MachineInfo {
    fn default() -> Self {
        Self {
            manufacturer_name: "Unknown".to_string(),
            manufacturer_uuid: Uuid::nil(),
            model_identifier: "Machine".to_string(),
            model_uuid: Uuid::nil(),
            class: MachineClass::Unknown,
            bed_size_x_mm: 100.0,
            bed_size_y_mm: 100.0,
            max_height_mm: 100.0,
            bed_origin_factor_x: 0.0,
            bed_origin_factor_y: 0.0,
        }
    }
}

impl MachineInfo {
    /// Physical position of logical (0,0) on the bed, in mm from the
    /// left/front corner.
    pub fn origin_offset(&self) -> (f64, f64) {
        (
            self.bed_size_x_mm * self.bed_origin_factor_x,
            self.bed_size_y_mm * self.bed_origin_factor_y,
        )
    }

    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        report.push("bed_size_x_mm", ValidationResult::positive(self.bed_size_x_mm));
        report.push("bed_size_y_mm", ValidationResult::positive(self.bed_size_y_mm));
        report.push("max_height_mm", ValidationResult::positive(self.max_height_mm));
        report.push(
            "bed_origin_factor_x",
            ValidationResult::unit_interval(self.bed_origin_factor_x),
        );
        report.push(
            "bed_origin_factor_y",
            ValidationResult::unit_interval(self.bed_origin_factor_y),
        );
        report
    }
}

/// Filament-extrusion (FFF) machine limits.
///
/// All speeds are mm/min.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FffMachineInfo {
    #[serde(flatten)]
    pub base: MachineInfo,

    // Mechanics
    pub nozzle_diam_mm: f64,
    pub filament_diam_mm: f64,
    pub min_layer_height_mm: f64,
    pub max_layer_height_mm: f64,

    // Temperatures
    pub min_extruder_temp_c: i32,
    pub max_extruder_temp_c: i32,
    pub has_heated_bed: bool,
    pub min_bed_temp_c: i32,
    pub max_bed_temp_c: i32,

    // Speed ceilings
    pub max_extrude_speed_mmm: i32,
    pub max_travel_speed_mmm: i32,
    pub max_z_travel_speed_mmm: i32,
    pub max_retract_speed_mmm: i32,

    // Bed levelling
    pub has_auto_bed_leveling: bool,
    pub enable_auto_bed_leveling: bool,

    /// Extrusion points closer than this are merged. Printers choke on very
    /// short sequential extrusion steps.
    pub min_point_spacing_mm: f64,
}

impl Default for FffMachineInfo {
    fn default() -> Self {
        Self {
            base: MachineInfo {
                class: MachineClass::FilamentExtrusion,
                ..MachineInfo::default()
            },
            nozzle_diam_mm: 0.4,
            filament_diam_mm: 1.75,
            min_layer_height_mm: 0.2,
            max_layer_height_mm: 0.2,
            min_extruder_temp_c: 20,
            max_extruder_temp_c: 230,
            has_heated_bed: false,
            min_bed_temp_c: 0,
            max_bed_temp_c: 0,
            max_extrude_speed_mmm: 50 * 60,
            max_travel_speed_mmm: 100 * 60,
            max_z_travel_speed_mmm: 20 * 60,
            max_retract_speed_mmm: 20 * 60,
            has_auto_bed_leveling: false,
            enable_auto_bed_leveling: false,
            min_point_spacing_mm: 0.1,
        }
    }
}

impl FffMachineInfo {
    pub fn validate(&self) -> ValidationReport {
        let mut report = self.base.validate();
        report.push("nozzle_diam_mm", ValidationResult::positive(self.nozzle_diam_mm));
        report.push(
            "filament_diam_mm",
            ValidationResult::positive(self.filament_diam_mm),
        );

        let layer_bounds = if self.min_layer_height_mm <= 0.0 {
            ValidationResult::error("minimum layer height must be > 0")
        } else if self.min_layer_height_mm > self.max_layer_height_mm {
            ValidationResult::error(format!(
                "minimum layer height {} exceeds maximum {}",
                self.min_layer_height_mm, self.max_layer_height_mm
            ))
        } else {
            ValidationResult::ok()
        };
        report.push("layer_height_bounds", layer_bounds);

        let extruder_bounds = if self.min_extruder_temp_c > self.max_extruder_temp_c {
            ValidationResult::error("extruder temperature bounds are inverted")
        } else {
            ValidationResult::ok()
        };
        report.push("extruder_temp_bounds", extruder_bounds);

        let bed_bounds = if self.min_bed_temp_c > self.max_bed_temp_c {
            ValidationResult::error("bed temperature bounds are inverted")
        } else if !self.has_heated_bed && self.max_bed_temp_c > 0 {
            ValidationResult::warning("bed temperature range set on a machine without heated bed")
        } else {
            ValidationResult::ok()
        };
        report.push("bed_temp_bounds", bed_bounds);

        for (field, value) in [
            ("max_extrude_speed_mmm", self.max_extrude_speed_mmm),
            ("max_travel_speed_mmm", self.max_travel_speed_mmm),
            ("max_z_travel_speed_mmm", self.max_z_travel_speed_mmm),
            ("max_retract_speed_mmm", self.max_retract_speed_mmm),
        ] {
            report.push(field, ValidationResult::positive(f64::from(value)));
        }

        let leveling = if self.enable_auto_bed_leveling && !self.has_auto_bed_leveling {
            ValidationResult::warning("auto bed leveling enabled but not supported by machine")
        } else {
            ValidationResult::ok()
        };
        report.push("enable_auto_bed_leveling", leveling);

        report.push(
            "min_point_spacing_mm",
            ValidationResult::non_negative(self.min_point_spacing_mm),
        );
        report
    }
}

/// Capability-set accessors implemented by every machine class.
pub trait MachineProfile {
    fn base(&self) -> &MachineInfo;

    fn base_mut(&mut self) -> &mut MachineInfo;

    fn machine_class(&self) -> MachineClass {
        self.base().class
    }

    fn origin_offset(&self) -> (f64, f64) {
        self.base().origin_offset()
    }

    fn validate(&self) -> ValidationReport;
}

impl MachineProfile for MachineInfo {
    fn base(&self) -> &MachineInfo {
        self
    }

    fn base_mut(&mut self) -> &mut MachineInfo {
        self
    }

    fn validate(&self) -> ValidationReport {
        MachineInfo::validate(self)
    }
}

impl MachineProfile for FffMachineInfo {
    fn base(&self) -> &MachineInfo {
        &self.base
    }

    fn base_mut(&mut self) -> &mut MachineInfo {
        &mut self.base
    }

    fn machine_class(&self) -> MachineClass {
        MachineClass::FilamentExtrusion
    }

    fn validate(&self) -> ValidationReport {
        FffMachineInfo::validate(self)
    }
}

/// A profile of any machine class, as loaded from a profile library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnyMachine {
    Generic(MachineInfo),
    Fff(FffMachineInfo),
}

impl AnyMachine {
    pub fn into_fff(self) -> Option<FffMachineInfo> {
        match self {
            Self::Fff(info) => Some(info),
            Self::Generic(_) => None,
        }
    }
}

impl From<FffMachineInfo> for AnyMachine {
    fn from(info: FffMachineInfo) -> Self {
        Self::Fff(info)
    }
}

impl From<MachineInfo> for AnyMachine {
    fn from(info: MachineInfo) -> Self {
        Self::Generic(info)
    }
}

impl MachineProfile for AnyMachine {
    fn base(&self) -> &MachineInfo {
        match self {
            Self::Generic(info) => info,
            Self::Fff(info) => &info.base,
        }
    }

    fn base_mut(&mut self) -> &mut MachineInfo {
        match self {
            Self::Generic(info) => info,
            Self::Fff(info) => &mut info.base,
        }
    }

    fn machine_class(&self) -> MachineClass {
        match self {
            Self::Generic(info) => info.class,
            Self::Fff(info) => info.machine_class(),
        }
    }

    fn validate(&self) -> ValidationReport {
        match self {
            Self::Generic(info) => info.validate(),
            Self::Fff(info) => info.validate(),
        }
    }
}
