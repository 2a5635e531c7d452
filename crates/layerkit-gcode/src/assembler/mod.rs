//! Dialect assemblers
//!
//! An assembler turns machine-independent [`ToolpathCommand`]s into the
//! G-code lines understood by one firmware family. Generators never build
//! lines themselves; they ask the process settings for an
//! [`AssemblerFactory`] and feed the resulting assembler.

mod marlin;
mod reprap;

pub use marlin::MarlinAssembler;
pub use reprap::RepRapAssembler;

use crate::gcode::GcodeLine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Instruction-stream vocabulary of a machine family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    RepRap,
    Marlin,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RepRap => write!(f, "RepRap"),
            Self::Marlin => write!(f, "Marlin"),
        }
    }
}

/// One machine-independent step produced by a toolpath planner.
///
/// Coordinates are bed-space millimetres measured from the bed's left/front
/// corner. Speeds are mm/min.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ToolpathCommand {
    /// Non-extruding move, optionally changing Z
    Travel {
        x: f64,
        y: f64,
        z: Option<f64>,
        speed: f64,
    },
    /// Extruding move consuming `filament_mm` of filament
    Extrude {
        x: f64,
        y: f64,
        filament_mm: f64,
        speed: f64,
    },
    Retract,
    Unretract,
    SetExtruderTemp { celsius: i32, wait: bool },
    SetBedTemp { celsius: i32, wait: bool },
    /// Part-cooling fan, 0.0 (off) to 1.0 (full)
    SetFan { fraction: f64 },
    Dwell { ms: u32 },
    Comment(String),
}

impl ToolpathCommand {
    /// False when any coordinate, amount or speed is NaN or infinite
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Travel { x, y, z, speed } => {
                x.is_finite() && y.is_finite() && speed.is_finite() && z.is_none_or(f64::is_finite)
            }
            Self::Extrude {
                x,
                y,
                filament_mm,
                speed,
            } => x.is_finite() && y.is_finite() && filament_mm.is_finite() && speed.is_finite(),
            Self::SetFan { fraction } => fraction.is_finite(),
            _ => true,
        }
    }
}

/// Machine and process values an assembler needs for the start and end
/// sequences and for retraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobParameters {
    pub profile_name: String,
    pub material_name: String,
    pub layer_height_mm: f64,
    pub extruder_temp_c: i32,
    pub bed_temp_c: i32,
    pub has_heated_bed: bool,
    pub auto_bed_leveling: bool,
    pub enable_retraction: bool,
    pub retract_distance_mm: f64,
    pub retract_speed_mmm: f64,
    pub z_travel_speed_mmm: f64,
    /// Bed-space position of the machine's logical origin
    pub origin_offset: (f64, f64),
}

impl Default for JobParameters {
    fn default() -> Self {
        Self {
            profile_name: "Defaults".to_string(),
            material_name: "Generic PLA - Blue".to_string(),
            layer_height_mm: 0.2,
            extruder_temp_c: 210,
            bed_temp_c: 0,
            has_heated_bed: false,
            auto_bed_leveling: false,
            enable_retraction: true,
            retract_distance_mm: 1.3,
            retract_speed_mmm: 1500.0,
            z_travel_speed_mmm: 1380.0,
            origin_offset: (0.0, 0.0),
        }
    }
}

/// Builds the instruction stream for one generation call.
///
/// Call order is `begin`, then for each part `begin_part` followed by its
/// layers (`begin_layer` and any number of `append`), then `end` once. Every method appends to `out` and
/// never removes lines already there.
pub trait GcodeAssembler: Send {
    fn dialect(&self) -> Dialect;

    /// Emit the start sequence (units, heating, homing)
    fn begin(&mut self, job: &JobParameters, out: &mut Vec<GcodeLine>);

    /// Switch to a part's parameters. Emits nothing when `job` matches the
    /// parameters already in effect.
    fn begin_part(&mut self, part_index: usize, job: &JobParameters, out: &mut Vec<GcodeLine>);

    /// Open a layer. The first line emitted is the `;LAYER:<index>` marker.
    fn begin_layer(&mut self, index: usize, z: f64, out: &mut Vec<GcodeLine>);

    fn append(&mut self, command: &ToolpathCommand, out: &mut Vec<GcodeLine>);

    /// Emit the end sequence. The first line emitted is the `;FOOTER` marker.
    fn end(&mut self, out: &mut Vec<GcodeLine>);
}

/// Zero-argument constructor registered per settings type
pub type AssemblerFactory = fn() -> Box<dyn GcodeAssembler>;

/// Round a coordinate or extrusion amount to 3 decimals
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Feed rates are written as whole mm/min
pub(crate) fn feed(value: f64) -> i64 {
    value.round() as i64
}
