//! # LayerKit G-code
//!
//! The instruction-stream side of LayerKit:
//! - `GcodeLine` / `GcodeFile`, the generated document grouped into layers
//! - Text codec (`GcodeParser`, `GcodeWriter`, `save_gcode`, `load_gcode`)
//! - Dialect assemblers turning planner commands into G-code lines

pub mod assembler;
pub mod error;
pub mod gcode;

pub use assembler::{
    AssemblerFactory, Dialect, GcodeAssembler, JobParameters, MarlinAssembler, RepRapAssembler,
    ToolpathCommand,
};
pub use error::GcodeIoError;
pub use gcode::{
    load_gcode, save_gcode, to_gcode_string, GcodeFile, GcodeLine, GcodeParam, GcodeParser, GcodeWriter, LayerSpan,
    LineKind, ParamValue, FOOTER_MARKER, LAYER_MARKER,
};
