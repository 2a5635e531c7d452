//! # LayerKit
//!
//! Process settings and G-code generation for additive manufacturing:
//! - Typed process settings with derived spacings and collected validation
//! - Setting bindings for editors, persistence and per-part overrides
//! - Machine capability profiles and a persisted profile library
//! - A generator contract streaming G-code through line, layer and progress sinks
//!
//! ## Architecture
//!
//! LayerKit is organized as a workspace with multiple crates:
//!
//! 1. **layerkit-core** - Error taxonomy, validation reports, sink aliases
//! 2. **layerkit-devicedb** - Machine capability profiles and library
//! 3. **layerkit-gcode** - G-code document, codec and dialect assemblers
//! 4. **layerkit-settings** - Process settings, bindings, overrides, persistence
//! 5. **layerkit-generator** - Generator contract and toolpath planner seam
//! 6. **layerkit** - This crate: re-exports, logging setup and the CLI

pub use layerkit_core::{
    CancelFlag, ConfigurationError, Error, GenerationError, ParseError, ProgressSink, Result, Sink,
    SinkControl, ValidationLevel, ValidationReport, ValidationResult,
};

pub use layerkit_core::units;

pub use layerkit_devicedb::{
    builtin_profiles, AnyMachine, FffMachineInfo, MachineClass, MachineInfo, MachineLibrary, MachineProfile,
};

pub use layerkit_gcode::{
    load_gcode, save_gcode, Dialect, GcodeAssembler, GcodeFile, GcodeLine, GcodeParser, GcodeWriter,
    JobParameters, ToolpathCommand,
};

pub use layerkit_settings::{
    load_settings, save_settings, FffSettings, GenericRepRapSettings, LayerRange, MarlinSettings,
    ProcessSettings, Profile, SettingBinding, SettingValue, SettingsCollection, SettingsError,
    SettingsOverride, SingleMaterialFffSettings, UserSetting,
};

pub use layerkit_generator::{
    GenerationSinks, Generator, GeneratorConfig, LayerStream, PlanError, PlannedLayer, PrintGenerator, PrintLayerData,
    PrintPart, ToolpathPlanner,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Logs go to stderr so command output on stdout stays clean. The level
/// defaults to `info` and follows `RUST_LOG` when set.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
