//! Dialect selection
//!
//! Each settings type registers the assembler for its machine family through
//! [`ProcessSettings::assembler_factory`]. Generators go through
//! [`select_assembler`] so the choice is logged in one place.

use crate::process::ProcessSettings;
use layerkit_core::ConfigurationError;
use layerkit_gcode::{AssemblerFactory, GcodeAssembler};

/// The assembler factory registered for the settings' type
pub fn select_assembler<S: ProcessSettings>(
    settings: &S,
) -> Result<AssemblerFactory, ConfigurationError> {
    let factory = settings.assembler_factory()?;
    tracing::debug!(
        "Selected {} assembler for {}",
        factory().dialect(),
        std::any::type_name::<S>()
    );
    Ok(factory)
}

/// Construct a fresh assembler for the settings' type
pub fn new_assembler<S: ProcessSettings>(
    settings: &S,
) -> Result<Box<dyn GcodeAssembler>, ConfigurationError> {
    select_assembler(settings).map(|factory| factory())
}
