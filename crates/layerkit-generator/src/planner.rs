//! Toolpath planner seam
//!
//! Slicing and path planning live outside this crate. A planner turns one
//! part's model into a lazy stream of layers of machine-independent
//! commands; the generator pulls layers one at a time.

use layerkit_gcode::ToolpathCommand;
use layerkit_settings::ProcessSettings;
use thiserror::Error;

/// A planner failure
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{reason}")]
pub struct PlanError {
    /// Layer being planned, when known
    pub layer_index: Option<usize>,
    pub reason: String,
}

impl PlanError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            layer_index: None,
            reason: reason.into(),
        }
    }

    pub fn at_layer(layer_index: usize, reason: impl Into<String>) -> Self {
        Self {
            layer_index: Some(layer_index),
            reason: reason.into(),
        }
    }
}

/// One planned manufacturing layer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlannedLayer {
    /// Layer index within the part, starting at 0
    pub index: usize,
    /// Top of the layer in mm
    pub z: f64,
    pub commands: Vec<ToolpathCommand>,
}

impl PlannedLayer {
    pub fn new(index: usize, z: f64) -> Self {
        Self {
            index,
            z,
            commands: Vec::new(),
        }
    }

    pub fn with_commands(mut self, commands: Vec<ToolpathCommand>) -> Self {
        self.commands = commands;
        self
    }
}

/// Lazily produced layers of one part
pub type LayerStream<'a> = Box<dyn Iterator<Item = Result<PlannedLayer, PlanError>> + 'a>;

/// Turns one part into layers of toolpath commands.
///
/// Given identical inputs a planner produces identical layers.
pub trait ToolpathPlanner<S: ProcessSettings> {
    /// The part geometry this planner understands
    type Model;

    fn plan_part<'a>(
        &'a self,
        part_index: usize,
        model: &'a Self::Model,
        settings: &'a S,
    ) -> Result<LayerStream<'a>, PlanError>;
}
