//! # LayerKit Generator
//!
//! The generator contract: ordered parts plus one global settings value in,
//! one complete G-code document out.
//! - `Generator`, the contract, and `PrintGenerator`, its implementation
//! - `ToolpathPlanner`, the seam to external slicing/path planning
//! - Line, layer and progress sinks with cooperative cancellation

pub mod generator;
pub mod part;
pub mod planner;
pub mod sinks;

pub use generator::{Generator, GeneratorConfig, PrintGenerator};
pub use part::PrintPart;
pub use planner::{LayerStream, PlanError, PlannedLayer, ToolpathPlanner};
pub use sinks::{GenerationSinks, PrintLayerData};
