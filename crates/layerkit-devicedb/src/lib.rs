//! # LayerKit Device Database
//!
//! Capability profiles describing a physical machine's hard limits, and a
//! persisted library of such profiles.

pub mod error;
pub mod manager;
pub mod model;

pub use error::{DeviceError, DeviceResult, ProfileError, ProfileResult};
pub use manager::{builtin_profiles, MachineLibrary};
pub use model::{AnyMachine, FffMachineInfo, MachineClass, MachineInfo, MachineProfile};
