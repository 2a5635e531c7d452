//! Type aliases for commonly used complex types.
//!
//! This module re-exports type aliases from submodules for convenient access.

pub mod aliases;

pub use aliases::*;
