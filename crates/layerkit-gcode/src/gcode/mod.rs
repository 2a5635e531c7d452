//! G-code document model and text codec
//!
//! This module provides:
//! - Line and parameter types
//! - The layered document produced by a generation call
//! - Parsing from and writing to the text form

pub mod document;
pub mod line;
pub mod parser;
pub mod writer;

pub use document::*;
pub use line::*;
pub use parser::*;
pub use writer::*;
