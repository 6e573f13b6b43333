//! Data Models
//!
//! This module contains the core data structures used throughout Strings:
//!
//! - `Project` - Scoping boundary that owns strings and dimensions
//! - `StringVariable` - A named, content-bearing unit whose content may embed
//!   `{{name}}` references to other variables
//! - `Dimension` / `DimensionValue` - The choice space of a conditional
//!   container variable
//! - `StringDimensionValue` - Tag assigning a dimension value to a string
//!
//! All entities carry string ids (UUID v4) and `chrono` timestamps.

mod dimension;
mod project;
mod string_variable;

pub use dimension::{Dimension, DimensionValue, StringDimensionValue};
pub use project::Project;
pub use string_variable::{
    StringVariable, StringVariableUpdate, ValidationError, MAX_IDENTIFIER_LENGTH,
};
