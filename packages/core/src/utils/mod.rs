//! Utility functions for Strings Core
//!
//! This module provides common utility functions used across the codebase.

mod slug;
mod template;

pub use slug::slugify;
pub use template::{extract_variable_refs, reference_token};
