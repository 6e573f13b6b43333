//! Strings Core Business Logic Layer
//!
//! This crate provides the variable resolution and dimension
//! synchronization engine for the Strings content-management tool.
//!
//! # Architecture
//!
//! - **Variable resolution**: `{{name}}` references embedded in string
//!   content are flattened recursively against the project's variable set,
//!   with cycle validation on write and a hard depth bound on read
//! - **Dimension synchronization**: every conditional container variable
//!   owns exactly one dimension whose values mirror its tagged spawn
//!   variables, kept consistent across renames, deletions, and conversions
//! - **Store abstraction**: all persistence goes through the async
//!   [`db::StringStore`] trait; transport, auth, and storage engine choice
//!   live in the host
//!
//! # Modules
//!
//! - [`models`] - Data structures (Project, StringVariable, Dimension, ...)
//! - [`services`] - Business services (StringService, ProjectService, ...)
//! - [`db`] - Storage abstraction and in-memory reference store
//! - [`utils`] - Reference parsing and slugification
//! - [`logging`] - Optional tracing subscriber setup for hosts

pub mod db;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use db::{MemoryStore, StoreError, StringStore};
pub use models::*;
pub use services::*;
