//! Storage Layer
//!
//! This module defines the persistence seam for Strings Core:
//!
//! - [`StringStore`] - async trait abstracting CRUD and lookup operations so
//!   the business services never depend on a concrete storage engine
//! - [`MemoryStore`] - reference implementation backed by in-process maps,
//!   used by the test suite and embeddable hosts
//! - [`StoreError`] - storage error taxonomy (not found, unique constraint,
//!   conflict)
//!
//! Storage engine choice is deliberately out of scope for the core; hosts
//! provide their own `StringStore` implementation over whatever database
//! they run.

mod error;
mod memory_store;
mod store;

pub use error::StoreError;
pub use memory_store::MemoryStore;
pub use store::StringStore;
