//! Business Services
//!
//! This module contains the core business logic services:
//!
//! - `StringService` - string variable save/delete pipeline, resolution,
//!   and tag assignment
//! - `ProjectService` - project CRUD and full-project duplication
//! - `DimensionSynchronizer` - keeps container dimensions mirroring their
//!   spawn sets
//! - `resolver` - reference flattening, cycle validation, tag inheritance
//! - `identifier` - collision-free hash and slug generation
//!
//! Services coordinate between the storage layer and application logic,
//! running every top-level write through an explicit ordered pipeline
//! (validate, persist, synchronize, propagate) guarded by per-project
//! in-flight markers.

pub mod dimension_sync;
pub mod error;
pub mod identifier;
pub mod in_flight;
pub mod project_service;
pub mod resolver;
pub mod string_service;

pub use dimension_sync::DimensionSynchronizer;
pub use error::StringServiceError;
pub use in_flight::{InFlightGuard, InFlightRegistry};
pub use project_service::ProjectService;
pub use resolver::DEFAULT_MAX_RESOLUTION_DEPTH;
pub use string_service::{CreateStringParams, StringService, StringServiceConfig};
