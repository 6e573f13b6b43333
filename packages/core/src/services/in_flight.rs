//! Per-project in-flight markers
//!
//! The save/delete pipeline runs its side effects (dimension sync, rename
//! propagation, tag inheritance) exactly once per top-level write. A write
//! performed while its project is already mid-pipeline - for example the
//! direct content rewrites of rename propagation, or bulk copies during
//! project duplication - must not re-trigger those side effects.
//!
//! The registry marks a project as in flight for the duration of one
//! pipeline invocation; the marker is released when the guard drops.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Tracks which projects currently have a pipeline invocation in flight.
#[derive(Default)]
pub struct InFlightRegistry {
    inner: Mutex<HashSet<String>>,
}

impl InFlightRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `project_id` as in flight.
    ///
    /// Returns `None` when the project is already mid-pipeline; the caller
    /// then skips side effects. The returned guard releases the marker on
    /// drop.
    pub fn begin(self: &Arc<Self>, project_id: &str) -> Option<InFlightGuard> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if !inner.insert(project_id.to_string()) {
            return None;
        }
        Some(InFlightGuard {
            registry: Arc::clone(self),
            project_id: project_id.to_string(),
        })
    }

    /// Whether a pipeline invocation is currently in flight for the project.
    pub fn is_in_flight(&self, project_id: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(project_id)
    }

    fn end(&self, project_id: &str) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(project_id);
    }
}

/// Releases the project's in-flight marker on drop.
pub struct InFlightGuard {
    registry: Arc<InFlightRegistry>,
    project_id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.registry.end(&self.project_id);
    }
}
