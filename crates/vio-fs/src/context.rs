//! Per-run correlation token passed through every VIO call

use uuid::Uuid;

/// Opaque handle for one sync run.
///
/// The VIO layer never reads anything from it except the run id, and only
/// to tag trace events. Engine-level state (current replica, options)
/// lives in the engine, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Context {
    run_id: Uuid,
}

impl Context {
    /// Create a context with a fresh random run id.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
        }
    }

    /// Create a context for an existing run id.
    pub fn with_run_id(run_id: Uuid) -> Self {
        Self { run_id }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
