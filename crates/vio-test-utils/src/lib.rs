//! Shared test utilities for the vio workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`scratch`]: [`ScratchDir`] with the `csync_test` directory layout
//! - [`logging`]: tracing subscriber for test output

pub mod logging;
pub mod scratch;

pub use scratch::{ModeGuard, ScratchDir, is_root};
