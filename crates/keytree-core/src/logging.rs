//! Logging facilities for keytree.
//!
//! keytree uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!     // ...
//! }
//! ```
//!
//! The model logs node events at debug level and registry bookkeeping at
//! trace level; filter with the constants in [`targets`], e.g.
//! `RUST_LOG=keytree::model=debug`.

/// Span names used throughout keytree for tracing.
pub mod span_names {
    /// Expanded-namespace restore pass.
    pub const RESTORE: &str = "keytree::restore";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "keytree_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "keytree_core::signal";
    /// Tree model target.
    pub const MODEL: &str = "keytree::model";
    /// Position registry target.
    pub const REGISTRY: &str = "keytree::model::registry";
    /// Settings store target.
    pub const SETTINGS: &str = "keytree::settings";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Useful for tracking the duration of an operation.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "keytree::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
