//! Port traits for the tracing collaborator.
//!
//! The instrumentation never relies on an ambient "current" identifier:
//! every record call names the identifier it belongs to.

use crate::annotation::Annotation;
use crate::trace_id::TraceIdentifier;

/// Sink that creates identifiers and records annotations against them.
pub trait Tracer: Send + Sync {
    /// Create a fresh root identifier.
    fn create_root_id(&self) -> TraceIdentifier;

    /// Create a child of `parent` with a new span id.
    fn create_child_id(&self, parent: &TraceIdentifier) -> TraceIdentifier;

    /// Record an annotation for the span named by `id`.
    fn record(&self, id: &TraceIdentifier, annotation: Annotation);
}
