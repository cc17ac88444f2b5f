//! The trace identifier propagated across RPC boundaries.

use crate::ids::HexId;
use serde::{Deserialize, Serialize};

/// Debug bit of the flags field.
pub const DEBUG_FLAG: u32 = 1;

/// Identifies one span within a trace.
///
/// Constructed and forwarded by the instrumentation; internal consistency
/// (e.g. a root using its span id as trace id) is the tracer's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceIdentifier {
    pub trace_id: HexId,
    pub parent_id: Option<HexId>,
    pub span_id: HexId,
    /// `None` means the sampling decision is still open.
    pub sampled: Option<bool>,
    pub flags: u32,
}

impl TraceIdentifier {
    /// Create a root identifier: no parent, trace id equal to the span id.
    pub fn root(span_id: HexId) -> Self {
        Self {
            trace_id: span_id.clone(),
            parent_id: None,
            span_id,
            sampled: None,
            flags: 0,
        }
    }

    /// Create a child of `parent` with a new span id.
    ///
    /// The child stays in the parent's trace and inherits its sampling
    /// decision and flags.
    pub fn child_of(parent: &TraceIdentifier, span_id: HexId) -> Self {
        Self {
            trace_id: parent.trace_id.clone(),
            parent_id: Some(parent.span_id.clone()),
            span_id,
            sampled: parent.sampled,
            flags: parent.flags,
        }
    }

    pub fn with_sampled(mut self, sampled: Option<bool>) -> Self {
        self.sampled = sampled;
        self
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_debug(&self) -> bool {
        self.flags & DEBUG_FLAG == DEBUG_FLAG
    }
}
