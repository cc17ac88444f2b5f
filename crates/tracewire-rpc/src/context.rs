//! Per-call context shared by the middleware chain.

use tracewire_core::{MetadataBag, TraceIdentifier};

/// Well-known key under which the resolved identifier is exposed.
pub const TRACE_ID_KEY: &str = tracewire_trace::headers::TRACE_ID;

/// Anything that can hand over the identifier resolved for the current call.
pub trait TraceCarrier {
    fn trace_identifier(&self) -> Option<&TraceIdentifier>;
}

/// Context of one incoming RPC call.
#[derive(Debug, Clone, Default)]
pub struct RpcContext {
    method: String,
    metadata: MetadataBag,
    trace_id: Option<TraceIdentifier>,
}

impl RpcContext {
    pub fn new(method: impl Into<String>, metadata: MetadataBag) -> Self {
        Self {
            method: method.into(),
            metadata,
            trace_id: None,
        }
    }

    /// Full method path, e.g. `/helloworld.Greeter/SayHello`.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Incoming call metadata.
    pub fn metadata(&self) -> &MetadataBag {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataBag {
        &mut self.metadata
    }

    pub fn set_trace_identifier(&mut self, id: TraceIdentifier) {
        self.trace_id = Some(id);
    }
}

impl TraceCarrier for RpcContext {
    fn trace_identifier(&self) -> Option<&TraceIdentifier> {
        self.trace_id.as_ref()
    }
}

impl TraceCarrier for TraceIdentifier {
    fn trace_identifier(&self) -> Option<&TraceIdentifier> {
        Some(self)
    }
}

impl TraceCarrier for Option<TraceIdentifier> {
    fn trace_identifier(&self) -> Option<&TraceIdentifier> {
        self.as_ref()
    }
}
