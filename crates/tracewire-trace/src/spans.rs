//! `tracing` spans for intercepted RPC calls.

use tracewire_core::TraceIdentifier;
use tracing::{Level, Span, span};

/// Span covering a server-side call, from receive to send.
pub fn server_span(method: &str, id: &TraceIdentifier) -> Span {
    span!(
        Level::INFO,
        "rpc.server",
        rpc.method = method,
        trace.id = id.trace_id.as_str(),
        span.id = id.span_id.as_str(),
        trace.parent_id = id.parent_id.as_ref().map(|p| p.as_str()).unwrap_or(""),
        trace.sampled = id.sampled.unwrap_or(false),
    )
}

/// Span covering one outgoing client invocation.
pub fn client_span(method: &str, id: &TraceIdentifier) -> Span {
    span!(
        Level::DEBUG,
        "rpc.client",
        rpc.method = method,
        trace.id = id.trace_id.as_str(),
        span.id = id.span_id.as_str(),
        trace.parent_id = id.parent_id.as_ref().map(|p| p.as_str()).unwrap_or(""),
    )
}
