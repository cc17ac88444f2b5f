//! Trace context propagation for Tracewire.
//!
//! Provides the B3 header codec, `tracing` span helpers, subscriber and
//! OTLP export setup, and the tracer sinks used by the instrumentation.

pub mod context;
pub mod recorder;
pub mod spans;
pub mod subscriber;

pub use context::{
    decode_boolean, decode_boolean_opt, decode_int_or_absent, encode, encode_sampled, extract,
    has_incoming_trace, headers, inject, read_header,
};
pub use recorder::{LogTracer, MemoryTracer, Record};
pub use spans::{client_span, server_span};
pub use subscriber::{TracingConfig, init_tracing, shutdown_tracing};
