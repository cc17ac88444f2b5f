//! Tracewire Core
//!
//! Trace identifiers, metadata bags, annotation records and the tracer port.
//! This crate has minimal dependencies and defines the shared vocabulary
//! used by the codec and the instrumentation facade.

pub mod annotation;
pub mod error;
pub mod ids;
pub mod metadata;
pub mod ports;
pub mod trace_id;

pub use annotation::Annotation;
pub use error::{Error, Result};
pub use ids::HexId;
pub use metadata::MetadataBag;
pub use ports::Tracer;
pub use trace_id::{DEBUG_FLAG, TraceIdentifier};
