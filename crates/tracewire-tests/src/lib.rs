//! End-to-end test infrastructure for Tracewire.
//!
//! Wires instrumented clients to server chains through an in-process
//! transport so a trace can be followed across several hops.
//!
//! # Usage
//!
//! ```ignore
//! use tracewire_tests::{Loopback, RecordingHandler};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let backend = Loopback::new(chain);
//!     let client = backend.client(&["sayHello"]);
//! }
//! ```

pub mod fixtures;
pub mod loopback;

pub use fixtures::*;
pub use loopback::Loopback;

/// Initialize test logging (call once per test binary).
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,tracewire_rpc=debug")),
        )
        .with_test_writer()
        .try_init();
}
