//! RPC instrumentation for Tracewire.
//!
//! Two entry points:
//! - [`ServerInterceptor`], a middleware stage that continues or starts a
//!   trace for each incoming call and records server receive/send;
//! - [`instrument_client`], which wraps every method of a client so each
//!   outgoing call carries a child identifier in its metadata.

pub mod args;
pub mod call;
pub mod client;
pub mod config;
pub mod context;
pub mod middleware;
pub mod server;

pub use args::{carries_metadata, rewrite_arguments};
pub use call::{Arg, Call, Callback, ClientMethods, EndSignal, Method, MethodTable};
pub use client::instrument_client;
pub use config::{InstrumentationConfig, MiddlewareOptions};
pub use context::{RpcContext, TRACE_ID_KEY, TraceCarrier};
pub use middleware::{Chain, Handler, Middleware, Next};
pub use server::{ServerInterceptor, resolve_identifier};
