//! Server-side interceptor: resolves the call's identifier and records
//! server receive/send around the rest of the chain.

use crate::config::MiddlewareOptions;
use crate::context::RpcContext;
use crate::middleware::{Middleware, Next};
use async_trait::async_trait;
use tracewire_core::{Annotation, MetadataBag, Result, TraceIdentifier, Tracer};
use tracewire_trace::context::{decode_int_or_absent, extract, headers, read_header};
use tracewire_trace::server_span;
use tracing::{Instrument, debug, warn};

/// Middleware stage that continues or starts a trace for each incoming call.
#[derive(Debug, Clone)]
pub struct ServerInterceptor {
    options: MiddlewareOptions,
}

impl ServerInterceptor {
    pub fn new(options: MiddlewareOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MiddlewareOptions {
        &self.options
    }

    fn record_receive(&self, tracer: &dyn Tracer, id: &TraceIdentifier) {
        tracer.record(id, Annotation::service_name(&self.options.service_name));
        tracer.record(id, Annotation::rpc("rpc"));
        tracer.record(id, Annotation::ServerRecv);
        tracer.record(id, Annotation::LocalAddr { port: self.options.port });
        if !self.options.remote_service_name.is_empty() {
            tracer.record(id, Annotation::server_addr(&self.options.remote_service_name));
        }
        record_flags(tracer, id);
    }
}

/// Decide the identifier for an incoming call.
///
/// Incoming B3 headers are continued as-is; otherwise a new root is created,
/// taking its flags from an incoming flags header if one is present.
pub fn resolve_identifier(tracer: &dyn Tracer, metadata: &MetadataBag) -> TraceIdentifier {
    if let Some(id) = extract(metadata) {
        return id;
    }

    let root = tracer.create_root_id();
    match read_header(metadata, headers::FLAGS) {
        Some(flags) if !flags.is_empty() => {
            root.with_flags(decode_int_or_absent(Some(flags)).unwrap_or(0))
        }
        _ => root,
    }
}

/// Tag the span with its flags when any are set.
pub(crate) fn record_flags(tracer: &dyn Tracer, id: &TraceIdentifier) {
    if id.flags != 0 {
        tracer.record(id, Annotation::binary(headers::FLAGS, id.flags.to_string()));
    }
}

#[async_trait]
impl Middleware for ServerInterceptor {
    async fn handle(&self, ctx: &mut RpcContext, next: Next<'_>) -> Result<()> {
        let Some(tracer) = self.options.tracer.clone() else {
            return next.run(ctx).await;
        };

        let id = resolve_identifier(tracer.as_ref(), ctx.metadata());
        debug!(
            method = ctx.method(),
            trace_id = %id.trace_id,
            span_id = %id.span_id,
            root = id.is_root(),
            "Resolved trace identifier"
        );

        self.record_receive(tracer.as_ref(), &id);
        ctx.set_trace_identifier(id.clone());

        let span = server_span(ctx.method(), &id);
        match next.run(ctx).instrument(span).await {
            Ok(()) => {
                tracer.record(&id, Annotation::ServerSend);
                Ok(())
            }
            Err(err) => {
                // No server send on failure; the error goes back untouched.
                warn!(
                    trace_id = %id.trace_id,
                    span_id = %id.span_id,
                    error = %err,
                    "Downstream stage failed"
                );
                Err(err)
            }
        }
    }
}
