//! Handlers used by the end-to-end tests.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Mutex;
use tokio::sync::oneshot;
use tracewire_core::{Error, Result, TraceIdentifier};
use tracewire_rpc::{
    Arg, Handler, MethodTable, MiddlewareOptions, RpcContext, TraceCarrier, instrument_client,
};

/// Remembers the identifier exposed on every call it serves.
#[derive(Default)]
pub struct RecordingHandler {
    seen: Mutex<Vec<Option<TraceIdentifier>>>,
    fail: bool,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler that fails every call with an `UNAVAILABLE` status.
    pub fn failing() -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn seen(&self) -> Vec<Option<TraceIdentifier>> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Handler for RecordingHandler {
    async fn call(&self, ctx: &mut RpcContext) -> Result<()> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(ctx.trace_identifier().cloned());
        }
        if self.fail {
            return Err(Error::status(14, "unavailable"));
        }
        Ok(())
    }
}

/// Serves each call by calling `method` on a downstream client, instrumented
/// with the incoming call's context.
pub struct ForwardingHandler {
    downstream: MethodTable,
    method: String,
    options: MiddlewareOptions,
}

impl ForwardingHandler {
    pub fn new(downstream: MethodTable, method: impl Into<String>, options: MiddlewareOptions) -> Self {
        Self {
            downstream,
            method: method.into(),
            options,
        }
    }
}

#[async_trait]
impl Handler for ForwardingHandler {
    async fn call(&self, ctx: &mut RpcContext) -> Result<()> {
        let client = instrument_client(self.downstream.clone(), &*ctx, &self.options);
        let response = call_unary(&client, &self.method, json!({ "from": ctx.method() })).await?;
        tracing::debug!(%response, "Downstream call returned");
        Ok(())
    }
}

/// Invoke a unary method with a callback and wait for the callback to fire.
pub async fn call_unary(client: &MethodTable, method: &str, payload: Value) -> Result<Value> {
    let (tx, rx) = oneshot::channel();
    client.invoke(
        method,
        vec![
            payload.into(),
            Arg::callback(move |result| {
                let _ = tx.send(result);
            }),
        ],
    )?;
    rx.await
        .map_err(|e| Error::Internal(format!("callback dropped: {}", e)))?
}
