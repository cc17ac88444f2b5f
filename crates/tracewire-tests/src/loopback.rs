//! In-process transport connecting client method tables to server chains.

use serde_json::Value;
use std::sync::Arc;
use tracewire_core::MetadataBag;
use tracewire_rpc::{Arg, Call, Callback, Chain, EndSignal, MethodTable, RpcContext};
use tracing::debug;

/// Dispatches client calls into a server [`Chain`] on the current runtime.
///
/// Each call echoes its payload back through the callback and then fires
/// the call's end signal.
#[derive(Clone)]
pub struct Loopback {
    chain: Arc<Chain>,
}

impl Loopback {
    pub fn new(chain: Chain) -> Self {
        Self {
            chain: Arc::new(chain),
        }
    }

    /// Build a client exposing the given method names.
    pub fn client(&self, methods: &[&str]) -> MethodTable {
        let mut table = MethodTable::new();
        for name in methods {
            let chain = self.chain.clone();
            let path = format!("/loopback/{}", name);
            table.insert(*name, move |args: Vec<Arg>| {
                let (payload, metadata, callback) = split(args);
                let signal = EndSignal::new();
                let end = signal.clone();
                let chain = chain.clone();
                let path = path.clone();

                tokio::spawn(async move {
                    let mut ctx = RpcContext::new(path, metadata);
                    let result = chain.dispatch(&mut ctx).await.map(|()| payload);
                    debug!(method = ctx.method(), ok = result.is_ok(), "Loopback call finished");
                    if let Some(callback) = callback {
                        callback(result);
                    }
                    end.end();
                });

                Ok(Call::new().with_end_signal(signal))
            });
        }
        table
    }
}

/// Pick the payload, metadata and callback out of a positional call.
fn split(args: Vec<Arg>) -> (Value, MetadataBag, Option<Callback>) {
    let mut payload = Value::Null;
    let mut metadata = MetadataBag::new();
    let mut callback = None;
    for arg in args {
        match arg {
            Arg::Payload(value) => payload = value,
            Arg::Metadata(bag) => metadata.merge(&bag),
            Arg::Callback(cb) => callback = Some(cb),
        }
    }
    (payload, metadata, callback)
}
