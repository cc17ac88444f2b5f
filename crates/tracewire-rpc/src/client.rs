//! Client proxy: instruments every method of an RPC client so each
//! invocation runs as a child span of the caller's trace.

use crate::args::{carries_metadata, rewrite_arguments};
use crate::call::{Arg, Call, Callback, ClientMethods, Method};
use crate::config::MiddlewareOptions;
use crate::context::TraceCarrier;
use crate::server::record_flags;
use serde_json::Value;
use std::sync::Arc;
use tracewire_core::{Annotation, Result, TraceIdentifier, Tracer};
use tracewire_trace::{client_span, encode};

/// Wrap every method of `client` with trace propagation.
///
/// The identifier carried by `ctx`, if any, is the parent of every call made
/// through the returned client; without one each call starts a new trace.
/// With tracing disabled the client is returned untouched.
pub fn instrument_client<C: ClientMethods>(
    mut client: C,
    ctx: &impl TraceCarrier,
    options: &MiddlewareOptions,
) -> C {
    let Some(tracer) = options.tracer.clone() else {
        return client;
    };

    let instrumentation = Arc::new(ClientInstrumentation {
        tracer,
        base: ctx.trace_identifier().cloned(),
        service_name: options.service_name.clone(),
        port: options.port,
    });

    client.for_each_method_mut(&mut |name: &str, method: &mut Method| {
        let original = method.clone();
        let instrumentation = instrumentation.clone();
        let name = name.to_string();
        *method = Arc::new(move |args: Vec<Arg>| instrumentation.invoke(&name, &original, args));
    });
    client
}

struct ClientInstrumentation {
    tracer: Arc<dyn Tracer>,
    base: Option<TraceIdentifier>,
    service_name: String,
    port: u16,
}

impl ClientInstrumentation {
    fn invoke(&self, name: &str, original: &Method, args: Vec<Arg>) -> Result<Call> {
        if carries_metadata(&args) {
            return original(args);
        }

        let id = match &self.base {
            Some(base) => self.tracer.create_child_id(base),
            None => self.tracer.create_root_id(),
        };
        let args = rewrite_arguments(args, encode(&id), |callback| {
            self.wrap_callback(callback, id.clone())
        });

        let _span = client_span(name, &id).entered();
        self.record_send(name, &id);

        let call = original(args)?;
        if let Some(signal) = call.end_signal() {
            let tracer = self.tracer.clone();
            let id = id.clone();
            signal.on_end(move || {
                tracer.record(&id, Annotation::binary("rpc.end", "call"));
                tracer.record(&id, Annotation::ClientRecv);
            });
        }
        Ok(call)
    }

    fn wrap_callback(&self, callback: Callback, id: TraceIdentifier) -> Callback {
        let tracer = self.tracer.clone();
        Box::new(move |result: Result<Value>| {
            tracer.record(&id, Annotation::binary("rpc.end", "callback"));
            tracer.record(&id, Annotation::ClientRecv);
            callback(result)
        })
    }

    fn record_send(&self, name: &str, id: &TraceIdentifier) {
        let tracer = self.tracer.as_ref();
        tracer.record(id, Annotation::service_name(&self.service_name));
        tracer.record(id, Annotation::rpc("rpc"));
        tracer.record(id, Annotation::binary("rpc.query", name));
        tracer.record(id, Annotation::ClientSend);
        tracer.record(id, Annotation::LocalAddr { port: self.port });
        record_flags(tracer, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::{EndSignal, MethodTable};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;
    use tracewire_core::{Error, HexId, MetadataBag};
    use tracewire_trace::{MemoryTracer, decode_boolean, extract};

    type Captured = Arc<Mutex<Vec<Vec<Arg>>>>;

    /// Client whose methods store their arguments and return an end signal.
    fn capturing_client(captured: &Captured, signal: &EndSignal) -> MethodTable {
        let mut table = MethodTable::new();
        let c = captured.clone();
        let s = signal.clone();
        table.insert("sayHello", move |args: Vec<Arg>| {
            c.lock().unwrap().push(args);
            Ok(Call::new().with_end_signal(s.clone()))
        });
        table.insert("fail", |_args: Vec<Arg>| Err(Error::status(14, "unavailable")));
        table
    }

    fn parent() -> TraceIdentifier {
        TraceIdentifier::root(HexId::from("0000000000000abc")).with_sampled(Some(true))
    }

    fn options(tracer: &Arc<MemoryTracer>) -> MiddlewareOptions {
        MiddlewareOptions::new(tracer.clone())
            .with_service_name("gateway")
            .with_port(8080)
    }

    #[test]
    fn test_zero_args_receive_child_metadata() {
        let tracer = Arc::new(MemoryTracer::new());
        let captured = Captured::default();
        let client = instrument_client(
            capturing_client(&captured, &EndSignal::new()),
            &parent(),
            &options(&tracer),
        );

        client.invoke("sayHello", vec![]).unwrap();

        let mut calls = captured.lock().unwrap();
        let args = calls.pop().unwrap();
        assert_eq!(args.len(), 1);
        let id = extract(args[0].as_metadata().unwrap()).unwrap();
        assert_eq!(id.trace_id, parent().trace_id);
        assert_eq!(id.parent_id, Some(parent().span_id));
        assert_ne!(id.span_id, parent().span_id);
        assert_eq!(id.sampled, Some(true));
    }

    #[test]
    fn test_payload_and_callback_shape() {
        let tracer = Arc::new(MemoryTracer::new());
        let captured = Captured::default();
        let client = instrument_client(
            capturing_client(&captured, &EndSignal::new()),
            &parent(),
            &options(&tracer),
        );

        let received = Arc::new(Mutex::new(None));
        let r = received.clone();
        client
            .invoke(
                "sayHello",
                vec![
                    json!({"name": "world"}).into(),
                    Arg::callback(move |result| {
                        *r.lock().unwrap() = Some(result.map_err(|e| e.to_string()));
                    }),
                ],
            )
            .unwrap();

        let mut args = captured.lock().unwrap().pop().unwrap();
        assert_eq!(args.len(), 3);
        assert_eq!(args[0].as_payload(), Some(&json!({"name": "world"})));
        let metadata = args[1].as_metadata().cloned().unwrap();
        let Arg::Callback(wrapped) = args.remove(2) else {
            panic!("expected callback in third position");
        };

        wrapped(Ok(json!({"message": "hi"})));
        assert_eq!(
            *received.lock().unwrap(),
            Some(Ok(json!({"message": "hi"})))
        );

        let id = extract(&metadata).unwrap();
        assert_eq!(
            tracer.annotations_for(&id.span_id),
            vec![
                Annotation::service_name("gateway"),
                Annotation::rpc("rpc"),
                Annotation::binary("rpc.query", "sayHello"),
                Annotation::ClientSend,
                Annotation::LocalAddr { port: 8080 },
                Annotation::binary("rpc.end", "callback"),
                Annotation::ClientRecv,
            ]
        );
    }

    #[test]
    fn test_existing_metadata_calls_straight_through() {
        let tracer = Arc::new(MemoryTracer::new());
        let captured = Captured::default();
        let client = instrument_client(
            capturing_client(&captured, &EndSignal::new()),
            &parent(),
            &options(&tracer),
        );

        let explicit: MetadataBag = [("authorization", "Bearer t")].into_iter().collect();
        client
            .invoke("sayHello", vec![json!({}).into(), explicit.clone().into()])
            .unwrap();

        let args = captured.lock().unwrap().pop().unwrap();
        assert_eq!(args.len(), 2);
        assert_eq!(args[1].as_metadata(), Some(&explicit));
        assert!(tracer.records().is_empty());
    }

    #[test]
    fn test_end_signal_records_client_receive() {
        let tracer = Arc::new(MemoryTracer::new());
        let captured = Captured::default();
        let signal = EndSignal::new();
        let client = instrument_client(capturing_client(&captured, &signal), &parent(), &options(&tracer));

        client.invoke("sayHello", vec![json!({}).into()]).unwrap();
        let args = captured.lock().unwrap().pop().unwrap();
        let id = extract(args[1].as_metadata().unwrap()).unwrap();
        assert!(!tracer.annotations_for(&id.span_id).contains(&Annotation::ClientRecv));

        signal.end();
        let annotations = tracer.annotations_for(&id.span_id);
        assert_eq!(
            annotations[annotations.len() - 2..].to_vec(),
            vec![Annotation::binary("rpc.end", "call"), Annotation::ClientRecv]
        );
    }

    #[test]
    fn test_each_call_gets_its_own_child() {
        let tracer = Arc::new(MemoryTracer::new());
        let captured = Captured::default();
        let client = instrument_client(
            capturing_client(&captured, &EndSignal::new()),
            &parent(),
            &options(&tracer),
        );

        client.invoke("sayHello", vec![]).unwrap();
        client.invoke("sayHello", vec![]).unwrap();

        let calls = captured.lock().unwrap();
        let first = extract(calls[0][0].as_metadata().unwrap()).unwrap();
        let second = extract(calls[1][0].as_metadata().unwrap()).unwrap();
        assert_ne!(first.span_id, second.span_id);
        assert_eq!(first.parent_id, second.parent_id);
        assert_eq!(first.trace_id, second.trace_id);
    }

    #[test]
    fn test_no_base_starts_new_trace_per_call() {
        let tracer = Arc::new(MemoryTracer::new());
        let captured = Captured::default();
        let client = instrument_client(
            capturing_client(&captured, &EndSignal::new()),
            &None::<TraceIdentifier>,
            &options(&tracer),
        );

        client.invoke("sayHello", vec![]).unwrap();
        let metadata = captured.lock().unwrap()[0][0].as_metadata().cloned().unwrap();
        let id = extract(&metadata).unwrap();
        assert!(id.is_root());
        assert!(decode_boolean(metadata.get("x-b3-sampled").unwrap()));
    }

    #[test]
    fn test_method_error_propagates() {
        let tracer = Arc::new(MemoryTracer::new());
        let client = instrument_client(
            capturing_client(&Captured::default(), &EndSignal::new()),
            &parent(),
            &options(&tracer),
        );

        let err = client.invoke("fail", vec![]).unwrap_err();
        assert!(matches!(err, Error::Status { code: 14, .. }));
        assert!(
            tracer
                .records()
                .iter()
                .any(|r| r.annotation == Annotation::binary("rpc.query", "fail"))
        );
    }

    #[test]
    fn test_flags_are_tagged() {
        let tracer = Arc::new(MemoryTracer::new());
        let captured = Captured::default();
        let client = instrument_client(
            capturing_client(&captured, &EndSignal::new()),
            &parent().with_flags(1),
            &options(&tracer),
        );

        client.invoke("sayHello", vec![]).unwrap();
        let id = extract(captured.lock().unwrap()[0][0].as_metadata().unwrap()).unwrap();
        assert!(
            tracer
                .annotations_for(&id.span_id)
                .contains(&Annotation::binary("X-B3-Flags", "1"))
        );
    }

    #[test]
    fn test_disabled_returns_client_unmodified() {
        let captured = Captured::default();
        let client = instrument_client(
            capturing_client(&captured, &EndSignal::new()),
            &parent(),
            &MiddlewareOptions::disabled(),
        );

        client.invoke("sayHello", vec![json!(1).into()]).unwrap();
        let args = captured.lock().unwrap().pop().unwrap();
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].as_payload(), Some(&json!(1)));
    }
}
