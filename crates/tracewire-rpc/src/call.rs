//! Client call model: positional arguments, completion and method tables.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracewire_core::{Error, MetadataBag, Result};

/// Completion callback of a unary call.
pub type Callback = Box<dyn FnOnce(Result<Value>) + Send>;

/// One positional argument of a client invocation.
pub enum Arg {
    Payload(Value),
    Metadata(MetadataBag),
    Callback(Callback),
}

impl Arg {
    pub fn callback(f: impl FnOnce(Result<Value>) + Send + 'static) -> Self {
        Arg::Callback(Box::new(f))
    }

    pub fn is_metadata(&self) -> bool {
        matches!(self, Arg::Metadata(_))
    }

    pub fn as_metadata(&self) -> Option<&MetadataBag> {
        match self {
            Arg::Metadata(bag) => Some(bag),
            _ => None,
        }
    }

    pub fn as_payload(&self) -> Option<&Value> {
        match self {
            Arg::Payload(value) => Some(value),
            _ => None,
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Payload(value)
    }
}

impl From<MetadataBag> for Arg {
    fn from(bag: MetadataBag) -> Self {
        Arg::Metadata(bag)
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Payload(value) => f.debug_tuple("Payload").field(value).finish(),
            Arg::Metadata(bag) => f.debug_tuple("Metadata").field(bag).finish(),
            Arg::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

type Listener = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct EndState {
    ended: bool,
    listeners: Vec<Listener>,
}

/// Stream-end event of a call, fired once by the transport.
///
/// Listeners registered after the event has fired run immediately.
#[derive(Clone, Default)]
pub struct EndSignal {
    state: Arc<Mutex<EndState>>,
}

impl EndSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_end(&self, listener: impl FnOnce() + Send + 'static) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.ended {
            drop(state);
            listener();
        } else {
            state.listeners.push(Box::new(listener));
        }
    }

    /// Fire the event; later calls are ignored.
    pub fn end(&self) {
        let listeners = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.ended {
                return;
            }
            state.ended = true;
            std::mem::take(&mut state.listeners)
        };
        for listener in listeners {
            listener();
        }
    }

    pub fn is_ended(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .ended
    }
}

impl fmt::Debug for EndSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndSignal")
            .field("ended", &self.is_ended())
            .finish()
    }
}

/// Handle returned by a client method.
#[derive(Debug, Default)]
pub struct Call {
    response: Option<Value>,
    end: Option<EndSignal>,
}

impl Call {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, response: Value) -> Self {
        self.response = Some(response);
        self
    }

    pub fn with_end_signal(mut self, signal: EndSignal) -> Self {
        self.end = Some(signal);
        self
    }

    pub fn response(&self) -> Option<&Value> {
        self.response.as_ref()
    }

    /// Completion event, for calls that expose one.
    pub fn end_signal(&self) -> Option<&EndSignal> {
        self.end.as_ref()
    }
}

/// A callable client method.
pub type Method = Arc<dyn Fn(Vec<Arg>) -> Result<Call> + Send + Sync>;

/// A client whose methods can be enumerated and replaced.
pub trait ClientMethods {
    /// Visit every method by name, allowing it to be replaced in place.
    fn for_each_method_mut(&mut self, f: &mut dyn FnMut(&str, &mut Method));
}

/// Client described by a name to method mapping.
#[derive(Clone, Default)]
pub struct MethodTable {
    methods: BTreeMap<String, Method>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        method: impl Fn(Vec<Arg>) -> Result<Call> + Send + Sync + 'static,
    ) -> &mut Self {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    /// Invoke a method by name.
    pub fn invoke(&self, name: &str, args: Vec<Arg>) -> Result<Call> {
        let method = self
            .methods
            .get(name)
            .ok_or_else(|| Error::MethodNotFound(name.to_string()))?;
        method(args)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }
}

impl ClientMethods for MethodTable {
    fn for_each_method_mut(&mut self, f: &mut dyn FnMut(&str, &mut Method)) {
        for (name, method) in self.methods.iter_mut() {
            f(name.as_str(), method);
        }
    }
}

impl fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.methods.keys()).finish()
    }
}
