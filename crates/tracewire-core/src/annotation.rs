//! Records handed to the tracer for a span.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One event or tag recorded against a trace identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Annotation {
    ServiceName { name: String },
    Rpc { name: String },
    ServerRecv,
    ServerSend,
    ClientSend,
    ClientRecv,
    LocalAddr { port: u16 },
    ServerAddr { service_name: String },
    BinaryAnnotation { key: String, value: String },
}

impl Annotation {
    pub fn service_name(name: impl Into<String>) -> Self {
        Annotation::ServiceName { name: name.into() }
    }

    pub fn rpc(name: impl Into<String>) -> Self {
        Annotation::Rpc { name: name.into() }
    }

    pub fn server_addr(service_name: impl Into<String>) -> Self {
        Annotation::ServerAddr {
            service_name: service_name.into(),
        }
    }

    pub fn binary(key: impl Into<String>, value: impl Into<String>) -> Self {
        Annotation::BinaryAnnotation {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::ServiceName { name } => write!(f, "service_name={}", name),
            Annotation::Rpc { name } => write!(f, "rpc={}", name),
            Annotation::ServerRecv => write!(f, "sr"),
            Annotation::ServerSend => write!(f, "ss"),
            Annotation::ClientSend => write!(f, "cs"),
            Annotation::ClientRecv => write!(f, "cr"),
            Annotation::LocalAddr { port } => write!(f, "local_addr=:{}", port),
            Annotation::ServerAddr { service_name } => write!(f, "server_addr={}", service_name),
            Annotation::BinaryAnnotation { key, value } => write!(f, "{}={}", key, value),
        }
    }
}
