//! Instrumentation configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracewire_core::{Error, Result, Tracer};

const UNKNOWN: &str = "unknown";

/// Serializable instrumentation settings, usually loaded from YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentationConfig {
    /// Turn tracing off entirely; the interceptor becomes a pass-through.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Name of this service as reported to the tracer.
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Name of the peer service recorded as the server address.
    #[serde(default = "default_service_name")]
    pub remote_service_name: String,
    /// Local port recorded on every span.
    #[serde(default)]
    pub port: u16,
}

fn default_enabled() -> bool {
    true
}

fn default_service_name() -> String {
    UNKNOWN.to_string()
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            service_name: default_service_name(),
            remote_service_name: default_service_name(),
            port: 0,
        }
    }
}

impl InstrumentationConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from a YAML document.
    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Options shared by the server interceptor and the client proxy.
///
/// A `None` tracer is the disabled sentinel.
#[derive(Clone)]
pub struct MiddlewareOptions {
    pub tracer: Option<Arc<dyn Tracer>>,
    pub service_name: String,
    pub remote_service_name: String,
    pub port: u16,
}

impl MiddlewareOptions {
    pub fn new(tracer: Arc<dyn Tracer>) -> Self {
        Self {
            tracer: Some(tracer),
            ..Self::disabled()
        }
    }

    pub fn disabled() -> Self {
        Self {
            tracer: None,
            service_name: default_service_name(),
            remote_service_name: default_service_name(),
            port: 0,
        }
    }

    /// Build options from loaded configuration.
    pub fn from_config(config: &InstrumentationConfig, tracer: Arc<dyn Tracer>) -> Self {
        let options = if config.enabled {
            Self::new(tracer)
        } else {
            Self::disabled()
        };
        options
            .with_service_name(config.service_name.clone())
            .with_remote_service_name(config.remote_service_name.clone())
            .with_port(config.port)
    }

    /// Set the service name; an empty name falls back to `"unknown"`.
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = or_unknown(name.into());
        self
    }

    /// Set the remote service name; an empty name falls back to `"unknown"`.
    pub fn with_remote_service_name(mut self, name: impl Into<String>) -> Self {
        self.remote_service_name = or_unknown(name.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.tracer.is_some()
    }
}

impl fmt::Debug for MiddlewareOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareOptions")
            .field("enabled", &self.is_enabled())
            .field("service_name", &self.service_name)
            .field("remote_service_name", &self.remote_service_name)
            .field("port", &self.port)
            .finish()
    }
}

fn or_unknown(name: String) -> String {
    if name.is_empty() { default_service_name() } else { name }
}
