//! Process-wide logging and span export setup.

use opentelemetry::trace::TracerProvider;
use opentelemetry::{KeyValue, global};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource, runtime,
    trace::{RandomIdGenerator, Sampler},
};
use serde::{Deserialize, Serialize};
use tracewire_core::{Error, Result};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Logging and export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingConfig {
    /// Name reported on exported spans.
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Emit JSON log lines instead of the human-readable format.
    #[serde(default)]
    pub json: bool,
    /// OTLP gRPC endpoint; spans are only exported when set.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub otlp_timeout_seconds: u64,
}

fn default_service_name() -> String {
    "tracewire".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_filter: default_log_filter(),
            json: false,
            otlp_endpoint: None,
            otlp_timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Install the global subscriber described by `config`.
pub fn init_tracing(config: &TracingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    let (plain, json) = if config.json {
        (None, Some(tracing_subscriber::fmt::layer().json().with_target(true)))
    } else {
        (
            Some(tracing_subscriber::fmt::layer().with_target(true).with_thread_ids(true)),
            None,
        )
    };

    let telemetry = match &config.otlp_endpoint {
        Some(endpoint) => Some(otlp_layer(config, endpoint)?),
        None => None,
    };

    tracing_subscriber::registry()
        .with(telemetry)
        .with(env_filter)
        .with(plain)
        .with(json)
        .try_init()
        .map_err(|e| Error::Telemetry(e.to_string()))
}

fn otlp_layer(
    config: &TracingConfig,
    endpoint: &str,
) -> Result<tracing_opentelemetry::OpenTelemetryLayer<Registry, opentelemetry_sdk::trace::Tracer>> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .with_timeout(std::time::Duration::from_secs(config.otlp_timeout_seconds))
        .build()
        .map_err(|e| Error::Telemetry(e.to_string()))?;

    let resource = Resource::new(vec![
        KeyValue::new("service.name", config.service_name.clone()),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);

    // Sampling is decided by the propagated identifiers, not by the exporter.
    let provider = opentelemetry_sdk::trace::TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_sampler(Sampler::AlwaysOn)
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource)
        .build();

    let tracer = provider.tracer("tracewire");
    global::set_tracer_provider(provider);

    Ok(tracing_opentelemetry::layer().with_tracer(tracer))
}

/// Flush exported spans and shut the provider down.
pub fn shutdown_tracing() {
    global::shutdown_tracer_provider();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.service_name, "tracewire");
        assert_eq!(config.log_filter, "info");
        assert!(config.otlp_endpoint.is_none());
    }
}
