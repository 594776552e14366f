use std::collections::HashMap;

use serde::Deserialize;

/// Configuration for log output and `OpenTelemetry` tracing.
///
/// When `enabled`, spans for every processed message (dedup check, credential
/// fetch, dispatch, record, acknowledge) are exported via OTLP.
///
/// # Example
///
/// ```toml
/// [telemetry]
/// json = true
/// enabled = true
/// endpoint = "http://localhost:4317"
/// service_name = "seedbomb-worker"
/// protocol = "grpc"
/// ```
#[derive(Debug, Deserialize)]
pub struct TelemetryConfig {
    /// Emit logs as JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
    /// Whether `OpenTelemetry` tracing is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// OTLP exporter endpoint.
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    /// Service name reported in traces.
    #[serde(default = "default_otel_service_name")]
    pub service_name: String,
    /// Sampling ratio (0.0 to 1.0).
    #[serde(default = "default_otel_sample_ratio")]
    pub sample_ratio: f64,
    /// OTLP transport protocol.
    #[serde(default)]
    pub protocol: OtlpProtocol,
    /// Exporter timeout in seconds.
    #[serde(default = "default_otel_timeout")]
    pub timeout_seconds: u64,
    /// Additional resource attributes.
    #[serde(default)]
    pub resource_attributes: HashMap<String, String>,
}

/// OTLP transport used to export spans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtlpProtocol {
    /// gRPC via tonic (default port 4317).
    #[default]
    Grpc,
    /// HTTP/protobuf (default port 4318).
    Http,
}

impl std::fmt::Display for OtlpProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Grpc => "grpc",
            Self::Http => "http",
        })
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            json: false,
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_otel_service_name(),
            sample_ratio: default_otel_sample_ratio(),
            protocol: OtlpProtocol::default(),
            timeout_seconds: default_otel_timeout(),
            resource_attributes: HashMap::new(),
        }
    }
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_owned()
}

fn default_otel_service_name() -> String {
    "seedbomb-worker".to_owned()
}

fn default_otel_sample_ratio() -> f64 {
    1.0
}

fn default_otel_timeout() -> u64 {
    10
}
