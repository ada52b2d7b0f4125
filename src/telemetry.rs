//! Tracing bootstrap.
//!
//! Structured logs always go through `tracing` with an `EnvFilter` (RUST_LOG
//! controls verbosity, default `info`). When the standard `OTEL_EXPORTER_*`
//! environment variables are present, spans are additionally exported over
//! OTLP; without them the process logs locally and nothing else.

use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler, SdkTracerProvider};
use opentelemetry_semantic_conventions::{
    SCHEMA_URL,
    attribute::{DEPLOYMENT_ENVIRONMENT_NAME, SERVICE_VERSION},
};
use std::env;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Telemetry protocol to use for OTLP export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TelemetryProtocol {
    Http,
    Grpc,
}

impl TelemetryProtocol {
    /// Determines the telemetry protocol from environment variables, if OTEL
    /// is configured at all.
    fn from_env() -> Option<Self> {
        let is_enabled = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok()
            || env::var("OTEL_EXPORTER_OTLP_HEADERS").is_ok()
            || env::var("OTEL_EXPORTER_OTLP_PROTOCOL").is_ok();
        if !is_enabled {
            return None;
        }
        let protocol = match env::var("OTEL_EXPORTER_OTLP_PROTOCOL").as_deref() {
            Ok("grpc") => TelemetryProtocol::Grpc,
            _ => TelemetryProtocol::Http,
        };
        Some(protocol)
    }
}

/// Generates a semantic OpenTelemetry `Resource` describing this service.
fn resource() -> Resource {
    let deployment_env = env::var("DEPLOYMENT_ENV").unwrap_or_else(|_| "develop".to_string());
    Resource::builder()
        .with_service_name(env!("CARGO_PKG_NAME"))
        .with_schema_url(
            [
                KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
                KeyValue::new(DEPLOYMENT_ENVIRONMENT_NAME, deployment_env),
            ],
            SCHEMA_URL,
        )
        .build()
}

/// Initializes the OpenTelemetry tracer provider for the selected protocol.
fn init_tracer_provider(protocol: TelemetryProtocol) -> SdkTracerProvider {
    let exporter = opentelemetry_otlp::SpanExporter::builder();
    let exporter = match protocol {
        TelemetryProtocol::Http => exporter.with_http().build(),
        TelemetryProtocol::Grpc => exporter.with_tonic().build(),
    };
    let exporter = exporter.expect("Failed to build OTLP span exporter");

    SdkTracerProvider::builder()
        .with_sampler(Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(
            1.0,
        ))))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource())
        .with_batch_exporter(exporter)
        .build()
}

/// Wrapper for the tracer provider, for graceful shutdown on drop.
pub struct Telemetry {
    tracer_provider: Option<SdkTracerProvider>,
}

impl Telemetry {
    /// Installs the global tracing subscriber.
    ///
    /// OTLP span export is layered on only when configured via environment.
    pub fn init() -> Self {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        match TelemetryProtocol::from_env() {
            Some(protocol) => {
                let tracer_provider = init_tracer_provider(protocol);
                let tracer = tracer_provider.tracer(env!("CARGO_PKG_NAME"));
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer())
                    .with(OpenTelemetryLayer::new(tracer))
                    .init();
                tracing::info!("OpenTelemetry span export enabled via {:?}", protocol);
                Self {
                    tracer_provider: Some(tracer_provider),
                }
            }
            None => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer())
                    .init();
                tracing::info!("OpenTelemetry is not enabled");
                Self {
                    tracer_provider: None,
                }
            }
        }
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::init()
    }
}

/// Graceful shutdown for Telemetry.
impl Drop for Telemetry {
    fn drop(&mut self) {
        if let Some(tracer_provider) = self.tracer_provider.as_ref() {
            if let Err(err) = tracer_provider.shutdown() {
                eprintln!("{err:?}");
            }
        }
    }
}
