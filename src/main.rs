//! gas402 HTTP entrypoint.
//!
//! This binary launches an Axum-based HTTP server exposing the gas oracle:
//!
//! Endpoints:
//! - `GET /` – Service descriptor with pricing
//! - `GET /healthz` – Liveness probe
//! - `GET /chains` – Supported chain catalog
//! - `GET /gas/{chain}` – Free single-chain gas price
//! - `GET /premium/all` – Paid: every chain in one call
//! - `GET /premium/recommend` – Paid: cheapest-chain recommendation
//! - `GET /registration.json` – Service registration document
//!
//! Environment:
//! - `.env` values loaded at startup
//! - `HOST`, `PORT` control the binding address
//! - `CONFIG` points at the JSON configuration file
//! - `OTEL_*` variables enable span export

use axum::http::Method;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors;
use tower_http::trace::TraceLayer;

use gas402::config::Config;
use gas402::gas::fetcher::HttpGasRpc;
use gas402::gas::oracle::GasOracle;
use gas402::handlers::{self, AppState};
use gas402::paygate::{HeaderPresenceVerifier, PaymentGate};
use gas402::telemetry::Telemetry;
use gas402::util::SigDown;

/// Initializes the gas oracle server.
///
/// - Loads `.env` variables and the JSON configuration.
/// - Installs the tracing subscriber.
/// - Builds the oracle over the configured chain catalog and the payment
///   gate over the configured pricing.
/// - Serves the Axum router until SIGTERM/SIGINT.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _telemetry = Telemetry::init();

    let config = Config::load()?;

    let rpc = HttpGasRpc::new()?;
    let oracle = GasOracle::new(config.chains().to_vec(), rpc);
    let gate = PaymentGate::from_config(HeaderPresenceVerifier, config.payment());
    let state = Arc::new(AppState { oracle, gate });

    let app = handlers::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            cors::CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods([Method::GET])
                .allow_headers(cors::Any),
        );

    let addr = SocketAddr::new(config.host(), config.port());
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        });

    let sig_down = SigDown::try_new()?;
    let cancellation_token = sig_down.cancellation_token();
    let graceful_shutdown = async move { cancellation_token.cancelled().await };
    axum::serve(listener, app)
        .with_graceful_shutdown(graceful_shutdown)
        .await?;

    Ok(())
}
