//! Multi-chain gas price oracle with 402-gated premium views.
//!
//! The service answers "what does gas cost right now on chain X" by querying
//! public JSON-RPC endpoints, failing over across each chain's endpoint list,
//! and classifying the price into a congestion level. On top of the free
//! per-chain read, aggregate and recommendation views are gated behind an
//! HTTP 402 payment flow in the x402 style.
//!
//! # Modules
//!
//! - [`chains`] — The closed set of supported chains and the built-in
//!   endpoint catalog.
//! - [`config`] — Server configuration: chain catalog, payment settings,
//!   host/port with environment fallbacks.
//! - [`gas`] — The retrieval engine: price model, endpoint failover fetcher,
//!   and the cross-chain aggregator/ranker.
//! - [`paygate`] — The premium-access gate: pluggable payment verification
//!   and 402 quote responses.
//! - [`handlers`] — Axum route handlers for the free and premium endpoints.
//! - [`telemetry`] — Tracing bootstrap with optional OTLP export.
//! - [`util`] — Money amounts and shutdown signal handling.
//!
//! # Failure model
//!
//! Per-chain problems are data, not exceptions: an aggregate response always
//! contains one entry per configured chain, successful or not. Only an
//! unresolvable chain identifier and a recommendation with zero data are
//! client-facing errors.

pub mod chains;
pub mod config;
pub mod gas;
pub mod handlers;
pub mod paygate;
pub mod telemetry;
pub mod util;
