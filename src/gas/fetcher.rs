//! Endpoint failover fetcher for `eth_gasPrice`.
//!
//! One chain, many endpoints: the fetcher walks the configured endpoint list
//! in order and returns the first usable price. Every per-endpoint problem —
//! timeout, refused connection, garbage body, a reply without a `result` —
//! is an [`AttemptError`] value that drives the loop to the next endpoint.
//! There is no retry of a failed endpoint and no backoff; the endpoint list
//! is the whole resilience budget.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;
use url::Url;

use crate::chains::{Chain, ChainEndpoints};
use crate::gas::price::{GasPrice, GasPriceError};
use crate::gas::{ChainFailure, GasReading};

/// Timeout for a single endpoint call. The only cancellation mechanism.
pub const RPC_TIMEOUT: Duration = Duration::from_secs(5);

/// JSON-RPC 2.0 call body for `eth_gasPrice`.
///
/// Serializes to `{"jsonrpc":"2.0","method":"eth_gasPrice","params":[],"id":1}`,
/// the exact shape public EVM endpoints expect.
#[derive(Debug, Clone, Serialize)]
pub struct GasPriceCall {
    jsonrpc: &'static str,
    method: &'static str,
    params: [u8; 0],
    id: u32,
}

impl Default for GasPriceCall {
    fn default() -> Self {
        Self {
            jsonrpc: "2.0",
            method: "eth_gasPrice",
            params: [],
            id: 1,
        }
    }
}

/// The part of a JSON-RPC reply the fetcher cares about.
///
/// A reply that parses but carries no `result` (error replies included) is
/// not usable and falls through to the next endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GasPriceReply {
    #[serde(default)]
    pub result: Option<String>,
}

/// Why a single endpoint attempt produced no price.
///
/// All variants are soft: they are logged at debug level and suppressed by
/// failover, surfacing only as an eventual [`ChainFailure`] when every
/// endpoint is exhausted.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("response body is not valid JSON-RPC: {0}")]
    MalformedBody(String),
    #[error("response carries no result")]
    MissingResult,
    #[error(transparent)]
    BadPrice(#[from] GasPriceError),
}

/// A transport that can issue one `eth_gasPrice` call against one endpoint.
///
/// This is the seam between the failover policy and the network: production
/// uses [`HttpGasRpc`], tests substitute a scripted transport and count
/// attempts.
pub trait GasRpc: Send + Sync {
    fn gas_price(
        &self,
        endpoint: &Url,
    ) -> impl Future<Output = Result<GasPriceReply, AttemptError>> + Send;
}

impl<T: GasRpc> GasRpc for std::sync::Arc<T> {
    fn gas_price(
        &self,
        endpoint: &Url,
    ) -> impl Future<Output = Result<GasPriceReply, AttemptError>> + Send {
        self.as_ref().gas_price(endpoint)
    }
}

/// Production transport: HTTP POST via a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpGasRpc {
    client: reqwest::Client,
}

impl HttpGasRpc {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(RPC_TIMEOUT)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        Ok(Self { client })
    }
}

impl GasRpc for HttpGasRpc {
    async fn gas_price(&self, endpoint: &Url) -> Result<GasPriceReply, AttemptError> {
        let response = self
            .client
            .post(endpoint.clone())
            .json(&GasPriceCall::default())
            .send()
            .await
            .map_err(|e| AttemptError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| AttemptError::Transport(e.to_string()))?;
        response
            .json::<GasPriceReply>()
            .await
            .map_err(|e| AttemptError::MalformedBody(e.to_string()))
    }
}

/// Fetches the gas price for one chain, failing over across its endpoints.
#[derive(Debug, Clone)]
pub struct GasFetcher<T> {
    rpc: T,
}

impl<T: GasRpc> GasFetcher<T> {
    pub fn new(rpc: T) -> Self {
        Self { rpc }
    }

    /// Try each endpoint in configured order; the first success wins and no
    /// further endpoints are contacted.
    #[instrument(skip_all, fields(%chain))]
    pub async fn fetch(
        &self,
        chain: Chain,
        endpoints: &ChainEndpoints,
    ) -> Result<GasReading, ChainFailure> {
        for endpoint in &endpoints.rpcs {
            match self.attempt(endpoint).await {
                Ok(gas_price) => {
                    tracing::debug!(%endpoint, gwei = %gas_price.gwei(), "gas price fetched");
                    return Ok(GasReading::new(chain, endpoints.name.clone(), gas_price));
                }
                Err(error) => {
                    tracing::debug!(%endpoint, %error, "endpoint attempt failed, failing over");
                }
            }
        }
        tracing::warn!(%chain, "all endpoints exhausted");
        Err(ChainFailure::all_rpcs_failed(chain))
    }

    async fn attempt(&self, endpoint: &Url) -> Result<GasPrice, AttemptError> {
        let reply = self.rpc.gas_price(endpoint).await?;
        let hex = reply.result.ok_or(AttemptError::MissingResult)?;
        Ok(GasPrice::from_hex_wei(&hex)?)
    }
}
