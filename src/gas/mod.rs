//! Gas price retrieval engine.
//!
//! - [`price`] — wei/gwei values and congestion levels.
//! - [`fetcher`] — per-chain endpoint failover over JSON-RPC.
//! - [`oracle`] — cross-chain aggregation and cheapest-chain ranking.
//!
//! Everything here is request-scoped: a reading is produced fresh per call
//! and never cached.

pub mod fetcher;
pub mod oracle;
pub mod price;

use serde::Serialize;
use std::fmt::{self, Display};

use crate::chains::Chain;
use crate::gas::price::{GasLevel, GasPrice};

/// A successful gas price fetch for one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GasReading {
    pub chain: Chain,
    pub name: String,
    pub gas_price: GasPrice,
    pub level: GasLevel,
}

impl GasReading {
    pub fn new(chain: Chain, name: impl Into<String>, gas_price: GasPrice) -> Self {
        let level = gas_price.level();
        Self {
            chain,
            name: name.into(),
            gas_price,
            level,
        }
    }
}

/// A failed fetch, carried as data in aggregate responses rather than raised.
///
/// `chain` is absent for identifiers that never resolved to a known chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainFailure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<Chain>,
    pub error: String,
}

impl ChainFailure {
    /// The identifier does not name a supported, configured chain. Produced
    /// before any network call.
    pub fn unknown(raw: &str) -> Self {
        Self {
            chain: None,
            error: format!("Unknown chain: {raw}"),
        }
    }

    /// Every configured endpoint for the chain was tried and none produced a
    /// usable result.
    pub fn all_rpcs_failed(chain: Chain) -> Self {
        Self {
            chain: Some(chain),
            error: "All RPCs failed".to_string(),
        }
    }
}

impl Display for ChainFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chain {
            Some(chain) => write!(f, "{}: {}", chain, self.error),
            None => write!(f, "{}", self.error),
        }
    }
}
