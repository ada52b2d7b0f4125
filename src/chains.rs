//! Supported chains and their default RPC endpoints.
//!
//! This module defines the closed set of chains the oracle can query, plus a
//! statically known endpoint catalog used when no configuration file is
//! provided. Chain identifiers are validated at the edge: an identifier that
//! does not parse into [`Chain`] never reaches the network layer.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use url::Url;

/// Chains with a gas-price market the oracle knows how to query.
///
/// The set is closed on purpose: handlers parse raw identifiers into this
/// enum, so an unsupported chain is rejected before any RPC call is built.
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Chain {
    /// Ethereum mainnet (chain ID 1).
    #[serde(rename = "ethereum")]
    Ethereum,
    /// Base mainnet (chain ID 8453).
    #[serde(rename = "base")]
    Base,
    /// Arbitrum One (chain ID 42161).
    #[serde(rename = "arbitrum")]
    Arbitrum,
    /// Optimism mainnet (chain ID 10).
    #[serde(rename = "optimism")]
    Optimism,
    /// Polygon PoS (chain ID 137).
    #[serde(rename = "polygon")]
    Polygon,
}

impl Chain {
    /// Return all known [`Chain`] variants, in catalog order.
    pub fn variants() -> &'static [Chain] {
        &[
            Chain::Ethereum,
            Chain::Base,
            Chain::Arbitrum,
            Chain::Optimism,
            Chain::Polygon,
        ]
    }

    /// Human-readable chain name for display and recommendation output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Chain::Ethereum => "Ethereum",
            Chain::Base => "Base",
            Chain::Arbitrum => "Arbitrum One",
            Chain::Optimism => "Optimism",
            Chain::Polygon => "Polygon",
        }
    }
}

impl Display for Chain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Chain::Ethereum => write!(f, "ethereum"),
            Chain::Base => write!(f, "base"),
            Chain::Arbitrum => write!(f, "arbitrum"),
            Chain::Optimism => write!(f, "optimism"),
            Chain::Polygon => write!(f, "polygon"),
        }
    }
}

/// Error returned when a raw identifier does not name a supported chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown chain: {0}")]
pub struct ChainParseError(pub String);

impl FromStr for Chain {
    type Err = ChainParseError;

    /// Case-insensitive parse: `"Ethereum"`, `"ETHEREUM"` and `"ethereum"`
    /// all name the same chain.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ethereum" => Ok(Chain::Ethereum),
            "base" => Ok(Chain::Base),
            "arbitrum" => Ok(Chain::Arbitrum),
            "optimism" => Ok(Chain::Optimism),
            "polygon" => Ok(Chain::Polygon),
            _ => Err(ChainParseError(s.to_string())),
        }
    }
}

/// Endpoint list for one chain.
///
/// Invariant: `rpcs` is non-empty; the configuration loader rejects entries
/// without endpoints. Order is failover priority, first-listed tried first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEndpoints {
    /// Display name shown in readings and recommendations.
    pub name: String,
    /// JSON-RPC endpoints, in failover order.
    pub rpcs: Vec<Url>,
}

impl ChainEndpoints {
    pub fn new(name: impl Into<String>, rpcs: Vec<Url>) -> Self {
        Self {
            name: name.into(),
            rpcs,
        }
    }
}

/// Built-in endpoint catalog, used when the config file omits `chains`.
///
/// All endpoints are public, keyless RPC providers.
static DEFAULT_CATALOG: Lazy<Vec<(Chain, ChainEndpoints)>> = Lazy::new(|| {
    let urls = |raw: &[&str]| {
        raw.iter()
            .map(|u| Url::parse(u).expect("static endpoint URL is valid"))
            .collect()
    };
    vec![
        (
            Chain::Ethereum,
            ChainEndpoints::new(
                Chain::Ethereum.display_name(),
                urls(&[
                    "https://ethereum.publicnode.com",
                    "https://eth.drpc.org",
                    "https://1rpc.io/eth",
                ]),
            ),
        ),
        (
            Chain::Base,
            ChainEndpoints::new(
                Chain::Base.display_name(),
                urls(&[
                    "https://base.publicnode.com",
                    "https://base.drpc.org",
                    "https://1rpc.io/base",
                ]),
            ),
        ),
        (
            Chain::Arbitrum,
            ChainEndpoints::new(
                Chain::Arbitrum.display_name(),
                urls(&[
                    "https://arbitrum-one.publicnode.com",
                    "https://arb1.arbitrum.io/rpc",
                ]),
            ),
        ),
        (
            Chain::Optimism,
            ChainEndpoints::new(
                Chain::Optimism.display_name(),
                urls(&[
                    "https://optimism.publicnode.com",
                    "https://mainnet.optimism.io",
                ]),
            ),
        ),
        (
            Chain::Polygon,
            ChainEndpoints::new(
                Chain::Polygon.display_name(),
                urls(&[
                    "https://polygon-bor.publicnode.com",
                    "https://polygon-rpc.com",
                ]),
            ),
        ),
    ]
});

/// Default catalog of chains and endpoints, in catalog order.
pub fn default_catalog() -> Vec<(Chain, ChainEndpoints)> {
    DEFAULT_CATALOG.clone()
}
