//! Configuration for the gas oracle server.
//!
//! Loaded once at startup from an optional JSON file and never mutated
//! afterwards; everything downstream receives it by reference or `Arc`.
//! Host and port fall back to environment variables, then to hardcoded
//! defaults. An absent config file means the built-in chain catalog and
//! payment defaults.

use alloy_primitives::{Address, address};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::net::IpAddr;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use crate::chains::{Chain, ChainEndpoints, default_catalog};
use crate::util::MoneyAmount;

/// CLI arguments for the gas oracle server.
#[derive(Parser, Debug)]
#[command(name = "gas402")]
#[command(about = "Multi-chain gas price oracle HTTP server")]
struct CliArgs {
    /// Path to the JSON configuration file
    #[arg(long, short, env = "CONFIG", default_value = "config.json")]
    config: PathBuf,
}

/// Server configuration.
///
/// Fields use serde defaults that fall back to environment variables,
/// then to hardcoded defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "config_defaults::default_port")]
    port: u16,
    #[serde(default = "config_defaults::default_host")]
    host: IpAddr,
    #[serde(default)]
    chains: ChainsConfig,
    #[serde(default)]
    payment: PaymentConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: config_defaults::default_port(),
            host: config_defaults::default_host(),
            chains: ChainsConfig::default(),
            payment: PaymentConfig::default(),
        }
    }
}

pub mod config_defaults {
    use std::env;
    use std::net::IpAddr;

    pub const DEFAULT_PORT: u16 = 8080;
    pub const DEFAULT_HOST: &str = "0.0.0.0";

    /// Returns the default port value with fallback: $PORT env var -> 8080
    pub fn default_port() -> u16 {
        env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT)
    }

    /// Returns the default host value with fallback: $HOST env var -> "0.0.0.0"
    pub fn default_host() -> IpAddr {
        env::var("HOST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(IpAddr::V4(DEFAULT_HOST.parse().unwrap()))
    }
}

/// The configured chain catalog.
///
/// Deserializes from a map keyed by chain identifier, preserving file order:
/// that order drives `fetch_all` iteration and ranking tie-breaks. Keys must
/// name supported chains; an entry without endpoints is rejected at load
/// time.
#[derive(Debug, Clone)]
pub struct ChainsConfig(pub Vec<(Chain, ChainEndpoints)>);

impl Default for ChainsConfig {
    fn default() -> Self {
        ChainsConfig(default_catalog())
    }
}

impl Deref for ChainsConfig {
    type Target = Vec<(Chain, ChainEndpoints)>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ChainsConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{MapAccess, Visitor};
        use std::fmt;

        /// One map value: display name is optional, endpoints are not.
        #[derive(Debug, Deserialize)]
        struct ChainEndpointsEntry {
            #[serde(default)]
            name: Option<String>,
            rpcs: Vec<url::Url>,
        }

        struct ChainsVisitor;

        impl<'de> Visitor<'de> for ChainsVisitor {
            type Value = ChainsConfig;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of chain identifiers to endpoint lists")
            }

            fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut chains = Vec::with_capacity(access.size_hint().unwrap_or(0));

                while let Some(chain) = access.next_key::<Chain>()? {
                    let entry: ChainEndpointsEntry = access.next_value()?;
                    if entry.rpcs.is_empty() {
                        return Err(serde::de::Error::custom(format!(
                            "chain {chain} has no RPC endpoints"
                        )));
                    }
                    let name = entry
                        .name
                        .unwrap_or_else(|| chain.display_name().to_string());
                    chains.push((chain, ChainEndpoints::new(name, entry.rpcs)));
                }

                Ok(ChainsConfig(chains))
            }
        }

        deserializer.deserialize_map(ChainsVisitor)
    }
}

/// Payment settings for the premium tiers.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Wallet receiving premium payments.
    #[serde(default = "payment_defaults::recipient")]
    pub recipient: Address,
    /// Settlement network for the payment currency.
    #[serde(default = "payment_defaults::network")]
    pub network: String,
    #[serde(default = "payment_defaults::currency")]
    pub currency: String,
    #[serde(default)]
    pub pricing: PricingConfig,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        PaymentConfig {
            recipient: payment_defaults::recipient(),
            network: payment_defaults::network(),
            currency: payment_defaults::currency(),
            pricing: PricingConfig::default(),
        }
    }
}

/// Per-tier prices, in the payment currency.
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "payment_defaults::price_all")]
    pub all: MoneyAmount,
    #[serde(default = "payment_defaults::price_recommend")]
    pub recommend: MoneyAmount,
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig {
            all: payment_defaults::price_all(),
            recommend: payment_defaults::price_recommend(),
        }
    }
}

mod payment_defaults {
    use super::*;
    use rust_decimal::Decimal;

    pub fn recipient() -> Address {
        address!("aab80bc6b6040ae845ce225181fd72297ba71b13")
    }

    pub fn network() -> String {
        "base".to_string()
    }

    pub fn currency() -> String {
        "USDC".to_string()
    }

    pub fn price_all() -> MoneyAmount {
        MoneyAmount(Decimal::new(1, 3)) // 0.001
    }

    pub fn price_recommend() -> MoneyAmount {
        MoneyAmount(Decimal::new(5, 4)) // 0.0005
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {0}: {1}")]
    FileRead(PathBuf, std::io::Error),
    #[error("Failed to parse config file: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl Config {
    /// Get the port value.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the host value as an IpAddr.
    pub fn host(&self) -> IpAddr {
        self.host
    }

    /// Get the configured chain catalog, in file order.
    pub fn chains(&self) -> &ChainsConfig {
        &self.chains
    }

    /// Get the payment settings for premium tiers.
    pub fn payment(&self) -> &PaymentConfig {
        &self.payment
    }

    /// Load configuration from CLI arguments and JSON file.
    ///
    /// The config file path comes from `--config <path>` or the `CONFIG` env
    /// var, defaulting to `./config.json`. A missing file is not an error:
    /// the built-in catalog and payment defaults apply, with host/port still
    /// resolved from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let cli_args = CliArgs::parse();
        Self::load_from_path(&cli_args.config)
    }

    /// Load configuration from a specific path, or defaults if it does not exist.
    fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }
}
