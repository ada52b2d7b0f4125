//! Cross-chain aggregation and cheapest-chain recommendation.
//!
//! The oracle runs the failover fetcher over every configured chain. Chains
//! are independent: fetches are issued concurrently and one chain's failure
//! never aborts the batch — failures travel as [`ChainFailure`] entries in
//! the output. Only a recommendation with zero successful readings is an
//! actual error.

use futures_util::future::join_all;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use tracing::instrument;

use crate::chains::{Chain, ChainEndpoints};
use crate::gas::fetcher::{GasFetcher, GasRpc};
use crate::gas::{ChainFailure, GasReading};

/// Errors surfaced by oracle operations (as opposed to per-chain failures,
/// which are data).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("no gas data available from any configured chain")]
    NoData,
}

/// One row of a [`Recommendation`] ranking, cheapest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingEntry {
    pub chain: Chain,
    pub name: String,
    pub gwei: Decimal,
}

/// The cheapest chain to transact on right now, with the full ranking of
/// chains that produced data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub recommendation: Chain,
    pub reason: String,
    pub ranking: Vec<RankingEntry>,
}

/// Multi-chain gas oracle over a configured chain catalog.
///
/// The catalog is fixed at construction and never mutated; every operation
/// reads it and produces request-scoped output.
#[derive(Debug, Clone)]
pub struct GasOracle<T> {
    catalog: Vec<(Chain, ChainEndpoints)>,
    fetcher: GasFetcher<T>,
}

impl<T: GasRpc> GasOracle<T> {
    pub fn new(catalog: Vec<(Chain, ChainEndpoints)>, rpc: T) -> Self {
        Self {
            catalog,
            fetcher: GasFetcher::new(rpc),
        }
    }

    /// Configured chain identifiers, in catalog order. No network access.
    pub fn chains(&self) -> Vec<Chain> {
        self.catalog.iter().map(|(chain, _)| *chain).collect()
    }

    /// Resolve a raw identifier (case-insensitive) against the catalog.
    ///
    /// Fails without any network call when the identifier is not a supported
    /// chain or the chain is not configured.
    pub fn lookup(&self, raw: &str) -> Result<Chain, ChainFailure> {
        let id = raw.to_ascii_lowercase();
        let chain = Chain::from_str(&id).map_err(|_| ChainFailure::unknown(&id))?;
        if self.catalog.iter().any(|(c, _)| *c == chain) {
            Ok(chain)
        } else {
            Err(ChainFailure::unknown(&id))
        }
    }

    /// Fetch the gas price for one configured chain.
    pub async fn fetch(&self, chain: Chain) -> Result<GasReading, ChainFailure> {
        let endpoints = self
            .catalog
            .iter()
            .find(|(c, _)| *c == chain)
            .map(|(_, endpoints)| endpoints)
            .ok_or_else(|| ChainFailure::unknown(&chain.to_string()))?;
        self.fetcher.fetch(chain, endpoints).await
    }

    /// Fetch the gas price for a raw identifier, validating it first.
    pub async fn fetch_raw(&self, raw: &str) -> Result<GasReading, ChainFailure> {
        let chain = self.lookup(raw)?;
        self.fetch(chain).await
    }

    /// Fetch every configured chain concurrently.
    ///
    /// Always returns one entry per configured chain, in catalog order;
    /// failed chains carry their [`ChainFailure`].
    #[instrument(skip_all)]
    pub async fn fetch_all(&self) -> Vec<(Chain, Result<GasReading, ChainFailure>)> {
        let fetches = self.catalog.iter().map(|(chain, endpoints)| {
            let chain = *chain;
            async move { (chain, self.fetcher.fetch(chain, endpoints).await) }
        });
        join_all(fetches).await
    }

    /// Rank chains by current gas price, cheapest first.
    ///
    /// Chains that failed to produce data are excluded from the ranking; the
    /// sort is stable, so equal prices keep catalog order. Zero successful
    /// readings is [`OracleError::NoData`], not an empty ranking.
    #[instrument(skip_all)]
    pub async fn recommend(&self) -> Result<Recommendation, OracleError> {
        let mut ranking: Vec<RankingEntry> = self
            .fetch_all()
            .await
            .into_iter()
            .filter_map(|(chain, outcome)| {
                outcome.ok().map(|reading| RankingEntry {
                    chain,
                    name: reading.name,
                    gwei: reading.gas_price.gwei(),
                })
            })
            .collect();

        if ranking.is_empty() {
            return Err(OracleError::NoData);
        }

        ranking.sort_by(|a, b| a.gwei.cmp(&b.gwei));

        let best = &ranking[0];
        let recommendation = best.chain;
        let reason = format!(
            "{} has lowest gas at {} gwei",
            best.name,
            best.gwei.normalize()
        );
        Ok(Recommendation {
            recommendation,
            reason,
            ranking,
        })
    }
}
