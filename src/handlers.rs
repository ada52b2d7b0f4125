//! HTTP endpoints of the gas oracle.
//!
//! The handlers are a thin shell over [`GasOracle`] and [`PaymentGate`]:
//! free routes read a single chain or the catalog, premium routes run the
//! gate first and then reuse the same aggregate operations.
//!
//! Per-chain failures inside aggregate responses are data entries, never a
//! 5xx; only an unresolvable chain identifier (`/gas/{chain}`) and a
//! recommendation with zero data produce error statuses.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::instrument;

use crate::gas::fetcher::GasRpc;
use crate::gas::oracle::GasOracle;
use crate::paygate::{PaymentGate, PaymentVerifier, PremiumTier};

/// Shared application state: the oracle and the premium gate.
///
/// Generic over transport and verifier so tests can substitute scripted
/// implementations behind the same router.
pub struct AppState<T, V> {
    pub oracle: GasOracle<T>,
    pub gate: PaymentGate<V>,
}

/// Error body for client-facing error statuses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Builds the route table.
pub fn routes<T, V>() -> Router<Arc<AppState<T, V>>>
where
    T: GasRpc + 'static,
    V: PaymentVerifier + 'static,
{
    Router::new()
        .route("/", get(get_index))
        .route("/healthz", get(get_healthz))
        .route("/chains", get(get_chains))
        .route("/gas/{chain}", get(get_gas))
        .route("/premium/all", get(get_premium_all))
        .route("/premium/recommend", get(get_premium_recommend))
        .route("/registration.json", get(get_registration))
}

/// `GET /`: Service descriptor with the endpoint map and premium pricing.
#[instrument(skip_all)]
async fn get_index<T, V>(State(state): State<Arc<AppState<T, V>>>) -> impl IntoResponse
where
    T: GasRpc,
    V: PaymentVerifier,
{
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Multi-chain gas price oracle",
        "endpoints": {
            "free": ["/gas/{chain}", "/healthz", "/chains"],
            "paid": ["/premium/all", "/premium/recommend"],
        },
        "x402": true,
        "pricing": {
            "all": state.gate.price_tag(PremiumTier::All).price,
            "recommend": state.gate.price_tag(PremiumTier::Recommend).price,
        },
    }))
}

/// `GET /healthz`: Liveness probe.
#[instrument(skip_all)]
async fn get_healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// `GET /chains`: The configured chain catalog. No network access.
#[instrument(skip_all)]
async fn get_chains<T, V>(State(state): State<Arc<AppState<T, V>>>) -> impl IntoResponse
where
    T: GasRpc,
    V: PaymentVerifier,
{
    Json(json!({ "chains": state.oracle.chains() }))
}

/// `GET /gas/{chain}`: Free single-chain gas price.
///
/// An identifier that does not resolve to a configured chain, or a chain
/// whose endpoints are all down, yields 400 with the failure message.
#[instrument(skip_all, fields(chain = %chain))]
async fn get_gas<T, V>(
    State(state): State<Arc<AppState<T, V>>>,
    Path(chain): Path<String>,
) -> impl IntoResponse
where
    T: GasRpc,
    V: PaymentVerifier,
{
    match state.oracle.fetch_raw(&chain).await {
        Ok(reading) => (StatusCode::OK, Json(reading)).into_response(),
        Err(failure) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: failure.error,
            }),
        )
            .into_response(),
    }
}

/// `GET /premium/all`: Paid bulk read, every configured chain in one call.
///
/// Chains that failed appear as failure entries under their key; the mapping
/// is always complete.
#[instrument(skip_all)]
async fn get_premium_all<T, V>(
    State(state): State<Arc<AppState<T, V>>>,
    headers: HeaderMap,
) -> impl IntoResponse
where
    T: GasRpc,
    V: PaymentVerifier,
{
    if let Err(payment_required) = state.gate.authorize(&headers, PremiumTier::All).await {
        return payment_required.into_response();
    }

    let mut data = serde_json::Map::new();
    for (chain, outcome) in state.oracle.fetch_all().await {
        let entry = match outcome {
            Ok(reading) => serde_json::to_value(reading),
            Err(failure) => serde_json::to_value(failure),
        }
        .unwrap_or_else(|_| json!({ "error": "serialization failed" }));
        data.insert(chain.to_string(), entry);
    }

    Json(json!({ "paid": true, "data": data })).into_response()
}

/// `GET /premium/recommend`: Paid cheapest-chain recommendation.
///
/// All chains failing is a 503 with an error body, not an empty ranking.
#[instrument(skip_all)]
async fn get_premium_recommend<T, V>(
    State(state): State<Arc<AppState<T, V>>>,
    headers: HeaderMap,
) -> impl IntoResponse
where
    T: GasRpc,
    V: PaymentVerifier,
{
    if let Err(payment_required) = state.gate.authorize(&headers, PremiumTier::Recommend).await {
        return payment_required.into_response();
    }

    match state.oracle.recommend().await {
        Ok(recommendation) => Json(json!({
            "paid": true,
            "recommendation": recommendation.recommendation,
            "reason": recommendation.reason,
            "ranking": recommendation.ranking,
        }))
        .into_response(),
        Err(error) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: error.to_string(),
            }),
        )
            .into_response(),
    }
}

/// `GET /registration.json`: Agent-facing service registration document.
#[instrument(skip_all)]
async fn get_registration() -> impl IntoResponse {
    Json(json!({
        "type": "https://eips.ethereum.org/EIPS/eip-8004#registration-v1",
        "name": env!("CARGO_PKG_NAME"),
        "description": "Multi-chain gas price oracle. Free tier: per-chain reads. Premium: x402 USDC payments.",
        "services": [
            { "name": "web", "endpoint": "/" }
        ],
        "x402Support": true,
        "active": true,
        "supportedTrust": ["reputation"]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::{Chain, ChainEndpoints};
    use crate::config::PaymentConfig;
    use crate::gas::testing::{Outcome, ScriptedRpc};
    use crate::paygate::{HeaderPresenceVerifier, PAYMENT_HEADER};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use url::Url;

    fn test_app(
        outcomes: impl IntoIterator<Item = (&'static str, Outcome)>,
        catalog: &[(Chain, &str)],
    ) -> Router {
        let rpc = Arc::new(ScriptedRpc::new(outcomes));
        let catalog = catalog
            .iter()
            .map(|(chain, url)| {
                (
                    *chain,
                    ChainEndpoints::new(chain.display_name(), vec![Url::parse(url).unwrap()]),
                )
            })
            .collect();
        let state = AppState {
            oracle: GasOracle::new(catalog, rpc),
            gate: PaymentGate::from_config(HeaderPresenceVerifier, &PaymentConfig::default()),
        };
        routes().with_state(Arc::new(state))
    }

    fn two_chain_app() -> Router {
        test_app(
            [
                ("https://eth.example/", Outcome::Wei("0x6fc23ac00")), // 30 gwei
                ("https://base.example/", Outcome::Wei("0x2540be400")), // 10 gwei
            ],
            &[
                (Chain::Ethereum, "https://eth.example/"),
                (Chain::Base, "https://base.example/"),
            ],
        )
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn paid_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(PAYMENT_HEADER, "any-proof")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_healthz() {
        let response = two_chain_app().oneshot(request("/healthz")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_chains_catalog() {
        let response = two_chain_app().oneshot(request("/chains")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "chains": ["ethereum", "base"] })
        );
    }

    #[tokio::test]
    async fn test_gas_single_chain() {
        let response = two_chain_app().oneshot(request("/gas/base")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["chain"], "base");
        assert_eq!(body["name"], "Base");
        assert_eq!(body["gasPrice"]["wei"], json!(10_000_000_000u64));
        assert_eq!(body["gasPrice"]["gwei"], "10.0000");
        assert_eq!(body["level"], "medium");
    }

    #[tokio::test]
    async fn test_gas_chain_id_is_case_insensitive() {
        let response = two_chain_app().oneshot(request("/gas/Base")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_gas_unknown_chain_is_400() {
        let response = two_chain_app()
            .oneshot(request("/gas/dogechain"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Unknown chain: dogechain" })
        );
    }

    #[tokio::test]
    async fn test_gas_exhausted_chain_is_400() {
        let app = test_app(
            [("https://eth.example/", Outcome::Unreachable)],
            &[(Chain::Ethereum, "https://eth.example/")],
        );
        let response = app.oneshot(request("/gas/ethereum")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "All RPCs failed" })
        );
    }

    #[tokio::test]
    async fn test_premium_all_without_payment_is_402() {
        let response = two_chain_app().oneshot(request("/premium/all")).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
        assert!(response.headers().contains_key("X-Payment-Required"));

        let body = body_json(response).await;
        assert_eq!(body["error"], "Payment required");
        assert_eq!(body["price"], "0.001");
        assert_eq!(body["currency"], "USDC");
        assert_eq!(body["network"], "base");
        assert_eq!(
            body["recipient"],
            "0xaab80bc6b6040ae845ce225181fd72297ba71b13"
        );
    }

    #[tokio::test]
    async fn test_premium_recommend_without_payment_quotes_its_own_tier() {
        let response = two_chain_app()
            .oneshot(request("/premium/recommend"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body_json(response).await["price"], "0.0005");
    }

    #[tokio::test]
    async fn test_premium_all_with_payment_returns_complete_mapping() {
        let app = test_app(
            [
                ("https://eth.example/", Outcome::Wei("0x6fc23ac00")),
                ("https://base.example/", Outcome::Unreachable),
            ],
            &[
                (Chain::Ethereum, "https://eth.example/"),
                (Chain::Base, "https://base.example/"),
            ],
        );
        let response = app.oneshot(paid_request("/premium/all")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["paid"], true);
        assert_eq!(body["data"]["ethereum"]["level"], "high");
        assert_eq!(body["data"]["base"]["error"], "All RPCs failed");
    }

    #[tokio::test]
    async fn test_premium_recommend_with_payment() {
        let response = two_chain_app()
            .oneshot(paid_request("/premium/recommend"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["paid"], true);
        assert_eq!(body["recommendation"], "base");
        assert_eq!(body["reason"], "Base has lowest gas at 10 gwei");
        assert_eq!(body["ranking"][0]["chain"], "base");
        assert_eq!(body["ranking"][1]["chain"], "ethereum");
    }

    #[tokio::test]
    async fn test_premium_recommend_with_no_data_is_503() {
        let app = test_app(
            [("https://eth.example/", Outcome::Unreachable)],
            &[(Chain::Ethereum, "https://eth.example/")],
        );
        let response = app.oneshot(paid_request("/premium/recommend")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("no gas data"));
    }

    #[tokio::test]
    async fn test_index_lists_pricing() {
        let response = two_chain_app().oneshot(request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["service"], "gas402");
        assert_eq!(body["pricing"]["all"], "0.001");
        assert_eq!(body["pricing"]["recommend"], "0.0005");
    }
}
