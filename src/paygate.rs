//! Paid-access gate for the premium endpoints.
//!
//! A premium handler runs only after the gate authorizes the request. The
//! gate reads the payment-proof header and hands it to a [`PaymentVerifier`];
//! a missing or rejected proof becomes an HTTP 402 response that carries the
//! full quote for the tier — price, currency, network and recipient — so a
//! client always learns how to pay, never just that it was denied.
//!
//! The default [`HeaderPresenceVerifier`] accepts any non-empty proof. That
//! is a deliberate stub: real deployments substitute a facilitator-backed
//! implementation behind the same trait.

use alloy_primitives::Address;
use axum::Json;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::config::PaymentConfig;
use crate::util::MoneyAmount;

/// Primary payment-proof header.
pub const PAYMENT_HEADER: &str = "X-PAYMENT";

/// Accepted fallback header name.
pub const PAYMENT_HEADER_FALLBACK: &str = "Payment";

/// The two paid tiers of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PremiumTier {
    /// All chains in one call.
    All,
    /// Cheapest-chain recommendation.
    Recommend,
}

/// The quote attached to a 402 response: what to pay, in what, where, to whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceTag {
    pub price: MoneyAmount,
    pub currency: String,
    pub network: String,
    pub recipient: Address,
    pub description: String,
}

/// Why a payment proof did not authorize the request.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("{0} header is required")]
    PaymentHeaderRequired(&'static str),
    #[error("payment proof is empty")]
    EmptyPaymentProof,
    #[error("payment proof rejected: {0}")]
    Rejected(String),
}

/// Decides whether a payment proof authorizes access.
///
/// The gate is agnostic to how verification happens; implementations range
/// from the header-presence stub below to a full facilitator round-trip.
pub trait PaymentVerifier: Send + Sync {
    fn verify(&self, proof: &[u8]) -> impl Future<Output = Result<(), VerificationError>> + Send;
}

impl<V: PaymentVerifier> PaymentVerifier for Arc<V> {
    fn verify(&self, proof: &[u8]) -> impl Future<Output = Result<(), VerificationError>> + Send {
        self.as_ref().verify(proof)
    }
}

/// Stub verifier: any non-empty proof authorizes.
///
/// No signature or settlement check is performed. This is the documented
/// placeholder policy, not a security boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderPresenceVerifier;

impl PaymentVerifier for HeaderPresenceVerifier {
    async fn verify(&self, proof: &[u8]) -> Result<(), VerificationError> {
        if proof.is_empty() {
            Err(VerificationError::EmptyPaymentProof)
        } else {
            Ok(())
        }
    }
}

/// Gate in front of the premium handlers: verifier plus per-tier quotes.
#[derive(Debug, Clone)]
pub struct PaymentGate<V = HeaderPresenceVerifier> {
    verifier: V,
    all: PriceTag,
    recommend: PriceTag,
}

impl<V: PaymentVerifier> PaymentGate<V> {
    pub fn new(verifier: V, all: PriceTag, recommend: PriceTag) -> Self {
        Self {
            verifier,
            all,
            recommend,
        }
    }

    /// Build the gate from payment configuration, one quote per tier.
    pub fn from_config(verifier: V, payment: &PaymentConfig) -> Self {
        let tag = |price: MoneyAmount, description: &str| PriceTag {
            price,
            currency: payment.currency.clone(),
            network: payment.network.clone(),
            recipient: payment.recipient,
            description: description.to_string(),
        };
        Self::new(
            verifier,
            tag(payment.pricing.all, "All chains gas prices"),
            tag(payment.pricing.recommend, "Smart chain recommendation"),
        )
    }

    /// The quote for a tier.
    pub fn price_tag(&self, tier: PremiumTier) -> &PriceTag {
        match tier {
            PremiumTier::All => &self.all,
            PremiumTier::Recommend => &self.recommend,
        }
    }

    /// Authorize a request against a tier, or explain how to pay.
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        tier: PremiumTier,
    ) -> Result<(), PaymentRequired> {
        let tag = self.price_tag(tier).clone();
        let Some(proof) = extract_payment_header(headers) else {
            return Err(PaymentRequired {
                error: VerificationError::PaymentHeaderRequired(PAYMENT_HEADER),
                accepts: tag,
            });
        };
        self.verifier
            .verify(proof)
            .await
            .map_err(|error| PaymentRequired {
                error,
                accepts: tag,
            })
    }
}

fn extract_payment_header(headers: &HeaderMap) -> Option<&[u8]> {
    headers
        .get(PAYMENT_HEADER)
        .or_else(|| headers.get(PAYMENT_HEADER_FALLBACK))
        .map(|value| value.as_bytes())
}

/// An HTTP 402 carrying the quote for the requested tier.
#[derive(Debug)]
pub struct PaymentRequired {
    pub error: VerificationError,
    pub accepts: PriceTag,
}

impl IntoResponse for PaymentRequired {
    fn into_response(self) -> Response {
        let tag = &self.accepts;
        let quote = json!({
            "price": tag.price,
            "currency": tag.currency,
            "network": tag.network,
            "recipient": tag.recipient,
        });
        let body = Json(json!({
            "error": "Payment required",
            "price": tag.price,
            "currency": tag.currency,
            "network": tag.network,
            "recipient": tag.recipient,
            "description": tag.description,
        }));
        let mut response = (StatusCode::PAYMENT_REQUIRED, body).into_response();
        if let Ok(value) = HeaderValue::from_str(&quote.to_string()) {
            response.headers_mut().insert("X-Payment-Required", value);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaymentConfig;

    fn gate() -> PaymentGate {
        PaymentGate::from_config(HeaderPresenceVerifier, &PaymentConfig::default())
    }

    #[tokio::test]
    async fn test_missing_header_is_payment_required() {
        let denied = gate()
            .authorize(&HeaderMap::new(), PremiumTier::All)
            .await
            .unwrap_err();

        assert!(matches!(
            denied.error,
            VerificationError::PaymentHeaderRequired(PAYMENT_HEADER)
        ));
        assert_eq!(denied.accepts.price.to_string(), "0.001");
        assert_eq!(denied.accepts.currency, "USDC");
    }

    #[tokio::test]
    async fn test_empty_header_is_payment_required() {
        let mut headers = HeaderMap::new();
        headers.insert(PAYMENT_HEADER, HeaderValue::from_static(""));

        let denied = gate()
            .authorize(&headers, PremiumTier::Recommend)
            .await
            .unwrap_err();

        assert!(matches!(
            denied.error,
            VerificationError::EmptyPaymentProof
        ));
        assert_eq!(denied.accepts.price.to_string(), "0.0005");
    }

    #[tokio::test]
    async fn test_any_nonempty_proof_authorizes() {
        let mut headers = HeaderMap::new();
        headers.insert(PAYMENT_HEADER, HeaderValue::from_static("anything-at-all"));

        assert!(gate().authorize(&headers, PremiumTier::All).await.is_ok());
    }

    #[tokio::test]
    async fn test_fallback_header_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(
            PAYMENT_HEADER_FALLBACK,
            HeaderValue::from_static("proof-via-fallback"),
        );

        assert!(
            gate()
                .authorize(&headers, PremiumTier::Recommend)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_tiers_quote_their_own_price() {
        let gate = gate();
        assert_eq!(
            gate.price_tag(PremiumTier::All).price.to_string(),
            "0.001"
        );
        assert_eq!(
            gate.price_tag(PremiumTier::Recommend).price.to_string(),
            "0.0005"
        );
    }

    #[test]
    fn test_402_response_carries_quote_header() {
        let gate = gate();
        let denied = PaymentRequired {
            error: VerificationError::EmptyPaymentProof,
            accepts: gate.price_tag(PremiumTier::All).clone(),
        };
        let response = denied.into_response();

        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
        let header = response.headers().get("X-Payment-Required").unwrap();
        let quote: serde_json::Value =
            serde_json::from_str(header.to_str().unwrap()).unwrap();
        assert_eq!(quote["price"], "0.001");
        assert_eq!(quote["currency"], "USDC");
        assert_eq!(quote["network"], "base");
    }
}
