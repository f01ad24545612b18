//! Dexscreener Reference Price Client
//!
//! Fetches the USD price of a pair from the public Dexscreener API:
//!   GET {base}/latest/dex/pairs/{chain}/{pool}
//!
//! The price lives in `pair.priceUsd` as a decimal string. Older responses
//! only fill the `pairs` array, so the entry whose `pairAddress` matches
//! the pool is used when `pair` is null.

use super::ReferencePriceSource;
use crate::error::{RebalanceError, Result};
use alloy::primitives::Address;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Top-level Dexscreener pairs response
#[derive(Debug, Deserialize)]
struct PairsResponse {
    #[serde(default)]
    pair: Option<DexPair>,
    #[serde(default)]
    pairs: Option<Vec<DexPair>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DexPair {
    #[serde(default)]
    pair_address: Option<String>,
    #[serde(default)]
    price_usd: Option<String>,
}

/// HTTP client for the Dexscreener pairs endpoint
pub struct DexscreenerClient {
    client: reqwest::Client,
    base_url: String,
    chain: String,
}

impl DexscreenerClient {
    /// Create a client with a per-request timeout
    pub fn new(base_url: &str, chain: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            chain: chain.to_string(),
        })
    }

    /// Endpoint URL for a pool
    pub fn pair_url(&self, pool: Address) -> String {
        // Lowercase hex; the API is case-insensitive but caches per URL
        format!(
            "{}/latest/dex/pairs/{}/{}",
            self.base_url,
            self.chain,
            format!("{:?}", pool).to_lowercase()
        )
    }
}

/// Extract the pool's USD price from a decoded response
fn extract_price(response: PairsResponse, pool: Address) -> Result<Decimal> {
    let wanted = format!("{:?}", pool).to_lowercase();

    let pair = match response.pair {
        Some(pair) => pair,
        None => response
            .pairs
            .unwrap_or_default()
            .into_iter()
            .find(|p| {
                p.pair_address
                    .as_deref()
                    .map(|a| a.to_lowercase() == wanted)
                    .unwrap_or(false)
            })
            .ok_or_else(|| {
                RebalanceError::MalformedResponse(format!("no pair data for {}", wanted))
            })?,
    };

    let raw = pair
        .price_usd
        .ok_or_else(|| RebalanceError::MalformedResponse("missing priceUsd field".to_string()))?;

    Decimal::from_str(raw.trim())
        .or_else(|_| Decimal::from_scientific(raw.trim()))
        .map_err(|e| RebalanceError::MalformedResponse(format!("unparsable priceUsd '{}': {}", raw, e)))
}

#[async_trait]
impl ReferencePriceSource for DexscreenerClient {
    async fn fetch_reference_price(&self, pool: Address) -> Result<Decimal> {
        let url = self.pair_url(pool);
        debug!("Fetching reference price: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RebalanceError::NetworkFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RebalanceError::NetworkFailure(format!(
                "price API returned status: {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| RebalanceError::NetworkFailure(e.to_string()))?;

        let parsed: PairsResponse = serde_json::from_str(&body)
            .map_err(|e| RebalanceError::MalformedResponse(e.to_string()))?;

        let price = extract_price(parsed, pool)?;
        info!("Fetched token price: ${}", price);
        Ok(price)
    }
}
