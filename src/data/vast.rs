//! Vast.ai public marketplace snapshot (GPU hourly rental offers).
//!
//! One GET per candidate endpoint, first success wins. Offers are written
//! as-is, one row per listing; turning them into the `H100`/`L4` override
//! table is a manual step.
//!
//! Only the `fetch-vast` command uses this.

use std::path::Path;

use chrono::Utc;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::eia::value_as_f64;
use crate::error::AppError;
use crate::io::export::write_records_csv;

/// Tried in order. The public browse endpoint is the usual one; the others are
/// aliases some proxies expose.
pub const CANDIDATE_URLS: [&str; 3] = [
    "https://vast.ai/api/v0/bundles/public",
    "https://vast.ai/api/v0/bundles",
    "https://vast.ai/api/v0/market/bundles",
];

const GPU_QUERY: &str = r#"gpu_name in ["H100","H200","A100","L4"]"#;
const OFFER_LIMIT: &str = "200";
const DEFAULT_USER_AGENT: &str = "llm-econ-research-bot/0.1";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// One row of the offers CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpuOfferRow {
    /// First day of the fetch month, `YYYY-MM-01`.
    pub fetched_at: String,
    pub gpu_model: Option<String>,
    pub hourly_price_usd: Option<f64>,
    pub location: Option<String>,
    pub provider_id: Option<String>,
    pub spot: Option<bool>,
    pub source_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct VastResponse {
    #[serde(default)]
    offers: Option<Vec<VastOffer>>,
    #[serde(default)]
    data: Option<Vec<VastOffer>>,
}

impl VastResponse {
    /// Listings sit under `offers` or, on some endpoints, `data`.
    fn into_offers(self) -> Vec<VastOffer> {
        self.offers
            .filter(|offers| !offers.is_empty())
            .or(self.data)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VastOffer {
    #[serde(default)]
    pub gpu_name: Option<String>,
    #[serde(default)]
    pub dph: Option<Value>,
    #[serde(default)]
    pub geolocation: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub is_spot: Option<Value>,
}

/// A successful fetch: the endpoint that answered and its listings.
#[derive(Debug, Clone)]
pub struct VastSnapshot {
    pub source_url: &'static str,
    pub offers: Vec<VastOffer>,
}

pub struct VastClient {
    client: Client,
}

impl VastClient {
    /// `HTTP_USER_AGENT` (environment or `.env`) overrides the default agent.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let user_agent = std::env::var("HTTP_USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Fetch(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Try each candidate endpoint until one answers with JSON.
    pub fn fetch_offers(&self) -> Result<VastSnapshot, AppError> {
        let mut last_err = None;
        for url in CANDIDATE_URLS {
            match self.try_fetch(url) {
                Ok(offers) => {
                    tracing::info!(url, offers = offers.len(), "fetched Vast.ai offers");
                    return Ok(VastSnapshot { source_url: url, offers });
                }
                Err(e) => {
                    tracing::debug!(url, error = %e, "Vast.ai endpoint failed");
                    last_err = Some(e);
                }
            }
        }
        let detail = last_err.map(|e| e.to_string()).unwrap_or_default();
        Err(AppError::Fetch(format!(
            "No Vast.ai endpoint answered. Last error: {detail}. Try: curl -s '{}?limit=3'",
            CANDIDATE_URLS[0]
        )))
    }

    fn try_fetch(&self, url: &str) -> Result<Vec<VastOffer>, AppError> {
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("q", GPU_QUERY), ("limit", OFFER_LIMIT), ("order", "score"), ("desc", "true")])
            .send()
            .map_err(|e| AppError::Fetch(format!("request to {url} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::Fetch(format!("{url} returned status {}", resp.status())));
        }

        let body: VastResponse = resp
            .json()
            .map_err(|e| AppError::Fetch(format!("Failed to parse response from {url}: {e}")))?;
        Ok(body.into_offers())
    }
}

/// Flatten offers into CSV rows stamped with the fetch month.
pub fn offer_rows(snapshot: &VastSnapshot, fetched_at: &str) -> Vec<GpuOfferRow> {
    snapshot
        .offers
        .iter()
        .map(|offer| GpuOfferRow {
            fetched_at: fetched_at.to_string(),
            gpu_model: offer.gpu_name.clone(),
            hourly_price_usd: offer.dph.as_ref().and_then(value_as_f64),
            location: offer.geolocation.clone().or_else(|| offer.country.clone()),
            provider_id: offer.id.as_ref().and_then(scalar_to_string),
            spot: offer.is_spot.as_ref().map(is_truthy),
            source_url: snapshot.source_url.to_string(),
        })
        .collect()
}

/// Current UTC month as `YYYY-MM-01`.
pub fn current_fetch_month() -> String {
    Utc::now().format("%Y-%m-01").to_string()
}

pub fn write_offers_csv(path: &Path, rows: &[GpuOfferRow]) -> Result<(), AppError> {
    if rows.is_empty() {
        tracing::warn!(path = %path.display(), "no offers returned, writing an empty file");
    }
    write_records_csv(path, rows)?;
    Ok(())
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
