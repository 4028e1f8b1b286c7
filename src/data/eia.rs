//! EIA v2 retail-sales integration (US commercial electricity price).
//!
//! The monthly US price is aggregated across all states as
//! `sum(revenue) / sum(sales)`. Revenue is in million USD and sales in
//! million kWh, so the ratio is USD/kWh directly.
//!
//! Only the `fetch-eia` command uses this; `build` just reads its CSV.

use std::collections::BTreeMap;
use std::path::Path;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::io::export::write_records_csv;

pub const BASE_URL: &str = "https://api.eia.gov/v2/electricity/retail-sales/data/";
const PAGE_LENGTH: usize = 5000;
const REQUEST_TIMEOUT_SECS: u64 = 30;
const SOURCE_SERIES_ID: &str = "retail-sales sum(revenue)/sum(sales) COM monthly";

/// One row of the electricity CSV consumed by `build`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElectricityPriceRow {
    pub date: String,
    pub price_usd_per_kwh: f64,
    pub sector: &'static str,
    pub region: &'static str,
    pub source_series_id: &'static str,
    pub source_url: &'static str,
}

pub struct EiaClient {
    client: Client,
    api_key: String,
}

impl EiaClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("EIA_API_KEY")
            .map_err(|_| AppError::config("Missing EIA_API_KEY in environment (.env)."))?;
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Fetch(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, api_key })
    }

    /// Fetch monthly commercial prices for `start..=end` (`YYYY-MM`).
    pub fn fetch_commercial_prices(&self, start: &str, end: &str) -> Result<Vec<ElectricityPriceRow>, AppError> {
        let length = PAGE_LENGTH.to_string();
        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("frequency", "monthly"),
                ("data[0]", "revenue"),
                ("data[1]", "sales"),
                ("facets[sectorid][]", "COM"),
                ("start", start),
                ("end", end),
                ("length", length.as_str()),
                ("sort[0][column]", "period"),
                ("sort[0][direction]", "asc"),
            ])
            .send()
            .map_err(|e| AppError::Fetch(format!("EIA request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::Fetch(format!("EIA request failed with status {}.", resp.status())));
        }

        let body: EiaResponse = resp
            .json()
            .map_err(|e| AppError::Fetch(format!("Failed to parse EIA response: {e}")))?;

        let rows = aggregate_prices(&body.response.data);
        tracing::info!(records = body.response.data.len(), months = rows.len(), "fetched EIA retail sales");
        Ok(rows)
    }
}

#[derive(Debug, Deserialize)]
struct EiaResponse {
    #[serde(default)]
    response: EiaData,
}

#[derive(Debug, Default, Deserialize)]
struct EiaData {
    #[serde(default)]
    data: Vec<EiaRecord>,
}

/// EIA returns numbers either as JSON numbers or as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct EiaRecord {
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub revenue: Option<Value>,
    #[serde(default)]
    pub sales: Option<Value>,
}

/// Sum revenue and sales per period and turn them into prices.
///
/// Records missing any field or carrying non-numeric values are skipped, as
/// are periods whose total sales are not positive.
pub fn aggregate_prices(records: &[EiaRecord]) -> Vec<ElectricityPriceRow> {
    let mut by_period: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for rec in records {
        let (Some(period), Some(revenue), Some(sales)) = (
            rec.period.as_deref().filter(|p| !p.is_empty()),
            rec.revenue.as_ref().and_then(value_as_f64),
            rec.sales.as_ref().and_then(value_as_f64),
        ) else {
            continue;
        };
        let entry = by_period.entry(period).or_insert((0.0, 0.0));
        entry.0 += revenue;
        entry.1 += sales;
    }

    by_period
        .into_iter()
        .filter(|(_, (_, sales))| *sales > 0.0)
        .map(|(period, (revenue, sales))| ElectricityPriceRow {
            date: format!("{period}-01"),
            price_usd_per_kwh: revenue / sales,
            sector: "commercial",
            region: "US_weighted",
            source_series_id: SOURCE_SERIES_ID,
            source_url: BASE_URL,
        })
        .collect()
}

pub(crate) fn value_as_f64(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// Write the electricity CSV, creating the parent directory if needed.
pub fn write_prices_csv(path: &Path, rows: &[ElectricityPriceRow]) -> Result<(), AppError> {
    write_records_csv(path, rows)?;
    Ok(())
}
