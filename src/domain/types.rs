//! Shared domain types.
//!
//! A row moves through the pipeline in three shapes:
//!
//! - `RawRow` (`MonthlyRow<Cell>`): grid defaults plus whatever the external
//!   series merged in, possibly still text
//! - `ResolvedRow` (`MonthlyRow<f64>`): every designated numeric column is a number
//! - `CostedRow`: a resolved row plus its derived cost breakdown

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Modeled provider. The grid holds one row per company per month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Company {
    OpenAI,
    Anthropic,
}

impl Company {
    pub const ALL: [Company; 2] = [Company::OpenAI, Company::Anthropic];

    pub fn display_name(self) -> &'static str {
        match self {
            Company::OpenAI => "OpenAI",
            Company::Anthropic => "Anthropic",
        }
    }
}

impl fmt::Display for Company {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Inference hardware/model class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Mini,
    Flagship,
}

impl Tier {
    pub const ALL: [Tier; 2] = [Tier::Mini, Tier::Flagship];

    pub fn suffix(self) -> &'static str {
        match self {
            Tier::Mini => "mini",
            Tier::Flagship => "flagship",
        }
    }
}

/// A numeric input cell before coercion.
///
/// External tables are read as text, so a merged value may still carry
/// currency symbols or a comma decimal separator.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

/// Tokens that spreadsheet and dataframe exports write for an empty value.
/// Matched case-sensitively after trimming.
pub const NULL_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>", "N/A", "NA",
    "NULL", "NaN", "None", "n/a", "nan", "null",
];

impl Cell {
    /// Wrap a raw CSV field; blank fields and null markers are missing.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || NULL_MARKERS.contains(&trimmed) {
            Cell::Missing
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

/// Identifies one of the designated numeric columns feeding the cost formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericColumn {
    MixMiniPct,
    MixFlagshipPct,
    GpuPriceHour(Tier),
    GpuPowerW(Tier),
    ThroughputTokS(Tier),
    Pue,
    ElectricityPrice,
}

impl NumericColumn {
    pub fn name(self) -> &'static str {
        match self {
            NumericColumn::MixMiniPct => "mix_mini_pct",
            NumericColumn::MixFlagshipPct => "mix_flagship_pct",
            NumericColumn::GpuPriceHour(Tier::Mini) => "gpu_price_hour_mini",
            NumericColumn::GpuPriceHour(Tier::Flagship) => "gpu_price_hour_flagship",
            NumericColumn::GpuPowerW(Tier::Mini) => "gpu_power_w_mini",
            NumericColumn::GpuPowerW(Tier::Flagship) => "gpu_power_w_flagship",
            NumericColumn::ThroughputTokS(Tier::Mini) => "throughput_tok_s_mini",
            NumericColumn::ThroughputTokS(Tier::Flagship) => "throughput_tok_s_flagship",
            NumericColumn::Pue => "pue",
            NumericColumn::ElectricityPrice => "electricity_price_usd_kwh",
        }
    }
}

/// Per-tier hardware profile.
#[derive(Debug, Clone, PartialEq)]
pub struct TierProfile<T> {
    pub gpu_type: String,
    pub gpu_price_hour: T,
    pub gpu_power_w: T,
    pub throughput_tok_s: T,
}

/// Everything the cost formula reads, generic over the cell representation.
#[derive(Debug, Clone, PartialEq)]
pub struct CostInputs<T> {
    pub mix_mini_pct: T,
    pub mix_flagship_pct: T,
    pub mini: TierProfile<T>,
    pub flagship: TierProfile<T>,
    pub pue: T,
    pub electricity_price_usd_kwh: T,
}

impl<T> CostInputs<T> {
    pub fn tier(&self, tier: Tier) -> &TierProfile<T> {
        match tier {
            Tier::Mini => &self.mini,
            Tier::Flagship => &self.flagship,
        }
    }

    pub fn tier_mut(&mut self, tier: Tier) -> &mut TierProfile<T> {
        match tier {
            Tier::Mini => &mut self.mini,
            Tier::Flagship => &mut self.flagship,
        }
    }

    /// Combine every numeric column with its counterpart in `other`.
    ///
    /// GPU model labels are taken from `self`.
    pub fn zip_with<U, V>(
        self,
        other: &CostInputs<U>,
        mut f: impl FnMut(NumericColumn, T, &U) -> V,
    ) -> CostInputs<V> {
        let mut tier = |tier: Tier, own: TierProfile<T>, theirs: &TierProfile<U>| TierProfile {
            gpu_type: own.gpu_type,
            gpu_price_hour: f(NumericColumn::GpuPriceHour(tier), own.gpu_price_hour, &theirs.gpu_price_hour),
            gpu_power_w: f(NumericColumn::GpuPowerW(tier), own.gpu_power_w, &theirs.gpu_power_w),
            throughput_tok_s: f(
                NumericColumn::ThroughputTokS(tier),
                own.throughput_tok_s,
                &theirs.throughput_tok_s,
            ),
        };
        let mini = tier(Tier::Mini, self.mini, &other.mini);
        let flagship = tier(Tier::Flagship, self.flagship, &other.flagship);

        CostInputs {
            mix_mini_pct: f(NumericColumn::MixMiniPct, self.mix_mini_pct, &other.mix_mini_pct),
            mix_flagship_pct: f(NumericColumn::MixFlagshipPct, self.mix_flagship_pct, &other.mix_flagship_pct),
            mini,
            flagship,
            pue: f(NumericColumn::Pue, self.pue, &other.pue),
            electricity_price_usd_kwh: f(
                NumericColumn::ElectricityPrice,
                self.electricity_price_usd_kwh,
                &other.electricity_price_usd_kwh,
            ),
        }
    }
}

/// One record per (calendar month, company).
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRow<T> {
    /// First day of the month.
    pub date: NaiveDate,
    pub company: Company,
    /// Reserved for manual annotation; the pipeline never fills it.
    pub run_rate_revenue_usd: Option<f64>,
    /// Reserved for manual annotation; the pipeline never fills it.
    pub tokens_volume_est_m: Option<f64>,
    pub inputs: CostInputs<T>,
}

pub type RawRow = MonthlyRow<Cell>;
pub type ResolvedRow = MonthlyRow<f64>;

/// Derived per-tier costs, all per one million generated tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierCosts {
    pub gpu_hours_per_1m: f64,
    pub electricity_cost_per_1m: f64,
    pub gpu_rental_cost_per_1m: f64,
    pub total_per_1m: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBreakdown {
    pub mini: TierCosts,
    pub flagship: TierCosts,
    pub cost_per_million_tokens_usd: f64,
    pub break_even_lite_usd: f64,
    pub break_even_standard_usd: f64,
    pub break_even_pro_usd: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CostedRow {
    pub row: ResolvedRow,
    pub costs: CostBreakdown,
}

/// Resolved options for one `build` run.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    /// First month, `YYYY-MM`.
    pub start: String,
    /// Last month, `YYYY-MM`.
    pub end: String,
    pub out: PathBuf,
    pub eia_prices: Option<PathBuf>,
    pub gpu_overrides: Option<PathBuf>,
    pub scenario: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_raw_fields_are_missing() {
        assert!(Cell::from_raw("  ").is_missing());
        assert_eq!(Cell::from_raw(" 0,80 "), Cell::Text("0,80".to_string()));
    }

    #[test]
    fn null_markers_are_missing() {
        for raw in ["NA", " N/A ", "n/a", "NaN", "null", "NULL", "None", "#N/A", "<NA>"] {
            assert!(Cell::from_raw(raw).is_missing(), "{raw:?} should be missing");
        }
        // Case-sensitive, like the markers themselves.
        assert_eq!(Cell::from_raw("na"), Cell::Text("na".to_string()));
        assert_eq!(Cell::from_raw("--"), Cell::Text("--".to_string()));
    }

    #[test]
    fn numeric_column_names_match_output_headers() {
        assert_eq!(NumericColumn::GpuPriceHour(Tier::Flagship).name(), "gpu_price_hour_flagship");
        assert_eq!(NumericColumn::ThroughputTokS(Tier::Mini).name(), "throughput_tok_s_mini");
        assert_eq!(NumericColumn::ElectricityPrice.name(), "electricity_price_usd_kwh");
    }
}
