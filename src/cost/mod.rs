//! Cost per million tokens and subscription break-even prices.
//!
//! Pure arithmetic over resolved rows. Per tier:
//!
//! - `gpu_hours_per_1m = 1e6 / (throughput_tok_s * 3600)`
//! - `electricity_cost_per_1m = power_w / 1000 * pue * gpu_hours_per_1m * usd_per_kwh`
//! - `gpu_rental_cost_per_1m = gpu_hours_per_1m * gpu_price_hour`
//!
//! The blended cost weights the two tier totals by the workload mix, and a
//! break-even price for `T` tokens/month at target margin `M` is
//! `cost * (T / 1e6) / (1 - M)`. Nothing is rounded.
//!
//! Degenerate inputs (non-positive throughput, margin >= 1) and any non-finite
//! result are reported as `AppError::Domain` with the row key.

use crate::domain::{CostBreakdown, CostInputs, CostedRow, EconomicAssumptions, ResolvedRow, Tier, TierCosts, TierProfile};
use crate::error::AppError;

const TOKENS_PER_MILLION: f64 = 1_000_000.0;
const SECONDS_PER_HOUR: f64 = 3600.0;

pub fn tier_costs(profile: &TierProfile<f64>, pue: f64, electricity_usd_kwh: f64) -> Result<TierCosts, String> {
    if !(profile.throughput_tok_s > 0.0) {
        return Err(format!(
            "throughput must be > 0 tok/s for GPU {} (got {})",
            profile.gpu_type, profile.throughput_tok_s
        ));
    }

    let gpu_hours_per_1m = TOKENS_PER_MILLION / (profile.throughput_tok_s * SECONDS_PER_HOUR);
    let electricity_cost_per_1m = (profile.gpu_power_w / 1000.0) * pue * gpu_hours_per_1m * electricity_usd_kwh;
    let gpu_rental_cost_per_1m = gpu_hours_per_1m * profile.gpu_price_hour;

    Ok(TierCosts {
        gpu_hours_per_1m,
        electricity_cost_per_1m,
        gpu_rental_cost_per_1m,
        total_per_1m: electricity_cost_per_1m + gpu_rental_cost_per_1m,
    })
}

/// Subscription price for `tokens_per_month` that leaves `target_margin` gross margin.
pub fn break_even_price(cost_per_million: f64, tokens_per_month: u64, target_margin: f64) -> Result<f64, String> {
    if !(target_margin < 1.0) {
        return Err(format!("target margin must be < 1.0 (got {target_margin})"));
    }
    Ok(cost_per_million * (tokens_per_month as f64 / TOKENS_PER_MILLION) / (1.0 - target_margin))
}

fn breakdown(inputs: &CostInputs<f64>, assumptions: &EconomicAssumptions) -> Result<CostBreakdown, String> {
    let [mini, flagship] = Tier::ALL.map(|tier| {
        tier_costs(inputs.tier(tier), inputs.pue, inputs.electricity_price_usd_kwh)
            .map_err(|e| format!("{} tier: {e}", tier.suffix()))
    });
    let (mini, flagship) = (mini?, flagship?);

    let cost = mini.total_per_1m * (inputs.mix_mini_pct / 100.0)
        + flagship.total_per_1m * (inputs.mix_flagship_pct / 100.0);

    let tiers = assumptions.usage_tiers;
    let margin = assumptions.target_margin;
    let out = CostBreakdown {
        mini,
        flagship,
        cost_per_million_tokens_usd: cost,
        break_even_lite_usd: break_even_price(cost, tiers.lite, margin)?,
        break_even_standard_usd: break_even_price(cost, tiers.standard, margin)?,
        break_even_pro_usd: break_even_price(cost, tiers.pro, margin)?,
    };

    let finite = [
        out.mini.total_per_1m,
        out.flagship.total_per_1m,
        out.cost_per_million_tokens_usd,
        out.break_even_lite_usd,
        out.break_even_standard_usd,
        out.break_even_pro_usd,
    ]
    .iter()
    .all(|v| v.is_finite());
    if !finite {
        return Err("cost computation produced a non-finite value".to_string());
    }
    Ok(out)
}

/// Cost one row.
pub fn cost_row(row: &ResolvedRow, assumptions: &EconomicAssumptions) -> Result<CostedRow, AppError> {
    let costs = breakdown(&row.inputs, assumptions).map_err(|message| AppError::Domain {
        date: row.date,
        company: row.company,
        message,
    })?;
    Ok(CostedRow { row: row.clone(), costs })
}

/// Cost every row, stopping at the first degenerate one.
pub fn cost_rows(rows: &[ResolvedRow], assumptions: &EconomicAssumptions) -> Result<Vec<CostedRow>, AppError> {
    rows.iter().map(|row| cost_row(row, assumptions)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::resolve_rows;
    use crate::data::grid::build_grid;
    use crate::domain::Company;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    fn default_rows(start: &str, end: &str, assumptions: &EconomicAssumptions) -> Vec<ResolvedRow> {
        let grid = build_grid(start, end, assumptions).unwrap();
        resolve_rows(&grid, assumptions).0
    }

    #[test]
    fn mini_tier_reference_values() {
        let profile = TierProfile {
            gpu_type: "L4".to_string(),
            gpu_price_hour: 0.80,
            gpu_power_w: 72.0,
            throughput_tok_s: 120.0,
        };
        let c = tier_costs(&profile, 1.09, 0.132).unwrap();
        assert!(close(c.gpu_hours_per_1m, 2.3148, 1e-4));
        assert!(close(c.electricity_cost_per_1m, 0.0240, 1e-4));
        assert!(close(c.gpu_rental_cost_per_1m, 1.8519, 1e-4));
        assert!(close(c.total_per_1m, 1.8758, 1e-4));
    }

    #[test]
    fn blended_cost_uses_mix() {
        let assumptions = EconomicAssumptions::default();
        let rows = default_rows("2024-01", "2024-01", &assumptions);
        let costed = cost_row(&rows[0], &assumptions).unwrap();
        let expected = costed.costs.mini.total_per_1m * 0.85 + costed.costs.flagship.total_per_1m * 0.15;
        assert_eq!(costed.costs.cost_per_million_tokens_usd, expected);
    }

    #[test]
    fn break_even_is_strictly_increasing() {
        let assumptions = EconomicAssumptions::default();
        let rows = default_rows("2024-01", "2024-03", &assumptions);
        for costed in cost_rows(&rows, &assumptions).unwrap() {
            let c = costed.costs;
            assert!(c.break_even_lite_usd < c.break_even_standard_usd);
            assert!(c.break_even_standard_usd < c.break_even_pro_usd);
            let standard = c.cost_per_million_tokens_usd / (1.0 - 0.70);
            assert!(close(c.break_even_standard_usd, standard, 1e-12));
        }
    }

    #[test]
    fn zero_throughput_is_a_domain_error() {
        let assumptions = EconomicAssumptions::default();
        let mut rows = default_rows("2024-01", "2024-02", &assumptions);
        rows[3].inputs.flagship.throughput_tok_s = 0.0;

        let err = cost_rows(&rows, &assumptions).unwrap_err();
        match err {
            AppError::Domain { date, company, message } => {
                assert_eq!(date.to_string(), "2024-02-01");
                assert_eq!(company, Company::Anthropic);
                assert!(message.contains("flagship"), "{message}");
            }
            other => panic!("expected domain error, got {other:?}"),
        }
    }

    #[test]
    fn full_margin_is_a_domain_error() {
        let assumptions = EconomicAssumptions {
            target_margin: 1.0,
            ..EconomicAssumptions::default()
        };
        let rows = default_rows("2024-01", "2024-01", &assumptions);
        assert!(matches!(cost_rows(&rows, &assumptions), Err(AppError::Domain { .. })));
    }

    #[test]
    fn company_does_not_change_cost() {
        let assumptions = EconomicAssumptions::default();
        let rows = default_rows("2024-01", "2024-01", &assumptions);
        let costed = cost_rows(&rows, &assumptions).unwrap();
        assert_eq!(costed[0].costs, costed[1].costs);
    }
}
