//! Crisis drawdown and recovery.
//!
//! A crisis knocks an asset down in year 1, recovers it along a shaped path
//! towards a permanently reduced target, then lets it grow at a damaged rate
//! that never overshoots that target. The permanent damage ratio is not
//! clamped: severe drawdowns combined with high sensitivity can push it below
//! zero, producing negative targets.

use super::types::{Asset, CrisisType, ScenarioConfig};

/// Share of the permanent loss carried by the asset's scaled drawdown.
const DAMAGE_SHARE: f64 = 0.4;

/// Crisis severity for one asset as a decimal: market drawdown scaled by the
/// asset's drawdown impact and crisis sensitivity.
pub fn drawdown_impact_decimal(drawdown: f64, asset: &Asset) -> f64 {
    (drawdown / 100.0) * asset.drawdown_impact * asset.crisis_sensitivity
}

/// Fraction of the crisis-free value the asset can still reach.
pub fn permanent_damage_ratio(
    crisis_type: CrisisType,
    drawdown_impact_decimal: f64,
    crisis_sensitivity: f64,
) -> f64 {
    let base_damage = drawdown_impact_decimal * DAMAGE_SHARE;
    let adjusted = base_damage * crisis_sensitivity;
    match crisis_type {
        CrisisType::RiskOff => 0.90 - adjusted,
        CrisisType::RisingRates => {
            let rates_sensitivity = (1.5 * crisis_sensitivity).min(1.0);
            0.85 - adjusted * rates_sensitivity
        }
        CrisisType::None => 0.95 - adjusted,
    }
}

/// Rewrites a drag-adjusted series in place.
///
/// `baseline` is the undragged projection for the same asset; it provides
/// the crisis-free counterfactual for each year.
pub fn apply_crisis(values: &mut [f64], baseline: &[f64], asset: &Asset, config: &ScenarioConfig) {
    if values.len() < 2 {
        return;
    }

    let impact = drawdown_impact_decimal(config.drawdown, asset);
    let damage_ratio = permanent_damage_ratio(config.crisis_type, impact, asset.crisis_sensitivity);
    let reduced_return = asset.annual_return * damage_ratio;
    let drag_base = 1.0 + config.combined_drag();
    let exponent = config.recovery_type.exponent();

    values[1] *= 1.0 - impact;
    let trough = values[1];

    for year in 2..values.len() {
        let no_crisis = baseline[year] / drag_base.powi(year as i32);
        let target = no_crisis * damage_ratio;

        values[year] = if year as f64 <= config.recovery_years + 1.0 {
            let progress = (year as f64 - 1.0) / config.recovery_years;
            let recovery_factor = progress.powf(exponent);
            (trough + (target - trough) * recovery_factor).min(target)
        } else {
            (values[year - 1] * (1.0 + reduced_return / 100.0)).min(target)
        };
    }
}
