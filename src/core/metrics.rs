use super::engine::round_to_cents;
use super::types::{AssetMetrics, Trajectory};

/// Metrics for every non-baseline series, in asset order.
pub fn compute_metrics(trajectory: &Trajectory) -> Vec<(String, AssetMetrics)> {
    trajectory
        .series
        .iter()
        .filter(|s| !s.is_baseline)
        .map(|s| (s.name.clone(), asset_metrics(&s.values)))
        .collect()
}

/// CAGR, realized volatility and max drawdown, all in percent and rounded to
/// two decimals.
///
/// A zero start value gives a non-finite CAGR and first return; this is left
/// to propagate. Series shorter than two points have no returns and report
/// zeros.
pub fn asset_metrics(values: &[f64]) -> AssetMetrics {
    if values.len() < 2 {
        return AssetMetrics::default();
    }

    AssetMetrics {
        cagr: round_to_cents(cagr(values)),
        volatility: round_to_cents(realized_volatility(values)),
        max_drawdown: round_to_cents(max_drawdown(values)),
    }
}

fn cagr(values: &[f64]) -> f64 {
    let years = (values.len() - 1) as f64;
    let start = values[0];
    let end = values[values.len() - 1];
    ((end / start).powf(1.0 / years) - 1.0) * 100.0
}

/// Population standard deviation of simple yearly returns.
fn realized_volatility(values: &[f64]) -> f64 {
    let returns: Vec<f64> = values
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect();
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() * 100.0
}

fn max_drawdown(values: &[f64]) -> f64 {
    let mut peak = values[0];
    let mut worst = 0.0_f64;
    for &value in values {
        if value > peak {
            peak = value;
        } else if value < peak {
            worst = worst.max((peak - value) / peak * 100.0);
        }
    }
    worst
}
