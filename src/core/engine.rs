use tracing::debug;

use super::assets::AssetBook;
use super::crisis::apply_crisis;
use super::metrics::compute_metrics;
use super::rng::RandomFactors;
use super::types::{Asset, AssetSeries, ScenarioConfig, SimulationOutput, Trajectory};

/// Runs the full pipeline: baseline, drag, crisis, volatility, metrics.
///
/// Infallible. Inputs are expected to have been validated by the caller;
/// out-of-range values propagate as NaN or infinity.
pub fn simulate(assets: &AssetBook, config: &ScenarioConfig) -> SimulationOutput {
    let assets = assets.assets();
    let baseline = project_baseline(assets, config);
    let mut trajectory = baseline.clone();

    apply_drag(&mut trajectory, config);

    if config.crisis_active() {
        debug!(
            crisis = ?config.crisis_type,
            drawdown = config.drawdown,
            recovery_years = config.recovery_years,
            "applying crisis model"
        );
        for (asset, (series, base)) in assets
            .iter()
            .zip(trajectory.series.iter_mut().zip(&baseline.series))
        {
            if !asset.is_baseline {
                apply_crisis(&mut series.values, &base.values, asset, config);
            }
        }
    } else {
        debug!("crisis model skipped");
    }

    if config.volatility_active() {
        let factors = RandomFactors::generate(
            assets,
            config.years,
            config.volatility_level,
            config.random_seed_base,
        );
        debug!(
            seed = config.random_seed_base,
            level = config.volatility_level,
            "injecting volatility"
        );
        apply_volatility(&mut trajectory, &factors);
    } else {
        debug!("volatility skipped");
    }

    let metrics = compute_metrics(&trajectory);
    SimulationOutput {
        baseline,
        trajectory,
        metrics,
    }
}

/// Compounds each asset's nominal return year by year. The baseline asset
/// stays at the initial amount.
pub fn project_baseline(assets: &[Asset], config: &ScenarioConfig) -> Trajectory {
    let len = config.years as usize + 1;
    let series = assets
        .iter()
        .map(|asset| {
            let values = if asset.is_baseline {
                vec![config.initial_amount; len]
            } else {
                let growth = 1.0 + asset.annual_return / 100.0;
                let mut value = config.initial_amount;
                let mut values = Vec::with_capacity(len);
                for _ in 0..len {
                    values.push(round_to_cents(value));
                    value *= growth;
                }
                values
            };
            AssetSeries {
                name: asset.name.clone(),
                is_baseline: asset.is_baseline,
                values,
            }
        })
        .collect();
    Trajectory { series }
}

/// Discounts every non-baseline value from year 1 by cumulative fees and
/// inflation.
pub fn apply_drag(trajectory: &mut Trajectory, config: &ScenarioConfig) {
    let drag_base = 1.0 + config.combined_drag();
    for series in trajectory.series.iter_mut().filter(|s| !s.is_baseline) {
        for (year, value) in series.values.iter_mut().enumerate().skip(1) {
            *value /= drag_base.powi(year as i32);
        }
    }
}

pub fn apply_volatility(trajectory: &mut Trajectory, factors: &RandomFactors) {
    for series in trajectory.series.iter_mut().filter(|s| !s.is_baseline) {
        let Some(noise) = factors.for_asset(&series.name) else {
            continue;
        };
        for (value, factor) in series.values.iter_mut().zip(noise).skip(1) {
            *value = round_to_cents(*value * (1.0 + factor));
        }
    }
}

pub(crate) fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CrisisType, RecoveryType};
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn asset(name: &str, annual_return: f64) -> Asset {
        Asset {
            name: name.to_string(),
            annual_return,
            volatility: 0.15,
            drawdown_impact: 1.0,
            crisis_sensitivity: 1.0,
            is_baseline: false,
            color: String::new(),
        }
    }

    fn single_asset_book(annual_return: f64) -> AssetBook {
        AssetBook::from_assets(vec![
            Asset::baseline("Cash", "#999999"),
            asset("Equities", annual_return),
        ])
        .expect("valid book")
    }

    fn quiet_config() -> ScenarioConfig {
        ScenarioConfig {
            initial_amount: 100_000.0,
            years: 5,
            annual_fees: 0.0,
            inflation_rate: 0.0,
            enable_risk: false,
            enable_volatility: false,
            ..ScenarioConfig::default()
        }
    }

    fn stressed_config() -> ScenarioConfig {
        ScenarioConfig {
            years: 12,
            annual_fees: 0.8,
            inflation_rate: 3.0,
            enable_risk: true,
            crisis_type: CrisisType::RisingRates,
            drawdown: 35.0,
            recovery_years: 4.5,
            recovery_type: RecoveryType::LShaped,
            enable_volatility: true,
            volatility_level: 1.2,
            random_seed_base: 2024,
            ..ScenarioConfig::default()
        }
    }

    #[test]
    fn seven_percent_over_five_years_without_stress() {
        let output = simulate(&single_asset_book(7.0), &quiet_config());
        assert_eq!(output.trajectory.value("Equities", 5), Some(140_255.17));
        assert_eq!(output.trajectory.value("Equities", 0), Some(100_000.0));
        assert_eq!(output.trajectory, output.baseline);
    }

    #[test]
    fn crisis_shocks_year_one_by_scaled_drawdown() {
        let mut config = quiet_config();
        config.enable_risk = true;
        config.crisis_type = CrisisType::RiskOff;
        config.drawdown = 20.0;
        config.recovery_years = 2.0;
        config.recovery_type = RecoveryType::VShaped;

        let output = simulate(&single_asset_book(7.0), &config);
        let year1_baseline = output.baseline.value("Equities", 1).expect("year 1");
        assert_eq!(year1_baseline, 107_000.0);
        assert_approx(
            output.trajectory.value("Equities", 1).expect("year 1"),
            year1_baseline * 0.80,
        );
        let year3_baseline = output.baseline.value("Equities", 3).expect("year 3");
        assert_approx(
            output.trajectory.value("Equities", 3).expect("year 3"),
            year3_baseline * 0.82,
        );
    }

    #[test]
    fn crisis_type_none_leaves_drag_only_result() {
        let mut config = quiet_config();
        config.enable_risk = true;
        config.crisis_type = CrisisType::None;
        config.annual_fees = 1.0;
        let book = single_asset_book(6.0);

        let with_none = simulate(&book, &config);
        config.enable_risk = false;
        let disabled = simulate(&book, &config);
        assert_eq!(with_none.trajectory, disabled.trajectory);
    }

    #[test]
    fn baseline_projection_is_untouched_by_stress() {
        let book = single_asset_book(7.0);
        let quiet = simulate(&book, &quiet_config());
        let stressed = simulate(&book, &ScenarioConfig {
            years: 5,
            ..stressed_config()
        });
        assert_eq!(quiet.baseline, stressed.baseline);
        assert_ne!(stressed.baseline, stressed.trajectory);
    }

    #[test]
    fn volatility_is_rounded_and_skips_year_zero() {
        let mut config = quiet_config();
        config.enable_risk = true;
        config.crisis_type = CrisisType::None;
        config.enable_volatility = true;
        config.random_seed_base = 11;
        let book = single_asset_book(7.0);
        let output = simulate(&book, &config);

        let factors = RandomFactors::generate(book.assets(), 5, 1.0, 11);
        let noise = factors.for_asset("Equities").expect("factors");
        let series = output.trajectory.series("Equities").expect("series");
        let baseline = output.baseline.series("Equities").expect("series");
        assert_eq!(series.values[0], 100_000.0);
        for year in 1..=5 {
            let expected = round_to_cents(baseline.values[year] * (1.0 + noise[year]));
            assert_eq!(series.values[year], expected);
            assert_eq!(round_to_cents(series.values[year]), series.values[year]);
        }
    }

    #[test]
    fn volatility_needs_risk_switch() {
        let mut config = quiet_config();
        config.annual_fees = 0.5;
        config.inflation_rate = 2.5;
        config.enable_volatility = true;
        let book = AssetBook::default();

        let output = simulate(&book, &config);
        let mut drag_only = project_baseline(book.assets(), &config);
        apply_drag(&mut drag_only, &config);
        assert_eq!(output.trajectory, drag_only);
    }

    #[test]
    fn same_seed_reproduces_run_and_new_seed_changes_it() {
        let book = AssetBook::default();
        let config = stressed_config();
        let first = simulate(&book, &config);
        let second = simulate(&book, &config);
        assert_eq!(first.trajectory, second.trajectory);

        let reseeded = simulate(&book, &ScenarioConfig {
            random_seed_base: 2025,
            ..config
        });
        assert_ne!(first.trajectory, reseeded.trajectory);
    }

    #[test]
    fn metrics_skip_baseline_asset() {
        let output = simulate(&AssetBook::default(), &stressed_config());
        let book = AssetBook::default();
        assert_eq!(output.metrics.len(), book.len() - 1);
        let baseline_name = &book.baseline().expect("baseline").name;
        assert!(output.metrics_for(baseline_name).is_none());
    }

    #[test]
    fn zero_drag_leaves_values_exact() {
        let mut trajectory = project_baseline(&[asset("A", 4.0)], &quiet_config());
        let before = trajectory.clone();
        apply_drag(&mut trajectory, &quiet_config());
        assert_eq!(trajectory, before);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_baseline_asset_is_flat_under_any_scenario(
            years in 1u32..31,
            initial in 1u32..2_000_000,
            fees_bp in 0u32..301,
            inflation_bp in 0u32..1001,
            drawdown in 0u32..51,
            recovery_tenths in 10u32..301,
            seed in proptest::prelude::any::<i64>(),
            level_pct in 0u32..151,
            enable_risk in proptest::bool::ANY,
            enable_volatility in proptest::bool::ANY
        ) {
            let config = ScenarioConfig {
                initial_amount: initial as f64,
                years,
                annual_fees: fees_bp as f64 / 100.0,
                inflation_rate: inflation_bp as f64 / 100.0,
                enable_risk,
                drawdown: drawdown as f64,
                recovery_years: (recovery_tenths as f64 / 10.0).min(years as f64),
                enable_volatility,
                volatility_level: level_pct as f64 / 100.0,
                random_seed_base: seed,
                ..ScenarioConfig::default()
            };
            let book = AssetBook::default();
            let output = simulate(&book, &config);
            let baseline_name = &book.baseline().expect("baseline").name;
            let series = output.trajectory.series(baseline_name).expect("series");
            prop_assert_eq!(series.values.len(), years as usize + 1);
            for value in &series.values {
                prop_assert_eq!(*value, initial as f64);
            }
            for series in &output.trajectory.series {
                prop_assert_eq!(series.values[0], initial as f64);
            }
        }

        #[test]
        fn prop_risk_disabled_matches_closed_form(
            years in 1u32..31,
            return_bp in -500i32..1500,
            fees_bp in 0u32..301,
            inflation_bp in 0u32..1001,
            enable_volatility in proptest::bool::ANY
        ) {
            let config = ScenarioConfig {
                years,
                annual_fees: fees_bp as f64 / 100.0,
                inflation_rate: inflation_bp as f64 / 100.0,
                enable_risk: false,
                enable_volatility,
                ..ScenarioConfig::default()
            };
            let rate = return_bp as f64 / 100.0;
            let output = simulate(&single_asset_book(rate), &config);
            let drag = config.combined_drag();
            for year in 0..=years {
                let closed = config.initial_amount * (1.0 + rate / 100.0).powi(year as i32)
                    / (1.0 + drag).powi(year as i32);
                let actual = output.trajectory.value("Equities", year).expect("value");
                // Baseline values are rounded to cents before drag is applied.
                prop_assert!((actual - closed).abs() <= 0.01, "year {} actual {} closed {}", year, actual, closed);
            }
        }

        #[test]
        fn prop_metrics_drawdown_is_never_negative(
            seed in proptest::prelude::any::<i64>(),
            drawdown in 0u32..51,
            level_pct in 0u32..151
        ) {
            let config = ScenarioConfig {
                drawdown: drawdown as f64,
                volatility_level: level_pct as f64 / 100.0,
                random_seed_base: seed,
                ..stressed_config()
            };
            let output = simulate(&AssetBook::default(), &config);
            for (_, metrics) in &output.metrics {
                prop_assert!(metrics.max_drawdown >= 0.0);
            }
        }
    }
}
