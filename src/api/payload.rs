use serde::Deserialize;
use tracing::debug;

use crate::core::{
    Asset, AssetBook, AssetError, AssetField, CrisisType, RecoveryType, ScenarioConfig,
    find_preset,
};

const MAX_YEARS: u32 = 30;

/// Partial scenario. Every present field overrides the base config, after
/// the optional preset has been applied.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScenarioPayload {
    pub preset: Option<String>,
    pub initial_amount: Option<f64>,
    pub years: Option<u32>,
    #[serde(alias = "fees")]
    pub annual_fees: Option<f64>,
    #[serde(alias = "inflation")]
    pub inflation_rate: Option<f64>,
    pub enable_risk: Option<bool>,
    pub crisis_type: Option<CrisisType>,
    pub drawdown: Option<f64>,
    pub recovery_years: Option<f64>,
    pub recovery_type: Option<RecoveryType>,
    pub enable_volatility: Option<bool>,
    pub volatility_level: Option<f64>,
    #[serde(alias = "seed")]
    pub random_seed_base: Option<i64>,
}

/// One-shot run: scenario overrides plus an optional full asset table.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulatePayload {
    #[serde(flatten)]
    pub scenario: ScenarioPayload,
    pub assets: Option<Vec<Asset>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetPatch {
    pub name: Option<String>,
    pub annual_return: Option<f64>,
    pub volatility: Option<f64>,
    pub drawdown_impact: Option<f64>,
    pub crisis_sensitivity: Option<f64>,
    pub color: Option<String>,
}

impl AssetPatch {
    /// Applies field edits, then the rename. Returns the asset's final name.
    /// On error the book may be partially edited; callers apply patches to a
    /// copy.
    pub fn apply(&self, book: &mut AssetBook, name: &str) -> Result<String, AssetError> {
        if book.get(name).is_none() {
            return Err(AssetError::NotFound(name.to_string()));
        }
        for (field, value) in [
            (AssetField::AnnualReturn, self.annual_return),
            (AssetField::Volatility, self.volatility),
            (AssetField::DrawdownImpact, self.drawdown_impact),
            (AssetField::CrisisSensitivity, self.crisis_sensitivity),
        ] {
            if let Some(value) = value {
                book.set_field(name, field, value)?;
            }
        }
        if let Some(color) = &self.color {
            book.set_color(name, color)?;
        }
        match &self.name {
            Some(new_name) => {
                book.rename(name, new_name)?;
                Ok(new_name.trim().to_string())
            }
            None => Ok(name.to_string()),
        }
    }
}

pub fn build_config(base: ScenarioConfig, payload: &ScenarioPayload) -> Result<ScenarioConfig, String> {
    let mut config = base;

    if let Some(label) = payload.preset.as_deref() {
        find_preset(label)
            .map_err(|e| e.to_string())?
            .apply(&mut config);
    }

    if let Some(v) = payload.initial_amount {
        config.initial_amount = v;
    }
    if let Some(v) = payload.years {
        config.years = v;
    }
    if let Some(v) = payload.annual_fees {
        config.annual_fees = v;
    }
    if let Some(v) = payload.inflation_rate {
        config.inflation_rate = v;
    }
    if let Some(v) = payload.enable_risk {
        config.enable_risk = v;
    }
    if let Some(v) = payload.crisis_type {
        config.crisis_type = v;
    }
    if let Some(v) = payload.drawdown {
        config.drawdown = v;
    }
    if let Some(v) = payload.recovery_years {
        config.recovery_years = v;
    }
    if let Some(v) = payload.recovery_type {
        config.recovery_type = v;
    }
    if let Some(v) = payload.enable_volatility {
        config.enable_volatility = v;
    }
    if let Some(v) = payload.volatility_level {
        config.volatility_level = v;
    }
    if let Some(v) = payload.random_seed_base {
        config.random_seed_base = v;
    }

    validate_config(config)
}

/// Resolves a one-shot run against the built-in defaults.
pub fn resolve_run(payload: SimulatePayload) -> Result<(AssetBook, ScenarioConfig), String> {
    let config = build_config(ScenarioConfig::default(), &payload.scenario)?;
    let assets = match payload.assets {
        Some(assets) => AssetBook::from_assets(assets).map_err(|e| e.to_string())?,
        None => AssetBook::default(),
    };
    Ok((assets, config))
}

fn validate_config(mut config: ScenarioConfig) -> Result<ScenarioConfig, String> {
    if !config.initial_amount.is_finite() || config.initial_amount <= 0.0 {
        return Err("initialAmount must be > 0".to_string());
    }
    if !(1..=MAX_YEARS).contains(&config.years) {
        return Err(format!("years must be between 1 and {MAX_YEARS}"));
    }
    check_range("annualFees", config.annual_fees, 0.0, 3.0)?;
    check_range("inflationRate", config.inflation_rate, 0.0, 10.0)?;
    check_range("drawdown", config.drawdown, 0.0, 50.0)?;
    check_range("volatilityLevel", config.volatility_level, 0.0, 1.5)?;

    if !config.recovery_years.is_finite() || config.recovery_years < 1.0 {
        return Err("recoveryYears must be >= 1".to_string());
    }
    let horizon = config.years as f64;
    if config.recovery_years > horizon {
        debug!(
            recovery_years = config.recovery_years,
            years = config.years,
            "clamping recovery period to horizon"
        );
        config.recovery_years = horizon;
    }

    Ok(config)
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), String> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(format!("{field} must be between {min} and {max}"))
    }
}
