use serde::Serialize;

use super::error::UnknownPreset;
use super::types::{CrisisType, RecoveryType, ScenarioConfig};

/// Named stress settings. Applying one overwrites only the risk and
/// volatility fields; amount, horizon, fees and inflation are kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioPreset {
    pub label: &'static str,
    pub description: &'static str,
    pub enable_risk: bool,
    pub crisis_type: CrisisType,
    pub drawdown: f64,
    pub recovery_years: f64,
    pub recovery_type: RecoveryType,
    pub enable_volatility: bool,
    pub volatility_level: f64,
}

pub const PRESETS: [ScenarioPreset; 5] = [
    ScenarioPreset {
        label: "calm-markets",
        description: "No crisis and no noise; fees and inflation only",
        enable_risk: false,
        crisis_type: CrisisType::None,
        drawdown: 0.0,
        recovery_years: 1.0,
        recovery_type: RecoveryType::VShaped,
        enable_volatility: false,
        volatility_level: 1.0,
    },
    ScenarioPreset {
        label: "mild-correction",
        description: "Short risk-off dip with a quick rebound",
        enable_risk: true,
        crisis_type: CrisisType::RiskOff,
        drawdown: 15.0,
        recovery_years: 1.0,
        recovery_type: RecoveryType::VShaped,
        enable_volatility: true,
        volatility_level: 0.75,
    },
    ScenarioPreset {
        label: "financial-crisis",
        description: "Deep risk-off crash with a slow U-shaped recovery",
        enable_risk: true,
        crisis_type: CrisisType::RiskOff,
        drawdown: 40.0,
        recovery_years: 4.0,
        recovery_type: RecoveryType::UShaped,
        enable_volatility: true,
        volatility_level: 1.25,
    },
    ScenarioPreset {
        label: "rate-shock",
        description: "Rising rates reprice duration and growth assets",
        enable_risk: true,
        crisis_type: CrisisType::RisingRates,
        drawdown: 20.0,
        recovery_years: 3.0,
        recovery_type: RecoveryType::UShaped,
        enable_volatility: true,
        volatility_level: 1.0,
    },
    ScenarioPreset {
        label: "lost-decade",
        description: "Severe drawdown followed by an L-shaped stagnation",
        enable_risk: true,
        crisis_type: CrisisType::RiskOff,
        drawdown: 35.0,
        recovery_years: 8.0,
        recovery_type: RecoveryType::LShaped,
        enable_volatility: true,
        volatility_level: 1.0,
    },
];

/// Case-insensitive lookup by label.
pub fn find_preset(label: &str) -> Result<&'static ScenarioPreset, UnknownPreset> {
    let wanted = label.trim();
    PRESETS
        .iter()
        .find(|preset| preset.label.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| UnknownPreset(label.to_string()))
}

impl ScenarioPreset {
    pub fn apply(&self, config: &mut ScenarioConfig) {
        config.enable_risk = self.enable_risk;
        config.crisis_type = self.crisis_type;
        config.drawdown = self.drawdown;
        config.recovery_years = self.recovery_years;
        config.recovery_type = self.recovery_type;
        config.enable_volatility = self.enable_volatility;
        config.volatility_level = self.volatility_level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_replaces_only_stress_fields() {
        let mut config = ScenarioConfig {
            initial_amount: 250_000.0,
            years: 20,
            annual_fees: 1.2,
            inflation_rate: 4.0,
            random_seed_base: 9,
            ..ScenarioConfig::default()
        };
        let preset = find_preset("rate-shock").expect("known preset");
        preset.apply(&mut config);

        assert_eq!(config.initial_amount, 250_000.0);
        assert_eq!(config.years, 20);
        assert_eq!(config.annual_fees, 1.2);
        assert_eq!(config.inflation_rate, 4.0);
        assert_eq!(config.random_seed_base, 9);
        assert!(config.enable_risk);
        assert_eq!(config.crisis_type, CrisisType::RisingRates);
        assert_eq!(config.drawdown, 20.0);
        assert_eq!(config.recovery_type, RecoveryType::UShaped);
    }

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        assert_eq!(
            find_preset(" Financial-Crisis ").expect("known").label,
            "financial-crisis"
        );
        assert_eq!(
            find_preset("meltdown"),
            Err(UnknownPreset("meltdown".to_string()))
        );
    }

    #[test]
    fn labels_are_unique_and_values_in_range() {
        for (i, preset) in PRESETS.iter().enumerate() {
            assert!(PRESETS[i + 1..].iter().all(|p| p.label != preset.label));
            assert!((0.0..=50.0).contains(&preset.drawdown));
            assert!((0.0..=1.5).contains(&preset.volatility_level));
            assert!(preset.recovery_years >= 1.0);
        }
    }
}
