use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrisisType {
    #[serde(alias = "NONE")]
    None,
    #[serde(alias = "riskOff", alias = "risk_off", alias = "RISK_OFF")]
    RiskOff,
    #[serde(alias = "risingRates", alias = "rising_rates", alias = "RISING_RATES")]
    RisingRates,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecoveryType {
    #[serde(alias = "vShaped", alias = "v_shaped", alias = "V_SHAPED", alias = "v")]
    VShaped,
    #[serde(alias = "uShaped", alias = "u_shaped", alias = "U_SHAPED", alias = "u")]
    UShaped,
    #[serde(alias = "lShaped", alias = "l_shaped", alias = "L_SHAPED", alias = "l")]
    LShaped,
}

impl RecoveryType {
    /// Exponent applied to normalized recovery progress. Larger values keep
    /// the path near the trough for longer.
    pub fn exponent(self) -> f64 {
        match self {
            RecoveryType::VShaped => 0.5,
            RecoveryType::UShaped => 1.5,
            RecoveryType::LShaped => 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub name: String,
    /// Nominal annual return in percent.
    pub annual_return: f64,
    /// Standard deviation of annual return noise as a decimal fraction.
    pub volatility: f64,
    pub drawdown_impact: f64,
    pub crisis_sensitivity: f64,
    #[serde(default)]
    pub is_baseline: bool,
    #[serde(default)]
    pub color: String,
}

impl Asset {
    pub fn baseline(name: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            annual_return: 0.0,
            volatility: 0.0,
            drawdown_impact: 0.0,
            crisis_sensitivity: 0.0,
            is_baseline: true,
            color: color.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioConfig {
    pub initial_amount: f64,
    pub years: u32,
    /// Annual fees in percent.
    pub annual_fees: f64,
    /// Annual inflation in percent.
    pub inflation_rate: f64,
    pub enable_risk: bool,
    pub crisis_type: CrisisType,
    /// Market-wide crisis severity in percent.
    pub drawdown: f64,
    pub recovery_years: f64,
    pub recovery_type: RecoveryType,
    pub enable_volatility: bool,
    pub volatility_level: f64,
    pub random_seed_base: i64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            initial_amount: 100_000.0,
            years: 10,
            annual_fees: 0.5,
            inflation_rate: 2.5,
            enable_risk: false,
            crisis_type: CrisisType::RiskOff,
            drawdown: 30.0,
            recovery_years: 3.0,
            recovery_type: RecoveryType::UShaped,
            enable_volatility: false,
            volatility_level: 1.0,
            random_seed_base: 42,
        }
    }
}

impl ScenarioConfig {
    /// Fees plus inflation as a decimal annual decay rate.
    pub fn combined_drag(&self) -> f64 {
        (self.annual_fees + self.inflation_rate) / 100.0
    }

    pub fn crisis_active(&self) -> bool {
        self.enable_risk && self.crisis_type != CrisisType::None
    }

    /// Volatility is a risk stage: the master switch must be on as well.
    pub fn volatility_active(&self) -> bool {
        self.enable_risk && self.enable_volatility
    }
}

/// Yearly values for one asset, indexed by year (`values[0]` is the start).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSeries {
    pub name: String,
    pub is_baseline: bool,
    pub values: Vec<f64>,
}

/// Per-asset series in asset order. Serializes as one record per year.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    pub series: Vec<AssetSeries>,
}

impl Trajectory {
    pub fn years(&self) -> u32 {
        self.series
            .first()
            .map(|s| s.values.len().saturating_sub(1) as u32)
            .unwrap_or(0)
    }

    pub fn series(&self, name: &str) -> Option<&AssetSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    pub fn value(&self, name: &str, year: u32) -> Option<f64> {
        self.series(name)
            .and_then(|s| s.values.get(year as usize))
            .copied()
    }

    pub fn rows(&self) -> Vec<YearRow> {
        (0..=self.years())
            .map(|year| YearRow {
                year,
                values: self
                    .series
                    .iter()
                    .map(|s| (s.name.clone(), s.values[year as usize]))
                    .collect(),
            })
            .collect()
    }
}

impl Serialize for Trajectory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows().serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearRow {
    pub year: u32,
    #[serde(serialize_with = "serialize_named")]
    pub values: Vec<(String, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMetrics {
    pub cagr: f64,
    pub volatility: f64,
    pub max_drawdown: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutput {
    /// Compounded nominal values with no drag or stress applied.
    pub baseline: Trajectory,
    pub trajectory: Trajectory,
    #[serde(serialize_with = "serialize_named")]
    pub metrics: Vec<(String, AssetMetrics)>,
}

impl SimulationOutput {
    pub fn metrics_for(&self, name: &str) -> Option<&AssetMetrics> {
        self.metrics
            .iter()
            .find(|(asset, _)| asset == name)
            .map(|(_, m)| m)
    }
}

// Keeps asset order in the emitted JSON object.
#[allow(clippy::ptr_arg)]
fn serialize_named<S, V>(entries: &Vec<(String, V)>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (name, value) in entries {
        map.serialize_entry(name, value)?;
    }
    map.end()
}
