mod assets;
mod crisis;
mod engine;
mod error;
mod metrics;
mod presets;
mod rng;
mod session;
mod types;

pub use assets::{AssetBook, AssetField};
pub use crisis::{apply_crisis, drawdown_impact_decimal, permanent_damage_ratio};
pub use engine::{apply_drag, apply_volatility, project_baseline, simulate};
pub use error::{AssetError, UnknownPreset};
pub use metrics::{asset_metrics, compute_metrics};
pub use presets::{PRESETS, ScenarioPreset, find_preset};
pub use rng::{RandomFactors, SeededRng, next_normal, next_uniform};
pub use session::Session;
pub use types::{
    Asset, AssetMetrics, AssetSeries, CrisisType, RecoveryType, ScenarioConfig,
    SimulationOutput, Trajectory, YearRow,
};
