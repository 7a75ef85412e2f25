use serde::Serialize;

use super::assets::AssetBook;
use super::engine::simulate;
use super::error::UnknownPreset;
use super::presets::{ScenarioPreset, find_preset};
use super::types::{ScenarioConfig, SimulationOutput};

/// The editable pair a host keeps between runs: asset table and scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    pub assets: AssetBook,
    pub config: ScenarioConfig,
}

impl Session {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn apply_preset(&mut self, label: &str) -> Result<&'static ScenarioPreset, UnknownPreset> {
        let preset = find_preset(label)?;
        preset.apply(&mut self.config);
        Ok(preset)
    }

    /// Detached copies of the assets and config, so a run never observes
    /// later edits.
    pub fn snapshot(&self) -> (AssetBook, ScenarioConfig) {
        (self.assets.clone(), self.config.clone())
    }

    pub fn run(&self) -> SimulationOutput {
        let (assets, config) = self.snapshot();
        simulate(&assets, &config)
    }
}
