use std::f64::consts::PI;

use super::types::Asset;

const MODULUS: u64 = 2_147_483_647;
const MULTIPLIER: u64 = 16_807;

/// One Park-Miller step. Returns a uniform in `[0, 1)` and the next state.
/// States at or above the modulus are reduced first.
pub fn next_uniform(state: u64) -> (f64, u64) {
    let next = ((state % MODULUS) * MULTIPLIER) % MODULUS;
    let value = (next as f64 - 1.0) / (MODULUS - 1) as f64;
    (value, next)
}

/// Box-Muller over two consecutive uniforms. Advances the state by two steps.
pub fn next_normal(state: u64) -> (f64, u64) {
    let (u1, state) = next_uniform(state);
    let (u2, state) = next_uniform(state);
    // A state of 1 yields u1 == 0. Flooring at 1e-12 caps |z| near 7.4.
    let u1 = u1.max(1e-12);
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    (z, state)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Seeds are reduced modulo 2^31 - 1; a zero residue would lock the
    /// generator at zero and is replaced with 1.
    pub fn new(seed: i64) -> Self {
        let state = seed.rem_euclid(MODULUS as i64) as u64;
        Self {
            state: if state == 0 { 1 } else { state },
        }
    }

    pub fn state(&self) -> u64 {
        self.state
    }

    pub fn next_uniform(&mut self) -> f64 {
        let (value, state) = next_uniform(self.state);
        self.state = state;
        value
    }

    pub fn standard_normal(&mut self) -> f64 {
        let (z, state) = next_normal(self.state);
        self.state = state;
        z
    }
}

/// Per-asset noise multipliers, one per year `0..=years`, in asset order.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomFactors {
    factors: Vec<(String, Vec<f64>)>,
}

impl RandomFactors {
    /// Non-baseline assets draw `years + 1` deviates each from a single
    /// stream, in asset order. The baseline asset draws nothing.
    pub fn generate(assets: &[Asset], years: u32, volatility_level: f64, seed: i64) -> Self {
        let mut rng = SeededRng::new(seed);
        let len = years as usize + 1;
        let factors = assets
            .iter()
            .map(|asset| {
                let values = if asset.is_baseline {
                    vec![0.0; len]
                } else {
                    (0..len)
                        .map(|_| rng.standard_normal() * asset.volatility * volatility_level)
                        .collect()
                };
                (asset.name.clone(), values)
            })
            .collect();
        Self { factors }
    }

    pub fn for_asset(&self, name: &str) -> Option<&[f64]> {
        self.factors
            .iter()
            .find(|(asset, _)| asset == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}
