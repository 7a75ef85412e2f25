use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::AssetError;
use super::types::Asset;

const NEW_ASSET_PREFIX: &str = "New Asset";
const NEW_ASSET_COLOR: &str = "#64748b";

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetField {
    AnnualReturn,
    Volatility,
    DrawdownImpact,
    CrisisSensitivity,
}

impl AssetField {
    pub fn as_str(self) -> &'static str {
        match self {
            AssetField::AnnualReturn => "annualReturn",
            AssetField::Volatility => "volatility",
            AssetField::DrawdownImpact => "drawdownImpact",
            AssetField::CrisisSensitivity => "crisisSensitivity",
        }
    }

    fn validate(self, value: f64) -> Result<(), AssetError> {
        let (ok, expected) = match self {
            AssetField::AnnualReturn => (value.is_finite(), "finite"),
            AssetField::Volatility | AssetField::DrawdownImpact => {
                (value.is_finite() && value >= 0.0, "finite and >= 0")
            }
            AssetField::CrisisSensitivity => {
                ((0.0..=2.0).contains(&value), "between 0 and 2")
            }
        };
        if ok {
            Ok(())
        } else {
            Err(AssetError::InvalidField {
                field: self,
                value,
                expected,
            })
        }
    }

    fn slot(self, asset: &mut Asset) -> &mut f64 {
        match self {
            AssetField::AnnualReturn => &mut asset.annual_return,
            AssetField::Volatility => &mut asset.volatility,
            AssetField::DrawdownImpact => &mut asset.drawdown_impact,
            AssetField::CrisisSensitivity => &mut asset.crisis_sensitivity,
        }
    }
}

impl fmt::Display for AssetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asset table keyed by name, kept in insertion order.
///
/// Order matters: volatility factors are drawn from one RNG stream in this
/// order, so reordering assets changes every stochastic run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AssetBook {
    assets: Vec<Asset>,
}

impl Default for AssetBook {
    fn default() -> Self {
        Self {
            assets: default_assets(),
        }
    }
}

impl AssetBook {
    /// Validates a caller-supplied table. Exactly one baseline asset is
    /// required; its numeric fields are forced to zero.
    pub fn from_assets(assets: Vec<Asset>) -> Result<Self, AssetError> {
        let baseline_count = assets.iter().filter(|a| a.is_baseline).count();
        if baseline_count != 1 {
            return Err(AssetError::BaselineCount(baseline_count));
        }

        let mut book = Self {
            assets: Vec::with_capacity(assets.len()),
        };
        for mut asset in assets {
            asset.name = normalized_name(&asset.name)?;
            if book.get(&asset.name).is_some() {
                return Err(AssetError::DuplicateName(asset.name));
            }
            if asset.is_baseline {
                asset = Asset::baseline(&asset.name, &asset.color);
            } else {
                for field in [
                    AssetField::AnnualReturn,
                    AssetField::Volatility,
                    AssetField::DrawdownImpact,
                    AssetField::CrisisSensitivity,
                ] {
                    field.validate(*field.slot(&mut asset))?;
                }
            }
            book.assets.push(asset);
        }
        Ok(book)
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.name == name)
    }

    pub fn baseline(&self) -> Option<&Asset> {
        self.assets.iter().find(|a| a.is_baseline)
    }

    /// Appends an asset with default fields under the first free
    /// `New Asset N` name.
    pub fn add(&mut self) -> &Asset {
        let name = (1..)
            .map(|n| format!("{NEW_ASSET_PREFIX} {n}"))
            .find(|candidate| self.get(candidate).is_none())
            .unwrap_or_else(|| NEW_ASSET_PREFIX.to_string());
        self.assets.push(Asset {
            name,
            annual_return: 5.0,
            volatility: 0.10,
            drawdown_impact: 1.0,
            crisis_sensitivity: 1.0,
            is_baseline: false,
            color: NEW_ASSET_COLOR.to_string(),
        });
        &self.assets[self.assets.len() - 1]
    }

    /// Re-keys an asset in place, keeping its position.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), AssetError> {
        let new = normalized_name(new)?;
        let index = self.editable_index(old)?;
        if new == old {
            return Ok(());
        }
        if self.get(&new).is_some() {
            return Err(AssetError::DuplicateName(new));
        }
        self.assets[index].name = new;
        Ok(())
    }

    pub fn set_field(&mut self, name: &str, field: AssetField, value: f64) -> Result<(), AssetError> {
        field.validate(value)?;
        let index = self.editable_index(name)?;
        *field.slot(&mut self.assets[index]) = value;
        Ok(())
    }

    pub fn set_color(&mut self, name: &str, color: &str) -> Result<(), AssetError> {
        let index = self.editable_index(name)?;
        self.assets[index].color = color.to_string();
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<Asset, AssetError> {
        let index = self.editable_index(name)?;
        Ok(self.assets.remove(index))
    }

    fn editable_index(&self, name: &str) -> Result<usize, AssetError> {
        let index = self
            .assets
            .iter()
            .position(|a| a.name == name)
            .ok_or_else(|| AssetError::NotFound(name.to_string()))?;
        if self.assets[index].is_baseline {
            return Err(AssetError::BaselineImmutable(name.to_string()));
        }
        Ok(index)
    }
}

fn normalized_name(name: &str) -> Result<String, AssetError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AssetError::EmptyName);
    }
    Ok(trimmed.to_string())
}

fn default_assets() -> Vec<Asset> {
    vec![
        Asset::baseline("Cash (No Scenario)", "#9ca3af"),
        market_asset("Global Equities", [7.0, 0.15, 1.0, 1.0], "#2563eb"),
        market_asset("Government Bonds", [3.0, 0.05, 0.3, 0.5], "#16a34a"),
        market_asset("Real Estate", [5.0, 0.10, 0.8, 0.9], "#d97706"),
        market_asset("Gold", [4.0, 0.12, 0.2, 0.3], "#ca8a04"),
        market_asset("Emerging Markets", [9.0, 0.22, 1.4, 1.5], "#dc2626"),
    ]
}

// [annual return %, volatility, drawdown impact, crisis sensitivity]
fn market_asset(name: &str, fields: [f64; 4], color: &str) -> Asset {
    let [annual_return, volatility, drawdown_impact, crisis_sensitivity] = fields;
    Asset {
        name: name.to_string(),
        annual_return,
        volatility,
        drawdown_impact,
        crisis_sensitivity,
        is_baseline: false,
        color: color.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASELINE: &str = "Cash (No Scenario)";

    fn names(book: &AssetBook) -> Vec<&str> {
        book.assets().iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn default_table_has_single_zeroed_baseline_first() {
        let book = AssetBook::default();
        assert_eq!(book.len(), 6);
        let baseline = book.baseline().expect("baseline");
        assert_eq!(baseline.name, BASELINE);
        assert_eq!(book.assets()[0].name, BASELINE);
        assert_eq!(baseline.annual_return, 0.0);
        assert_eq!(baseline.volatility, 0.0);
        assert_eq!(baseline.drawdown_impact, 0.0);
        assert_eq!(baseline.crisis_sensitivity, 0.0);
        assert_eq!(book.assets().iter().filter(|a| a.is_baseline).count(), 1);
    }

    #[test]
    fn add_generates_first_free_name() {
        let mut book = AssetBook::default();
        assert_eq!(book.add().name, "New Asset 1");
        assert_eq!(book.add().name, "New Asset 2");
        book.remove("New Asset 1").expect("removable");
        let added = book.add();
        assert_eq!(added.name, "New Asset 1");
        assert_eq!(added.annual_return, 5.0);
        assert!(!added.is_baseline);
    }

    #[test]
    fn rename_keeps_position_and_rejects_duplicates() {
        let mut book = AssetBook::default();
        book.rename("Gold", "  Bullion ").expect("rename");
        assert_eq!(names(&book)[4], "Bullion");
        assert!(book.get("Gold").is_none());

        let err = book.rename("Bullion", "Real Estate").expect_err("duplicate");
        assert_eq!(err, AssetError::DuplicateName("Real Estate".to_string()));
        assert_eq!(book.rename("Bullion", "   "), Err(AssetError::EmptyName));
        assert_eq!(
            book.rename("Missing", "Other"),
            Err(AssetError::NotFound("Missing".to_string()))
        );
        book.rename("Bullion", "Bullion").expect("same name is a no-op");
    }

    #[test]
    fn baseline_rejects_every_mutation() {
        let mut book = AssetBook::default();
        let before = book.clone();
        let immutable = AssetError::BaselineImmutable(BASELINE.to_string());

        assert_eq!(book.remove(BASELINE), Err(immutable.clone()));
        assert_eq!(book.rename(BASELINE, "Cash"), Err(immutable.clone()));
        assert_eq!(
            book.set_field(BASELINE, AssetField::AnnualReturn, 3.0),
            Err(immutable.clone())
        );
        assert_eq!(book.set_color(BASELINE, "#000000"), Err(immutable));
        assert_eq!(book, before);
    }

    #[test]
    fn set_field_validates_ranges() {
        let mut book = AssetBook::default();
        book.set_field("Gold", AssetField::CrisisSensitivity, 2.0)
            .expect("upper bound allowed");
        book.set_field("Gold", AssetField::AnnualReturn, -3.5)
            .expect("negative returns allowed");
        assert_eq!(book.get("Gold").expect("gold").annual_return, -3.5);

        let err = book
            .set_field("Gold", AssetField::CrisisSensitivity, 2.1)
            .expect_err("out of range");
        assert!(err.to_string().contains("crisisSensitivity"));
        assert!(book.set_field("Gold", AssetField::Volatility, -0.1).is_err());
        assert!(book.set_field("Gold", AssetField::AnnualReturn, f64::NAN).is_err());
        assert!(
            book.set_field("Gold", AssetField::DrawdownImpact, f64::INFINITY)
                .is_err()
        );
    }

    #[test]
    fn from_assets_requires_one_baseline_and_unique_names() {
        let defaults = AssetBook::default().assets().to_vec();

        let mut no_baseline = defaults.clone();
        no_baseline.remove(0);
        assert_eq!(
            AssetBook::from_assets(no_baseline),
            Err(AssetError::BaselineCount(0))
        );

        let mut duplicated = defaults.clone();
        duplicated[2].name = "Gold ".to_string();
        assert_eq!(
            AssetBook::from_assets(duplicated),
            Err(AssetError::DuplicateName("Gold".to_string()))
        );

        let mut unnamed = defaults.clone();
        unnamed[1].name = String::new();
        assert_eq!(AssetBook::from_assets(unnamed), Err(AssetError::EmptyName));
    }

    #[test]
    fn from_assets_zeroes_baseline_fields() {
        let mut assets = AssetBook::default().assets().to_vec();
        assets[0].annual_return = 4.0;
        assets[0].volatility = 0.3;
        let book = AssetBook::from_assets(assets).expect("valid");
        let baseline = book.baseline().expect("baseline");
        assert_eq!(baseline.annual_return, 0.0);
        assert_eq!(baseline.volatility, 0.0);
        assert_eq!(baseline.color, "#9ca3af");
    }
}
