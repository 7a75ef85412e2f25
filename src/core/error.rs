use super::assets::AssetField;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssetError {
    #[error("asset name must not be empty")]
    EmptyName,

    #[error("an asset named '{0}' already exists")]
    DuplicateName(String),

    #[error("no asset named '{0}'")]
    NotFound(String),

    #[error("'{0}' is the baseline asset and cannot be modified or removed")]
    BaselineImmutable(String),

    #[error("{field} must be {expected}, got {value}")]
    InvalidField {
        field: AssetField,
        value: f64,
        expected: &'static str,
    },

    #[error("asset table must contain exactly one baseline asset, found {0}")]
    BaselineCount(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown preset '{0}'")]
pub struct UnknownPreset(pub String);
