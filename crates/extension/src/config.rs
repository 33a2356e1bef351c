//! Extension configuration.
//!
//! Read from the environment the same way the host reads its own settings,
//! or from a JSON document when the host keeps configuration records.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use saleweight_core::DomainError;
use saleweight_uom::{UomCatalog, UomError, UomId};

/// Unit symbol used when an order has no weight unit.
pub const ENV_DEFAULT_WEIGHT_UOM: &str = "SALEWEIGHT_DEFAULT_WEIGHT_UOM";

/// Round the lines weight to the unit's rounding step (`true`/`false`/`1`/`0`).
pub const ENV_ROUND_LINES_WEIGHT: &str = "SALEWEIGHT_ROUND_LINES_WEIGHT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("default weight unit {uom} is not usable")]
    DefaultUom {
        uom: UomId,
        #[source]
        source: UomError,
    },

    #[error("sale field dependencies are inconsistent")]
    Dependencies(#[source] DomainError),

    #[error("malformed configuration document")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaleWeightConfig {
    /// Unit used when an order has none; kilograms when unset.
    pub default_weight_uom: Option<UomId>,
    /// Round the lines weight once, after summation.
    pub round_lines_weight: bool,
}

impl SaleWeightConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup (environment, a map in tests, ...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_weight_uom = lookup(ENV_DEFAULT_WEIGHT_UOM)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(UomId::new);

        let round_lines_weight = match lookup(ENV_ROUND_LINES_WEIGHT) {
            None => false,
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "" | "0" | "false" | "no" => false,
                "1" | "true" | "yes" => true,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_ROUND_LINES_WEIGHT,
                        value,
                    });
                }
            },
        };

        Ok(Self {
            default_weight_uom,
            round_lines_weight,
        })
    }

    pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(document)?)
    }

    /// The configured default unit, checked to be a known weight unit.
    pub fn resolve_default_uom(&self, catalog: &UomCatalog) -> Result<Option<UomId>, ConfigError> {
        let Some(uom) = &self.default_weight_uom else {
            return Ok(None);
        };
        catalog
            .weight_uom(uom)
            .map(|found| Some(found.id.clone()))
            .map_err(|source| ConfigError::DefaultUom {
                uom: uom.clone(),
                source,
            })
    }
}
