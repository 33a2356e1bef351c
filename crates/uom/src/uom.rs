use serde::{Deserialize, Serialize};

use saleweight_core::Entity;

/// Unit of measure identifier (its symbol, e.g. `"kg"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UomId(String);

impl UomId {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for UomId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UomId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Measurement category. Conversion is only defined inside one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UomCategory {
    Weight,
    Length,
    Unit,
}

impl core::fmt::Display for UomCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            UomCategory::Weight => "weight",
            UomCategory::Length => "length",
            UomCategory::Unit => "unit",
        };
        f.write_str(name)
    }
}

/// A unit of measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uom {
    pub id: UomId,
    pub name: String,
    pub category: UomCategory,
    /// How many category reference units one of this unit is worth
    /// (kilogram is the weight reference, so `g` has factor `0.001`).
    pub factor: f64,
    /// Rounding step applied when a converted quantity is rounded.
    pub rounding: f64,
    /// Decimal digits used to display quantities in this unit.
    pub digits: u32,
}

impl Uom {
    pub fn new(
        symbol: &str,
        name: &str,
        category: UomCategory,
        factor: f64,
        rounding: f64,
        digits: u32,
    ) -> Self {
        Self {
            id: UomId::new(symbol),
            name: name.to_string(),
            category,
            factor,
            rounding,
            digits,
        }
    }

    pub fn is_weight(&self) -> bool {
        self.category == UomCategory::Weight
    }

    /// Round `value` to the nearest multiple of this unit's rounding step.
    ///
    /// The result is trimmed to `digits` decimals so that float noise from the
    /// step multiplication (e.g. `0.30000000000000004`) does not leak out.
    pub fn round(&self, value: f64) -> f64 {
        if !(self.rounding > 0.0) {
            return value;
        }
        let stepped = (value / self.rounding).round() * self.rounding;
        let scale = 10f64.powi(self.digits as i32);
        (stepped * scale).round() / scale
    }
}

impl Entity for Uom {
    type Id = UomId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
