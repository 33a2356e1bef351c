//! In-memory unit catalog and the conversion contract.

use std::collections::HashMap;

use crate::error::UomError;
use crate::uom::{Uom, UomCategory, UomId};

/// Unit-of-measure conversion service.
///
/// Implementors only need to resolve units; conversion itself is shared.
pub trait UomConverter {
    /// Look up a unit by id.
    fn uom(&self, id: &UomId) -> Result<&Uom, UomError>;

    /// Convert `qty` expressed in `from` into `to`.
    ///
    /// Fails with [`UomError::IncompatibleCategories`] when the units belong
    /// to different categories. With `round` set, the result is rounded to
    /// the target unit's rounding step.
    fn compute_qty(&self, from: &UomId, qty: f64, to: &UomId, round: bool) -> Result<f64, UomError> {
        if !qty.is_finite() {
            return Err(UomError::InvalidQuantity(qty));
        }
        let from_uom = self.uom(from)?;
        let to_uom = self.uom(to)?;

        if from_uom.category != to_uom.category {
            return Err(UomError::IncompatibleCategories {
                from: from_uom.id.clone(),
                from_category: from_uom.category,
                to: to_uom.id.clone(),
                to_category: to_uom.category,
            });
        }

        let amount = if from_uom.id == to_uom.id {
            qty
        } else {
            qty * from_uom.factor / to_uom.factor
        };

        Ok(if round { to_uom.round(amount) } else { amount })
    }
}

/// In-memory catalog of units keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct UomCatalog {
    units: HashMap<UomId, Uom>,
}

impl UomCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog seeded with common weight and length units.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for uom in [
            Uom::new("g", "Gram", UomCategory::Weight, 0.001, 0.01, 2),
            Uom::new("kg", "Kilogram", UomCategory::Weight, 1.0, 0.01, 2),
            Uom::new("t", "Tonne", UomCategory::Weight, 1000.0, 0.001, 3),
            Uom::new("oz", "Ounce", UomCategory::Weight, 0.028349523125, 0.01, 2),
            Uom::new("lb", "Pound", UomCategory::Weight, 0.45359237, 0.01, 2),
            Uom::new("m", "Meter", UomCategory::Length, 1.0, 0.01, 2),
            Uom::new("cm", "Centimeter", UomCategory::Length, 0.01, 1.0, 0),
            Uom::new("u", "Unit", UomCategory::Unit, 1.0, 1.0, 0),
        ] {
            catalog.insert(uom);
        }
        catalog
    }

    /// Insert or replace a unit.
    pub fn insert(&mut self, uom: Uom) {
        self.units.insert(uom.id.clone(), uom);
    }

    pub fn get(&self, id: &UomId) -> Option<&Uom> {
        self.units.get(id)
    }

    /// Resolve `id` and check it is a weight unit.
    pub fn weight_uom(&self, id: &UomId) -> Result<&Uom, UomError> {
        let uom = self.uom(id)?;
        if !uom.is_weight() {
            return Err(UomError::IncompatibleCategories {
                from: uom.id.clone(),
                from_category: uom.category,
                to: uom.id.clone(),
                to_category: UomCategory::Weight,
            });
        }
        Ok(uom)
    }
}

impl UomConverter for UomCatalog {
    fn uom(&self, id: &UomId) -> Result<&Uom, UomError> {
        self.units
            .get(id)
            .ok_or_else(|| UomError::UnknownUom(id.clone()))
    }
}
