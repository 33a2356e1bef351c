//! Carriers and how they price a shipment.

use serde::{Deserialize, Serialize};

use saleweight_core::{AggregateId, DomainError, DomainResult, Entity, ValueObject};
use saleweight_uom::{Uom, UomId};

use crate::context::CarrierContext;

/// Carrier identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarrierId(pub AggregateId);

impl CarrierId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

/// Strategy a carrier uses to compute its cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarrierCostMethod {
    /// Flat price per shipment.
    Product,
    /// Price looked up from the shipped weight.
    Weight,
}

/// Price charged from `weight` (in the carrier's weight unit) upwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightPriceBracket {
    pub weight: f64,
    /// Price in smallest currency unit (e.g., cents).
    pub price: u64,
}

impl ValueObject for WeightPriceBracket {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Carrier {
    id: CarrierId,
    name: String,
    cost_method: CarrierCostMethod,
    /// Price in smallest currency unit, used by [`CarrierCostMethod::Product`].
    flat_price: u64,
    weight_uom: UomId,
    price_list: Vec<WeightPriceBracket>,
}

impl Carrier {
    /// A carrier charging the same price for every shipment.
    pub fn flat(id: CarrierId, name: impl Into<String>, price: u64) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("carrier name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            cost_method: CarrierCostMethod::Product,
            flat_price: price,
            weight_uom: UomId::new("kg"),
            price_list: Vec::new(),
        })
    }

    /// A carrier pricing by weight, with brackets expressed in `weight_uom`.
    pub fn weight_based(
        id: CarrierId,
        name: impl Into<String>,
        weight_uom: &Uom,
        mut price_list: Vec<WeightPriceBracket>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("carrier name cannot be empty"));
        }
        if !weight_uom.is_weight() {
            return Err(DomainError::validation(format!(
                "carrier weight unit {} is not a weight unit",
                weight_uom.id
            )));
        }
        if price_list
            .iter()
            .any(|b| !b.weight.is_finite() || b.weight < 0.0)
        {
            return Err(DomainError::validation(
                "price list weights must be non-negative numbers",
            ));
        }
        price_list.sort_by(|a, b| a.weight.total_cmp(&b.weight));

        Ok(Self {
            id,
            name,
            cost_method: CarrierCostMethod::Weight,
            flat_price: 0,
            weight_uom: weight_uom.id.clone(),
            price_list,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cost_method(&self) -> CarrierCostMethod {
        self.cost_method
    }

    /// Unit the price list and context weights are expressed in.
    pub fn weight_uom(&self) -> &UomId {
        &self.weight_uom
    }

    pub fn price_list(&self) -> &[WeightPriceBracket] {
        &self.price_list
    }

    /// Price of the highest bracket starting at or below `weight`.
    ///
    /// Zero for an empty shipment or a weight under every bracket.
    pub fn weight_price(&self, weight: f64) -> u64 {
        if !(weight > 0.0) {
            return 0;
        }
        self.price_list
            .iter()
            .rev()
            .find(|bracket| bracket.weight <= weight)
            .map_or(0, |bracket| bracket.price)
    }

    /// Cost of shipping under `context`.
    pub fn compute_cost(&self, context: &CarrierContext) -> DomainResult<u64> {
        match self.cost_method {
            CarrierCostMethod::Product => Ok(self.flat_price),
            CarrierCostMethod::Weight => {
                let total: f64 = context.weights()?.unwrap_or_default().iter().sum();
                Ok(self.weight_price(total))
            }
        }
    }
}

impl Entity for Carrier {
    type Id = CarrierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
