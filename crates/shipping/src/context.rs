//! Carrier cost-estimation context.
//!
//! The context is a loose key/value bag handed to a carrier's pricing
//! strategy. Weight-priced carriers read a list of weights under
//! [`WEIGHTS_KEY`], expressed in the carrier's weight unit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use saleweight_core::{DomainError, DomainResult};
use saleweight_products::ProductWeights;
use saleweight_sales::{SalesOrder, line_weight, resolve_weight_uom};
use saleweight_uom::{UomConverter, UomId};

use crate::carrier::{Carrier, CarrierCostMethod};

/// Context key holding the list of weights to price.
pub const WEIGHTS_KEY: &str = "weights";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarrierContext(BTreeMap<String, JsonValue>);

impl CarrierContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: JsonValue) {
        self.0.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replace the weights to price.
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.insert(WEIGHTS_KEY, JsonValue::from(weights));
        self
    }

    /// Weights to price, if the context carries any.
    pub fn weights(&self) -> DomainResult<Option<Vec<f64>>> {
        let Some(value) = self.0.get(WEIGHTS_KEY) else {
            return Ok(None);
        };
        let weights = serde_json::from_value(value.clone()).map_err(|e| {
            DomainError::validation(format!("carrier context `{WEIGHTS_KEY}` is malformed: {e}"))
        })?;
        Ok(Some(weights))
    }
}

/// Context a host builds before this extension contributes to it.
///
/// Weight-priced carriers get one weight per weighed line, in the carrier's
/// unit; other carriers get an empty context.
pub fn base_carrier_context<P, C>(
    order: &SalesOrder,
    carrier: &Carrier,
    products: &P,
    converter: &C,
) -> DomainResult<CarrierContext>
where
    P: ProductWeights + ?Sized,
    C: UomConverter + ?Sized,
{
    let context = CarrierContext::new();
    if carrier.cost_method() != CarrierCostMethod::Weight {
        return Ok(context);
    }

    let mut weights = Vec::new();
    for line in order.lines() {
        if let Some(weight) = line_weight(line, products, converter, carrier.weight_uom())? {
            weights.push(weight);
        }
    }
    Ok(context.with_weights(weights))
}

/// Contribute the order's declared weight to a carrier context.
///
/// Only weight-priced carriers are affected, and only when the order has a
/// positive declared weight: the context then prices that single weight
/// instead of whatever the base context carried. Everything else passes
/// through.
pub fn carrier_context<C>(
    base: CarrierContext,
    order: &SalesOrder,
    carrier: &Carrier,
    converter: &C,
    default_uom: Option<&UomId>,
) -> DomainResult<CarrierContext>
where
    C: UomConverter + ?Sized,
{
    if carrier.cost_method() != CarrierCostMethod::Weight {
        return Ok(base);
    }
    let Some(weight) = order.declared_weight() else {
        return Ok(base);
    };

    let order_uom = resolve_weight_uom(order.weight_uom(), default_uom);
    let weight = converter.compute_qty(&order_uom, weight, carrier.weight_uom(), false)?;
    Ok(base.with_weights(vec![weight]))
}
