//! Dependency graph between an order's stored and derived fields.
//!
//! Each derived field names the fields it is computed from. When a set of
//! fields changes, [`FieldGraph::affected_by`] yields every field that must be
//! recomputed, inputs before dependents, so a recomputation never reads a
//! stale value.

use std::collections::{BTreeMap, BTreeSet};

use saleweight_core::{DomainError, DomainResult};

/// Fields of a sale that take part in weight recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SaleField {
    Lines,
    Carrier,
    Weight,
    WeightUom,
    WeightDigits,
    WeightLines,
    CarrierContext,
    ShipmentCost,
}

/// Directed acyclic graph of `field <- inputs` declarations.
#[derive(Debug, Clone)]
pub struct FieldGraph<F> {
    inputs: BTreeMap<F, BTreeSet<F>>,
}

impl<F> Default for FieldGraph<F> {
    fn default() -> Self {
        Self {
            inputs: BTreeMap::new(),
        }
    }
}

impl<F> FieldGraph<F>
where
    F: Copy + Ord + core::fmt::Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `field` is computed from `inputs`.
    ///
    /// Declarations accumulate. A declaration that would make a field depend
    /// on itself, directly or transitively, is rejected and leaves the graph
    /// unchanged.
    pub fn declare(&mut self, field: F, inputs: &[F]) -> DomainResult<()> {
        for input in inputs {
            if *input == field || self.depends_on(*input, field) {
                return Err(DomainError::invariant(format!(
                    "field dependency cycle: {field:?} <- {input:?}"
                )));
            }
        }
        self.inputs
            .entry(field)
            .or_default()
            .extend(inputs.iter().copied());
        Ok(())
    }

    /// Direct inputs of `field`.
    pub fn inputs_of(&self, field: F) -> impl Iterator<Item = F> + '_ {
        self.inputs.get(&field).into_iter().flatten().copied()
    }

    /// Whether `field` is computed (transitively) from `input`.
    pub fn depends_on(&self, field: F, input: F) -> bool {
        let mut stack = vec![field];
        let mut seen = BTreeSet::new();
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            for next in self.inputs_of(current) {
                if next == input {
                    return true;
                }
                stack.push(next);
            }
        }
        false
    }

    /// Every field to recompute after `changed`, in dependency order.
    ///
    /// The changed fields themselves are not included. Ties are broken by the
    /// field ordering so the result is deterministic.
    pub fn affected_by(&self, changed: &[F]) -> Vec<F> {
        let affected: BTreeSet<F> = self
            .inputs
            .keys()
            .copied()
            .filter(|field| changed.iter().any(|c| self.depends_on(*field, *c)))
            .collect();

        // Kahn's algorithm restricted to the affected sub-graph.
        let mut pending: BTreeMap<F, usize> = affected
            .iter()
            .map(|field| {
                let blocking = self.inputs_of(*field).filter(|i| affected.contains(i)).count();
                (*field, blocking)
            })
            .collect();

        let mut ordered = Vec::with_capacity(affected.len());
        while let Some(next) = pending
            .iter()
            .find(|(_, blocking)| **blocking == 0)
            .map(|(field, _)| *field)
        {
            pending.remove(&next);
            ordered.push(next);
            for (field, blocking) in pending.iter_mut() {
                if self.inputs_of(*field).any(|i| i == next) {
                    *blocking -= 1;
                }
            }
        }
        ordered
    }
}

impl FieldGraph<SaleField> {
    /// Dependencies of the shipping-weight fields of a sale.
    ///
    /// The carrier context reads the declared weight, and the shipment cost
    /// reads the carrier context, so weight edits always reach the cost.
    pub fn sale_weight() -> DomainResult<Self> {
        use SaleField::*;

        let mut graph = Self::new();
        let declarations: [(SaleField, &[SaleField]); 4] = [
            (WeightDigits, &[WeightUom]),
            (WeightLines, &[Lines, WeightUom]),
            (CarrierContext, &[Carrier, Weight, WeightUom, Lines]),
            (ShipmentCost, &[CarrierContext, Carrier, Lines, Weight]),
        ];
        for (field, inputs) in declarations {
            graph.declare(field, inputs)?;
        }
        Ok(graph)
    }
}
