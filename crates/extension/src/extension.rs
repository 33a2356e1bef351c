//! The sale weight extension bundle.

use chrono::{DateTime, Utc};

use saleweight_core::DomainResult;
use saleweight_invoicing::Invoice;
use saleweight_products::ProductWeights;
use saleweight_events::execute;
use saleweight_sales::{
    DEFAULT_WEIGHT_DIGITS, FieldGraph, SaleField, SalesOrder, SalesOrderCommand, SalesOrderEvent,
    SetWeightUom, resolve_weight_uom, weight_digits,
};
use saleweight_shipping::{
    Carrier, CarrierContext, Shipment, ShipmentKind, base_carrier_context, carrier_context,
};
use saleweight_uom::{UomCatalog, UomId};

use crate::config::{ConfigError, SaleWeightConfig};
use crate::hooks::{InvoiceHost, ShipmentHost, propagate_to_invoice, propagate_to_shipments};

/// Fields this extension derives for a sale.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleWeightFields {
    pub weight_digits: u32,
    /// Sum of the lines' weights, in the order's resolved weight unit.
    pub weight_lines: f64,
    /// `None` when no carrier is selected.
    pub carrier_context: Option<CarrierContext>,
    /// Price in smallest currency unit; `None` when no carrier is selected.
    pub shipment_cost: Option<u64>,
}

impl Default for SaleWeightFields {
    fn default() -> Self {
        Self {
            weight_digits: DEFAULT_WEIGHT_DIGITS,
            weight_lines: 0.0,
            carrier_context: None,
            shipment_cost: None,
        }
    }
}

/// Stored fields a host can report as changed.
const INPUT_FIELDS: [SaleField; 4] = [
    SaleField::Lines,
    SaleField::Carrier,
    SaleField::Weight,
    SaleField::WeightUom,
];

#[derive(Debug, Clone)]
pub struct SaleWeightExtension {
    config: SaleWeightConfig,
    default_uom: Option<UomId>,
    uoms: UomCatalog,
    graph: FieldGraph<SaleField>,
}

impl SaleWeightExtension {
    /// Build the extension, checking the configured default unit against `uoms`.
    pub fn new(config: SaleWeightConfig, uoms: UomCatalog) -> Result<Self, ConfigError> {
        let default_uom = config.resolve_default_uom(&uoms)?;
        let graph = FieldGraph::sale_weight().map_err(ConfigError::Dependencies)?;
        Ok(Self {
            config,
            default_uom,
            uoms,
            graph,
        })
    }

    pub fn config(&self) -> &SaleWeightConfig {
        &self.config
    }

    pub fn uoms(&self) -> &UomCatalog {
        &self.uoms
    }

    pub fn graph(&self) -> &FieldGraph<SaleField> {
        &self.graph
    }

    /// Unit the order's weights are expressed in.
    pub fn weight_uom(&self, order: &SalesOrder) -> UomId {
        resolve_weight_uom(order.weight_uom(), self.default_uom.as_ref())
    }

    pub fn lines_weight<P>(&self, order: &SalesOrder, products: &P) -> DomainResult<f64>
    where
        P: ProductWeights + ?Sized,
    {
        order.lines_weight(
            products,
            &self.uoms,
            self.default_uom.as_ref(),
            self.config.round_lines_weight,
        )
    }

    pub fn weight_digits(&self, order: &SalesOrder) -> u32 {
        weight_digits(order.weight_uom().and_then(|id| self.uoms.get(id)))
    }

    /// Reject units that are unknown or do not measure weight.
    pub fn validate_weight_uom(&self, uom: &UomId) -> DomainResult<()> {
        self.uoms.weight_uom(uom)?;
        Ok(())
    }

    /// Change the order's weight unit, accepting only known weight units.
    pub fn set_weight_uom(
        &self,
        order: &mut SalesOrder,
        cmd: &SetWeightUom,
    ) -> DomainResult<Vec<SalesOrderEvent>> {
        if let Some(uom) = &cmd.weight_uom {
            self.validate_weight_uom(uom)?;
        }
        execute(order, &SalesOrderCommand::SetWeightUom(cmd.clone()))
    }

    /// Carrier context for pricing `carrier`, with the declared weight applied.
    pub fn carrier_context<P>(
        &self,
        order: &SalesOrder,
        carrier: &Carrier,
        products: &P,
    ) -> DomainResult<CarrierContext>
    where
        P: ProductWeights + ?Sized,
    {
        let base = base_carrier_context(order, carrier, products, &self.uoms)?;
        carrier_context(base, order, carrier, &self.uoms, self.default_uom.as_ref())
    }

    /// Recompute every field affected by `changed`, in dependency order.
    ///
    /// Returns the fields that were recomputed.
    pub fn recompute<P>(
        &self,
        order: &SalesOrder,
        carrier: Option<&Carrier>,
        products: &P,
        changed: &[SaleField],
        fields: &mut SaleWeightFields,
    ) -> DomainResult<Vec<SaleField>>
    where
        P: ProductWeights + ?Sized,
    {
        let span = tracing::debug_span!("sale_weight.recompute", order_id = %order.id_typed());
        let _enter = span.enter();

        let affected = self.graph.affected_by(changed);
        for field in &affected {
            match field {
                SaleField::WeightDigits => fields.weight_digits = self.weight_digits(order),
                SaleField::WeightLines => fields.weight_lines = self.lines_weight(order, products)?,
                SaleField::CarrierContext => {
                    fields.carrier_context = carrier
                        .map(|carrier| self.carrier_context(order, carrier, products))
                        .transpose()?;
                }
                SaleField::ShipmentCost => {
                    fields.shipment_cost = match (carrier, &fields.carrier_context) {
                        (Some(carrier), Some(context)) => Some(carrier.compute_cost(context)?),
                        _ => None,
                    };
                }
                SaleField::Lines | SaleField::Carrier | SaleField::Weight | SaleField::WeightUom => {}
            }
        }

        tracing::debug!(?changed, recomputed = ?affected, "sale weight fields recomputed");
        Ok(affected)
    }

    /// Compute every derived field from scratch.
    pub fn compute_all<P>(
        &self,
        order: &SalesOrder,
        carrier: Option<&Carrier>,
        products: &P,
    ) -> DomainResult<SaleWeightFields>
    where
        P: ProductWeights + ?Sized,
    {
        let mut fields = SaleWeightFields::default();
        self.recompute(order, carrier, products, &INPUT_FIELDS, &mut fields)?;
        Ok(fields)
    }

    /// Let the host create shipments, then stamp the order's weight on them.
    pub fn create_shipments<H>(
        &self,
        host: &mut H,
        order: &SalesOrder,
        kind: ShipmentKind,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Vec<Shipment>>
    where
        H: ShipmentHost + ?Sized,
    {
        let mut shipments = host.create_shipments(order, kind)?;
        propagate_to_shipments(host, order, &mut shipments, self.default_uom.as_ref(), occurred_at)?;
        Ok(shipments)
    }

    /// Let the host create the invoice, then stamp the order's weight on it.
    pub fn create_invoice<H>(
        &self,
        host: &mut H,
        order: &SalesOrder,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Option<Invoice>>
    where
        H: InvoiceHost + ?Sized,
    {
        let Some(mut invoice) = host.create_invoice(order)? else {
            tracing::debug!(order_id = %order.id_typed(), "no invoice created, nothing to weigh");
            return Ok(None);
        };
        propagate_to_invoice(host, order, &mut invoice, self.default_uom.as_ref(), occurred_at)?;
        Ok(Some(invoice))
    }
}
