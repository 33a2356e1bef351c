//! Downstream weight propagation around host record creation.

use chrono::{DateTime, Utc};

use saleweight_core::{DomainError, DomainResult, TenantId};
use saleweight_events::execute;
use saleweight_invoicing::{Invoice, InvoiceCommand, SetInvoiceWeight};
use saleweight_sales::{SalesOrder, resolve_weight_uom};
use saleweight_shipping::{SetShipmentWeight, Shipment, ShipmentCommand, ShipmentKind};
use saleweight_uom::UomId;

/// Host extension point: produce shipments from an order.
pub trait ShipmentHost {
    /// Create the shipments of `kind` for `order`; may create none.
    fn create_shipments(
        &mut self,
        order: &SalesOrder,
        kind: ShipmentKind,
    ) -> DomainResult<Vec<Shipment>>;

    /// Persist a shipment modified after creation.
    fn save_shipment(&mut self, shipment: &Shipment) -> DomainResult<()>;
}

/// Host extension point: produce an invoice from an order.
pub trait InvoiceHost {
    /// Create the invoice for `order`, if there is anything to invoice.
    fn create_invoice(&mut self, order: &SalesOrder) -> DomainResult<Option<Invoice>>;

    /// Persist an invoice modified after creation.
    fn save_invoice(&mut self, invoice: &Invoice) -> DomainResult<()>;
}

/// Weight and unit to copy downstream, if the order declares a positive weight.
fn declared_weight(order: &SalesOrder, default_uom: Option<&UomId>) -> Option<(f64, UomId)> {
    let weight = order.declared_weight()?;
    Some((weight, resolve_weight_uom(order.weight_uom(), default_uom)))
}

fn tenant_of(order: &SalesOrder) -> DomainResult<TenantId> {
    order.tenant_id().ok_or_else(DomainError::not_found)
}

/// Copy the order's declared weight onto every freshly created shipment.
///
/// Shipments keep their own weight when the order declares none.
pub fn propagate_to_shipments<H>(
    host: &mut H,
    order: &SalesOrder,
    shipments: &mut [Shipment],
    default_uom: Option<&UomId>,
    occurred_at: DateTime<Utc>,
) -> DomainResult<()>
where
    H: ShipmentHost + ?Sized,
{
    if shipments.is_empty() {
        tracing::debug!(order_id = %order.id_typed(), "no shipments created, nothing to weigh");
        return Ok(());
    }
    let Some((weight, uom)) = declared_weight(order, default_uom) else {
        tracing::debug!(order_id = %order.id_typed(), "order has no declared weight");
        return Ok(());
    };

    // Stamp every shipment before saving any, so a rejected one saves nothing.
    let tenant_id = tenant_of(order)?;
    let mut stamped = Vec::with_capacity(shipments.len());
    for shipment in shipments.iter() {
        let mut shipment = shipment.clone();
        let cmd = ShipmentCommand::SetShipmentWeight(SetShipmentWeight {
            tenant_id,
            shipment_id: shipment.id_typed(),
            weight: Some(weight),
            weight_uom: Some(uom.clone()),
            occurred_at,
        });
        execute(&mut shipment, &cmd)?;
        stamped.push(shipment);
    }
    for (slot, shipment) in shipments.iter_mut().zip(stamped) {
        host.save_shipment(&shipment)?;
        *slot = shipment;
    }

    tracing::info!(
        order_id = %order.id_typed(),
        shipments = shipments.len(),
        weight,
        uom = %uom,
        "copied order weight to shipments"
    );
    Ok(())
}

/// Copy the order's declared weight onto a freshly created invoice.
pub fn propagate_to_invoice<H>(
    host: &mut H,
    order: &SalesOrder,
    invoice: &mut Invoice,
    default_uom: Option<&UomId>,
    occurred_at: DateTime<Utc>,
) -> DomainResult<()>
where
    H: InvoiceHost + ?Sized,
{
    let Some((weight, uom)) = declared_weight(order, default_uom) else {
        tracing::debug!(order_id = %order.id_typed(), "order has no declared weight");
        return Ok(());
    };

    let cmd = InvoiceCommand::SetInvoiceWeight(SetInvoiceWeight {
        tenant_id: tenant_of(order)?,
        invoice_id: invoice.id_typed(),
        weight: Some(weight),
        weight_uom: Some(uom.clone()),
        occurred_at,
    });
    execute(invoice, &cmd)?;
    host.save_invoice(invoice)?;

    tracing::info!(
        order_id = %order.id_typed(),
        invoice_id = %invoice.id_typed(),
        weight,
        uom = %uom,
        "copied order weight to invoice"
    );
    Ok(())
}
