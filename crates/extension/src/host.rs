//! In-memory host: creates and stores shipments and invoices for sales
//! orders. Used by tests and as a reference for real host adapters.

use std::collections::BTreeMap;

use chrono::Utc;

use saleweight_core::{AggregateId, DomainError, DomainResult};
use saleweight_events::execute;
use saleweight_invoicing::{Invoice, InvoiceCommand, InvoiceId, IssueInvoice};
use saleweight_sales::{SalesOrder, SalesOrderId};
use saleweight_shipping::{
    CreateShipment, SetShipmentWeight, Shipment, ShipmentCommand, ShipmentId, ShipmentKind,
};
use saleweight_uom::UomId;

use crate::hooks::{InvoiceHost, ShipmentHost};

#[derive(Debug, Clone)]
pub struct InMemoryHost {
    shipments: BTreeMap<ShipmentId, Shipment>,
    invoices: BTreeMap<InvoiceId, Invoice>,
    shipments_per_order: usize,
    default_shipment_weight: Option<(f64, UomId)>,
    invoicing: bool,
    saves: usize,
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self {
            shipments: BTreeMap::new(),
            invoices: BTreeMap::new(),
            shipments_per_order: 1,
            default_shipment_weight: None,
            invoicing: true,
            saves: 0,
        }
    }
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split every order into `count` shipments (zero creates none).
    pub fn with_shipments_per_order(mut self, count: usize) -> Self {
        self.shipments_per_order = count;
        self
    }

    /// Weight the host stamps on new shipments itself, e.g. from packaging.
    pub fn with_default_shipment_weight(mut self, weight: f64, uom: impl Into<UomId>) -> Self {
        self.default_shipment_weight = Some((weight, uom.into()));
        self
    }

    /// Never produce invoices.
    pub fn without_invoicing(mut self) -> Self {
        self.invoicing = false;
        self
    }

    pub fn shipment(&self, id: &ShipmentId) -> Option<&Shipment> {
        self.shipments.get(id)
    }

    pub fn shipments_for(&self, order_id: SalesOrderId) -> Vec<&Shipment> {
        self.shipments
            .values()
            .filter(|s| s.sales_order_id() == Some(order_id))
            .collect()
    }

    pub fn invoice(&self, id: &InvoiceId) -> Option<&Invoice> {
        self.invoices.get(id)
    }

    pub fn invoices_for(&self, order_id: SalesOrderId) -> Vec<&Invoice> {
        self.invoices
            .values()
            .filter(|i| i.sales_order_id() == Some(order_id))
            .collect()
    }

    /// Number of saves made after creation.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl ShipmentHost for InMemoryHost {
    fn create_shipments(
        &mut self,
        order: &SalesOrder,
        kind: ShipmentKind,
    ) -> DomainResult<Vec<Shipment>> {
        let tenant_id = order.tenant_id().ok_or_else(DomainError::not_found)?;
        let occurred_at = Utc::now();

        let mut created = Vec::with_capacity(self.shipments_per_order);
        for _ in 0..self.shipments_per_order {
            let shipment_id = ShipmentId::new(AggregateId::new());
            let mut shipment = Shipment::empty(shipment_id);
            execute(
                &mut shipment,
                &ShipmentCommand::CreateShipment(CreateShipment {
                    tenant_id,
                    shipment_id,
                    sales_order_id: order.id_typed(),
                    kind,
                    occurred_at,
                }),
            )?;
            if let Some((weight, uom)) = &self.default_shipment_weight {
                execute(
                    &mut shipment,
                    &ShipmentCommand::SetShipmentWeight(SetShipmentWeight {
                        tenant_id,
                        shipment_id,
                        weight: Some(*weight),
                        weight_uom: Some(uom.clone()),
                        occurred_at,
                    }),
                )?;
            }
            self.shipments.insert(shipment_id, shipment.clone());
            created.push(shipment);
        }
        Ok(created)
    }

    fn save_shipment(&mut self, shipment: &Shipment) -> DomainResult<()> {
        let stored = self
            .shipments
            .get_mut(&shipment.id_typed())
            .ok_or_else(DomainError::not_found)?;
        *stored = shipment.clone();
        self.saves += 1;
        Ok(())
    }
}

impl InvoiceHost for InMemoryHost {
    fn create_invoice(&mut self, order: &SalesOrder) -> DomainResult<Option<Invoice>> {
        if !self.invoicing || order.lines().is_empty() {
            return Ok(None);
        }
        if !order.is_invoice_allowed() {
            return Err(DomainError::invariant("order must be confirmed before invoicing"));
        }
        let tenant_id = order.tenant_id().ok_or_else(DomainError::not_found)?;

        let invoice_id = InvoiceId::new(AggregateId::new());
        let mut invoice = Invoice::empty(invoice_id);
        execute(
            &mut invoice,
            &InvoiceCommand::IssueInvoice(IssueInvoice {
                tenant_id,
                invoice_id,
                sales_order_id: order.id_typed(),
                occurred_at: Utc::now(),
            }),
        )?;
        self.invoices.insert(invoice_id, invoice.clone());
        Ok(Some(invoice))
    }

    fn save_invoice(&mut self, invoice: &Invoice) -> DomainResult<()> {
        let stored = self
            .invoices
            .get_mut(&invoice.id_typed())
            .ok_or_else(DomainError::not_found)?;
        *stored = invoice.clone();
        self.saves += 1;
        Ok(())
    }
}
