use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use saleweight_core::{Aggregate, AggregateId, AggregateRoot, DomainError, TenantId};
use saleweight_events::Event;
use saleweight_sales::SalesOrderId;
use saleweight_uom::UomId;

/// Invoice identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub AggregateId);

impl InvoiceId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Draft invoices can still be reweighed; posted and void ones cannot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Posted,
    Void,
}

/// Aggregate root: Invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    id: InvoiceId,
    tenant_id: Option<TenantId>,
    sales_order_id: Option<SalesOrderId>,
    status: InvoiceStatus,
    weight: Option<f64>,
    weight_uom: Option<UomId>,
    version: u64,
    created: bool,
}

impl Invoice {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: InvoiceId) -> Self {
        Self {
            id,
            tenant_id: None,
            sales_order_id: None,
            status: InvoiceStatus::Draft,
            weight: None,
            weight_uom: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn sales_order_id(&self) -> Option<SalesOrderId> {
        self.sales_order_id
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    pub fn weight_uom(&self) -> Option<&UomId> {
        self.weight_uom.as_ref()
    }
}

impl AggregateRoot for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: IssueInvoice (creates a draft invoice for a sales order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueInvoice {
    pub tenant_id: TenantId,
    pub invoice_id: InvoiceId,
    pub sales_order_id: SalesOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetInvoiceWeight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetInvoiceWeight {
    pub tenant_id: TenantId,
    pub invoice_id: InvoiceId,
    pub weight: Option<f64>,
    pub weight_uom: Option<UomId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: PostInvoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostInvoice {
    pub tenant_id: TenantId,
    pub invoice_id: InvoiceId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: VoidInvoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoidInvoice {
    pub tenant_id: TenantId,
    pub invoice_id: InvoiceId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InvoiceCommand {
    IssueInvoice(IssueInvoice),
    SetInvoiceWeight(SetInvoiceWeight),
    PostInvoice(PostInvoice),
    VoidInvoice(VoidInvoice),
}

/// Event: InvoiceIssued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceIssued {
    pub tenant_id: TenantId,
    pub invoice_id: InvoiceId,
    pub sales_order_id: SalesOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceWeightSet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceWeightSet {
    pub tenant_id: TenantId,
    pub invoice_id: InvoiceId,
    pub weight: Option<f64>,
    pub weight_uom: Option<UomId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoicePosted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoicePosted {
    pub tenant_id: TenantId,
    pub invoice_id: InvoiceId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceVoided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceVoided {
    pub tenant_id: TenantId,
    pub invoice_id: InvoiceId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InvoiceEvent {
    InvoiceIssued(InvoiceIssued),
    InvoiceWeightSet(InvoiceWeightSet),
    InvoicePosted(InvoicePosted),
    InvoiceVoided(InvoiceVoided),
}

impl Event for InvoiceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InvoiceEvent::InvoiceIssued(_) => "invoicing.invoice.issued",
            InvoiceEvent::InvoiceWeightSet(_) => "invoicing.invoice.weight_set",
            InvoiceEvent::InvoicePosted(_) => "invoicing.invoice.posted",
            InvoiceEvent::InvoiceVoided(_) => "invoicing.invoice.voided",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InvoiceEvent::InvoiceIssued(e) => e.occurred_at,
            InvoiceEvent::InvoiceWeightSet(e) => e.occurred_at,
            InvoiceEvent::InvoicePosted(e) => e.occurred_at,
            InvoiceEvent::InvoiceVoided(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Invoice {
    type Command = InvoiceCommand;
    type Event = InvoiceEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InvoiceEvent::InvoiceIssued(e) => {
                self.id = e.invoice_id;
                self.tenant_id = Some(e.tenant_id);
                self.sales_order_id = Some(e.sales_order_id);
                self.status = InvoiceStatus::Draft;
                self.weight = None;
                self.weight_uom = None;
                self.created = true;
            }
            InvoiceEvent::InvoiceWeightSet(e) => {
                self.weight = e.weight;
                self.weight_uom = e.weight_uom.clone();
            }
            InvoiceEvent::InvoicePosted(_) => {
                self.status = InvoiceStatus::Posted;
            }
            InvoiceEvent::InvoiceVoided(_) => {
                self.status = InvoiceStatus::Void;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InvoiceCommand::IssueInvoice(cmd) => self.handle_issue(cmd),
            InvoiceCommand::SetInvoiceWeight(cmd) => self.handle_set_weight(cmd),
            InvoiceCommand::PostInvoice(cmd) => self.handle_post(cmd),
            InvoiceCommand::VoidInvoice(cmd) => self.handle_void(cmd),
        }
    }
}

impl Invoice {
    fn ensure_existing(&self, tenant_id: TenantId, invoice_id: InvoiceId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        if self.id != invoice_id {
            return Err(DomainError::invariant("invoice_id mismatch"));
        }
        Ok(())
    }

    fn handle_issue(&self, cmd: &IssueInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("invoice already exists"));
        }

        Ok(vec![InvoiceEvent::InvoiceIssued(InvoiceIssued {
            tenant_id: cmd.tenant_id,
            invoice_id: cmd.invoice_id,
            sales_order_id: cmd.sales_order_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_weight(&self, cmd: &SetInvoiceWeight) -> Result<Vec<InvoiceEvent>, DomainError> {
        self.ensure_existing(cmd.tenant_id, cmd.invoice_id)?;

        if self.status != InvoiceStatus::Draft {
            return Err(DomainError::invariant("only draft invoices can be modified"));
        }
        if let Some(weight) = cmd.weight {
            if !weight.is_finite() || weight < 0.0 {
                return Err(DomainError::validation("weight must be a non-negative number"));
            }
        }

        Ok(vec![InvoiceEvent::InvoiceWeightSet(InvoiceWeightSet {
            tenant_id: cmd.tenant_id,
            invoice_id: cmd.invoice_id,
            weight: cmd.weight,
            weight_uom: cmd.weight_uom.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_post(&self, cmd: &PostInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        self.ensure_existing(cmd.tenant_id, cmd.invoice_id)?;

        if self.status != InvoiceStatus::Draft {
            return Err(DomainError::invariant("only draft invoices can be posted"));
        }

        Ok(vec![InvoiceEvent::InvoicePosted(InvoicePosted {
            tenant_id: cmd.tenant_id,
            invoice_id: cmd.invoice_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_void(&self, cmd: &VoidInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        self.ensure_existing(cmd.tenant_id, cmd.invoice_id)?;

        if self.status == InvoiceStatus::Void {
            return Err(DomainError::conflict("invoice is already void"));
        }

        Ok(vec![InvoiceEvent::InvoiceVoided(InvoiceVoided {
            tenant_id: cmd.tenant_id,
            invoice_id: cmd.invoice_id,
            reason: cmd.reason.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}
