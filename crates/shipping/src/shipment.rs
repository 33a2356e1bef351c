use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use saleweight_core::{Aggregate, AggregateId, AggregateRoot, DomainError, TenantId};
use saleweight_events::Event;
use saleweight_sales::SalesOrderId;
use saleweight_uom::UomId;

/// Shipment identifier (tenant-scoped via `tenant_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipmentId(pub AggregateId);

impl ShipmentId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ShipmentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Direction of the goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipmentKind {
    Out,
    Return,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipmentStatus {
    Draft,
    Shipped,
}

/// Aggregate root: Shipment produced from a sales order.
#[derive(Debug, Clone, PartialEq)]
pub struct Shipment {
    id: ShipmentId,
    tenant_id: Option<TenantId>,
    sales_order_id: Option<SalesOrderId>,
    kind: ShipmentKind,
    status: ShipmentStatus,
    weight: Option<f64>,
    weight_uom: Option<UomId>,
    version: u64,
    created: bool,
}

impl Shipment {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: ShipmentId) -> Self {
        Self {
            id,
            tenant_id: None,
            sales_order_id: None,
            kind: ShipmentKind::Out,
            status: ShipmentStatus::Draft,
            weight: None,
            weight_uom: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> ShipmentId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn sales_order_id(&self) -> Option<SalesOrderId> {
        self.sales_order_id
    }

    pub fn kind(&self) -> ShipmentKind {
        self.kind
    }

    pub fn status(&self) -> ShipmentStatus {
        self.status
    }

    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    pub fn weight_uom(&self) -> Option<&UomId> {
        self.weight_uom.as_ref()
    }
}

impl AggregateRoot for Shipment {
    type Id = ShipmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateShipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateShipment {
    pub tenant_id: TenantId,
    pub shipment_id: ShipmentId,
    pub sales_order_id: SalesOrderId,
    pub kind: ShipmentKind,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetShipmentWeight (replaces both weight and unit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetShipmentWeight {
    pub tenant_id: TenantId,
    pub shipment_id: ShipmentId,
    pub weight: Option<f64>,
    pub weight_uom: Option<UomId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkShipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkShipped {
    pub tenant_id: TenantId,
    pub shipment_id: ShipmentId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShipmentCommand {
    CreateShipment(CreateShipment),
    SetShipmentWeight(SetShipmentWeight),
    MarkShipped(MarkShipped),
}

/// Event: ShipmentCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentCreated {
    pub tenant_id: TenantId,
    pub shipment_id: ShipmentId,
    pub sales_order_id: SalesOrderId,
    pub kind: ShipmentKind,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ShipmentWeightSet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentWeightSet {
    pub tenant_id: TenantId,
    pub shipment_id: ShipmentId,
    pub weight: Option<f64>,
    pub weight_uom: Option<UomId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ShipmentShipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentShipped {
    pub tenant_id: TenantId,
    pub shipment_id: ShipmentId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShipmentEvent {
    ShipmentCreated(ShipmentCreated),
    ShipmentWeightSet(ShipmentWeightSet),
    ShipmentShipped(ShipmentShipped),
}

impl Event for ShipmentEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ShipmentEvent::ShipmentCreated(_) => "shipping.shipment.created",
            ShipmentEvent::ShipmentWeightSet(_) => "shipping.shipment.weight_set",
            ShipmentEvent::ShipmentShipped(_) => "shipping.shipment.shipped",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ShipmentEvent::ShipmentCreated(e) => e.occurred_at,
            ShipmentEvent::ShipmentWeightSet(e) => e.occurred_at,
            ShipmentEvent::ShipmentShipped(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Shipment {
    type Command = ShipmentCommand;
    type Event = ShipmentEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ShipmentEvent::ShipmentCreated(e) => {
                self.id = e.shipment_id;
                self.tenant_id = Some(e.tenant_id);
                self.sales_order_id = Some(e.sales_order_id);
                self.kind = e.kind;
                self.status = ShipmentStatus::Draft;
                self.weight = None;
                self.weight_uom = None;
                self.created = true;
            }
            ShipmentEvent::ShipmentWeightSet(e) => {
                self.weight = e.weight;
                self.weight_uom = e.weight_uom.clone();
            }
            ShipmentEvent::ShipmentShipped(_) => {
                self.status = ShipmentStatus::Shipped;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ShipmentCommand::CreateShipment(cmd) => self.handle_create(cmd),
            ShipmentCommand::SetShipmentWeight(cmd) => self.handle_set_weight(cmd),
            ShipmentCommand::MarkShipped(cmd) => self.handle_mark_shipped(cmd),
        }
    }
}

impl Shipment {
    fn ensure_existing(
        &self,
        tenant_id: TenantId,
        shipment_id: ShipmentId,
    ) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        if self.id != shipment_id {
            return Err(DomainError::invariant("shipment_id mismatch"));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateShipment) -> Result<Vec<ShipmentEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("shipment already exists"));
        }

        Ok(vec![ShipmentEvent::ShipmentCreated(ShipmentCreated {
            tenant_id: cmd.tenant_id,
            shipment_id: cmd.shipment_id,
            sales_order_id: cmd.sales_order_id,
            kind: cmd.kind,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_weight(&self, cmd: &SetShipmentWeight) -> Result<Vec<ShipmentEvent>, DomainError> {
        self.ensure_existing(cmd.tenant_id, cmd.shipment_id)?;

        if self.status != ShipmentStatus::Draft {
            return Err(DomainError::invariant("cannot reweigh a shipped shipment"));
        }
        if let Some(weight) = cmd.weight {
            if !weight.is_finite() || weight < 0.0 {
                return Err(DomainError::validation("weight must be a non-negative number"));
            }
        }

        Ok(vec![ShipmentEvent::ShipmentWeightSet(ShipmentWeightSet {
            tenant_id: cmd.tenant_id,
            shipment_id: cmd.shipment_id,
            weight: cmd.weight,
            weight_uom: cmd.weight_uom.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_mark_shipped(&self, cmd: &MarkShipped) -> Result<Vec<ShipmentEvent>, DomainError> {
        self.ensure_existing(cmd.tenant_id, cmd.shipment_id)?;

        if self.status == ShipmentStatus::Shipped {
            return Err(DomainError::conflict("shipment already shipped"));
        }

        Ok(vec![ShipmentEvent::ShipmentShipped(ShipmentShipped {
            tenant_id: cmd.tenant_id,
            shipment_id: cmd.shipment_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
