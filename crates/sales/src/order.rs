use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use saleweight_core::{Aggregate, AggregateId, AggregateRoot, DomainError, DomainResult, TenantId};
use saleweight_events::Event;
use saleweight_products::{ProductId, ProductWeights};
use saleweight_uom::{UomConverter, UomId};

use crate::weight::{compute_lines_weight, resolve_weight_uom};

/// Sales order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SalesOrderId(pub AggregateId);

impl SalesOrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for SalesOrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Orders are edited in `Draft`; weight fields freeze once confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalesOrderStatus {
    Draft,
    Confirmed,
    Invoiced,
}

/// Order line: optional product and quantity.
///
/// Lines without a product (comments, section titles) are allowed and weigh
/// nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub line_no: u32,
    pub product_id: Option<ProductId>,
    pub quantity: f64,
}

/// Aggregate root: a sales order with its lines and declared shipping weight.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesOrder {
    id: SalesOrderId,
    tenant_id: Option<TenantId>,
    status: SalesOrderStatus,
    lines: Vec<OrderLine>,
    weight: Option<f64>,
    weight_uom: Option<UomId>,
    next_line_no: u32,
    version: u64,
    created: bool,
}

impl SalesOrder {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: SalesOrderId) -> Self {
        Self {
            id,
            tenant_id: None,
            status: SalesOrderStatus::Draft,
            lines: Vec::new(),
            weight: None,
            weight_uom: None,
            next_line_no: 1,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> SalesOrderId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn status(&self) -> SalesOrderStatus {
        self.status
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Declared shipping weight (user override), expressed in `weight_uom`.
    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    pub fn weight_uom(&self) -> Option<&UomId> {
        self.weight_uom.as_ref()
    }

    /// Declared weight when it is usable downstream; zero counts as unset.
    pub fn declared_weight(&self) -> Option<f64> {
        self.weight.filter(|weight| *weight > 0.0)
    }

    pub fn is_modifiable(&self) -> bool {
        matches!(self.status, SalesOrderStatus::Draft)
    }

    pub fn is_invoice_allowed(&self) -> bool {
        matches!(self.status, SalesOrderStatus::Confirmed)
    }

    /// Total weight of the lines in the order's weight unit, falling back to
    /// `default_uom` (and then kilograms) when no unit is chosen.
    pub fn lines_weight<P, C>(
        &self,
        products: &P,
        converter: &C,
        default_uom: Option<&UomId>,
        round: bool,
    ) -> DomainResult<f64>
    where
        P: ProductWeights + ?Sized,
        C: UomConverter + ?Sized,
    {
        let target = resolve_weight_uom(self.weight_uom.as_ref(), default_uom);
        compute_lines_weight(&self.lines, products, converter, &target, round)
    }
}

impl AggregateRoot for SalesOrder {
    type Id = SalesOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateSalesOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSalesOrder {
    pub tenant_id: TenantId,
    pub order_id: SalesOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddLine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddLine {
    pub tenant_id: TenantId,
    pub order_id: SalesOrderId,
    pub product_id: Option<ProductId>,
    pub quantity: f64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateLineQuantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateLineQuantity {
    pub tenant_id: TenantId,
    pub order_id: SalesOrderId,
    pub line_no: u32,
    pub quantity: f64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveLine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveLine {
    pub tenant_id: TenantId,
    pub order_id: SalesOrderId,
    pub line_no: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetWeight (`None` clears the declared weight).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetWeight {
    pub tenant_id: TenantId,
    pub order_id: SalesOrderId,
    pub weight: Option<f64>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetWeightUom (`None` falls back to the configured default unit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetWeightUom {
    pub tenant_id: TenantId,
    pub order_id: SalesOrderId,
    pub weight_uom: Option<UomId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ConfirmOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmOrder {
    pub tenant_id: TenantId,
    pub order_id: SalesOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkInvoiced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkInvoiced {
    pub tenant_id: TenantId,
    pub order_id: SalesOrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SalesOrderCommand {
    CreateSalesOrder(CreateSalesOrder),
    AddLine(AddLine),
    UpdateLineQuantity(UpdateLineQuantity),
    RemoveLine(RemoveLine),
    SetWeight(SetWeight),
    SetWeightUom(SetWeightUom),
    ConfirmOrder(ConfirmOrder),
    MarkInvoiced(MarkInvoiced),
}

/// Event: SalesOrderCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesOrderCreated {
    pub tenant_id: TenantId,
    pub order_id: SalesOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineAdded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineAdded {
    pub tenant_id: TenantId,
    pub order_id: SalesOrderId,
    pub line_no: u32,
    pub product_id: Option<ProductId>,
    pub quantity: f64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineQuantityChanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineQuantityChanged {
    pub tenant_id: TenantId,
    pub order_id: SalesOrderId,
    pub line_no: u32,
    pub quantity: f64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRemoved {
    pub tenant_id: TenantId,
    pub order_id: SalesOrderId,
    pub line_no: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: WeightSet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightSet {
    pub tenant_id: TenantId,
    pub order_id: SalesOrderId,
    pub weight: Option<f64>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: WeightUomSet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightUomSet {
    pub tenant_id: TenantId,
    pub order_id: SalesOrderId,
    pub weight_uom: Option<UomId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderConfirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmed {
    pub tenant_id: TenantId,
    pub order_id: SalesOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderInvoiced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInvoiced {
    pub tenant_id: TenantId,
    pub order_id: SalesOrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SalesOrderEvent {
    SalesOrderCreated(SalesOrderCreated),
    LineAdded(LineAdded),
    LineQuantityChanged(LineQuantityChanged),
    LineRemoved(LineRemoved),
    WeightSet(WeightSet),
    WeightUomSet(WeightUomSet),
    OrderConfirmed(OrderConfirmed),
    OrderInvoiced(OrderInvoiced),
}

impl Event for SalesOrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SalesOrderEvent::SalesOrderCreated(_) => "sales.order.created",
            SalesOrderEvent::LineAdded(_) => "sales.order.line_added",
            SalesOrderEvent::LineQuantityChanged(_) => "sales.order.line_quantity_changed",
            SalesOrderEvent::LineRemoved(_) => "sales.order.line_removed",
            SalesOrderEvent::WeightSet(_) => "sales.order.weight_set",
            SalesOrderEvent::WeightUomSet(_) => "sales.order.weight_uom_set",
            SalesOrderEvent::OrderConfirmed(_) => "sales.order.confirmed",
            SalesOrderEvent::OrderInvoiced(_) => "sales.order.invoiced",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SalesOrderEvent::SalesOrderCreated(e) => e.occurred_at,
            SalesOrderEvent::LineAdded(e) => e.occurred_at,
            SalesOrderEvent::LineQuantityChanged(e) => e.occurred_at,
            SalesOrderEvent::LineRemoved(e) => e.occurred_at,
            SalesOrderEvent::WeightSet(e) => e.occurred_at,
            SalesOrderEvent::WeightUomSet(e) => e.occurred_at,
            SalesOrderEvent::OrderConfirmed(e) => e.occurred_at,
            SalesOrderEvent::OrderInvoiced(e) => e.occurred_at,
        }
    }
}

impl Aggregate for SalesOrder {
    type Command = SalesOrderCommand;
    type Event = SalesOrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            SalesOrderEvent::SalesOrderCreated(e) => {
                self.id = e.order_id;
                self.tenant_id = Some(e.tenant_id);
                self.status = SalesOrderStatus::Draft;
                self.lines.clear();
                self.weight = None;
                self.weight_uom = None;
                self.next_line_no = 1;
                self.created = true;
            }
            SalesOrderEvent::LineAdded(e) => {
                self.lines.push(OrderLine {
                    line_no: e.line_no,
                    product_id: e.product_id,
                    quantity: e.quantity,
                });
                self.next_line_no = self.next_line_no.max(e.line_no + 1);
            }
            SalesOrderEvent::LineQuantityChanged(e) => {
                if let Some(line) = self.lines.iter_mut().find(|l| l.line_no == e.line_no) {
                    line.quantity = e.quantity;
                }
            }
            SalesOrderEvent::LineRemoved(e) => {
                self.lines.retain(|l| l.line_no != e.line_no);
            }
            SalesOrderEvent::WeightSet(e) => {
                self.weight = e.weight;
            }
            SalesOrderEvent::WeightUomSet(e) => {
                self.weight_uom = e.weight_uom.clone();
            }
            SalesOrderEvent::OrderConfirmed(_) => {
                self.status = SalesOrderStatus::Confirmed;
            }
            SalesOrderEvent::OrderInvoiced(_) => {
                self.status = SalesOrderStatus::Invoiced;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            SalesOrderCommand::CreateSalesOrder(cmd) => self.handle_create(cmd),
            SalesOrderCommand::AddLine(cmd) => self.handle_add_line(cmd),
            SalesOrderCommand::UpdateLineQuantity(cmd) => self.handle_update_quantity(cmd),
            SalesOrderCommand::RemoveLine(cmd) => self.handle_remove_line(cmd),
            SalesOrderCommand::SetWeight(cmd) => self.handle_set_weight(cmd),
            SalesOrderCommand::SetWeightUom(cmd) => self.handle_set_weight_uom(cmd),
            SalesOrderCommand::ConfirmOrder(cmd) => self.handle_confirm(cmd),
            SalesOrderCommand::MarkInvoiced(cmd) => self.handle_mark_invoiced(cmd),
        }
    }
}

fn validate_quantity(quantity: f64) -> Result<(), DomainError> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(DomainError::validation("quantity must be a non-negative number"));
    }
    Ok(())
}

impl SalesOrder {
    fn ensure_tenant(&self, tenant_id: TenantId) -> Result<(), DomainError> {
        if !self.created {
            return Ok(());
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        Ok(())
    }

    fn ensure_order_id(&self, order_id: SalesOrderId) -> Result<(), DomainError> {
        if self.id != order_id {
            return Err(DomainError::invariant("order_id mismatch"));
        }
        Ok(())
    }

    fn ensure_draft(&self, tenant_id: TenantId, order_id: SalesOrderId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_tenant(tenant_id)?;
        self.ensure_order_id(order_id)?;

        if !self.is_modifiable() {
            return Err(DomainError::invariant(
                "cannot modify order once it is confirmed or invoiced",
            ));
        }
        Ok(())
    }

    fn ensure_line(&self, line_no: u32) -> Result<(), DomainError> {
        if self.lines.iter().any(|l| l.line_no == line_no) {
            Ok(())
        } else {
            Err(DomainError::validation(format!("unknown line {line_no}")))
        }
    }

    fn handle_create(&self, cmd: &CreateSalesOrder) -> Result<Vec<SalesOrderEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("sales order already exists"));
        }

        Ok(vec![SalesOrderEvent::SalesOrderCreated(SalesOrderCreated {
            tenant_id: cmd.tenant_id,
            order_id: cmd.order_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_line(&self, cmd: &AddLine) -> Result<Vec<SalesOrderEvent>, DomainError> {
        self.ensure_draft(cmd.tenant_id, cmd.order_id)?;
        validate_quantity(cmd.quantity)?;

        // Line numbers are never reused, even after a removal.
        let line_no = self.next_line_no;

        Ok(vec![SalesOrderEvent::LineAdded(LineAdded {
            tenant_id: cmd.tenant_id,
            order_id: cmd.order_id,
            line_no,
            product_id: cmd.product_id,
            quantity: cmd.quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_quantity(
        &self,
        cmd: &UpdateLineQuantity,
    ) -> Result<Vec<SalesOrderEvent>, DomainError> {
        self.ensure_draft(cmd.tenant_id, cmd.order_id)?;
        self.ensure_line(cmd.line_no)?;
        validate_quantity(cmd.quantity)?;

        Ok(vec![SalesOrderEvent::LineQuantityChanged(LineQuantityChanged {
            tenant_id: cmd.tenant_id,
            order_id: cmd.order_id,
            line_no: cmd.line_no,
            quantity: cmd.quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_line(&self, cmd: &RemoveLine) -> Result<Vec<SalesOrderEvent>, DomainError> {
        self.ensure_draft(cmd.tenant_id, cmd.order_id)?;
        self.ensure_line(cmd.line_no)?;

        Ok(vec![SalesOrderEvent::LineRemoved(LineRemoved {
            tenant_id: cmd.tenant_id,
            order_id: cmd.order_id,
            line_no: cmd.line_no,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_weight(&self, cmd: &SetWeight) -> Result<Vec<SalesOrderEvent>, DomainError> {
        self.ensure_draft(cmd.tenant_id, cmd.order_id)?;

        if let Some(weight) = cmd.weight {
            if !weight.is_finite() || weight < 0.0 {
                return Err(DomainError::validation("weight must be a non-negative number"));
            }
        }

        Ok(vec![SalesOrderEvent::WeightSet(WeightSet {
            tenant_id: cmd.tenant_id,
            order_id: cmd.order_id,
            weight: cmd.weight,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_weight_uom(
        &self,
        cmd: &SetWeightUom,
    ) -> Result<Vec<SalesOrderEvent>, DomainError> {
        self.ensure_draft(cmd.tenant_id, cmd.order_id)?;

        Ok(vec![SalesOrderEvent::WeightUomSet(WeightUomSet {
            tenant_id: cmd.tenant_id,
            order_id: cmd.order_id,
            weight_uom: cmd.weight_uom.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_confirm(&self, cmd: &ConfirmOrder) -> Result<Vec<SalesOrderEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_tenant(cmd.tenant_id)?;
        self.ensure_order_id(cmd.order_id)?;

        if self.status != SalesOrderStatus::Draft {
            return Err(DomainError::invariant("only draft orders can be confirmed"));
        }

        if self.lines.is_empty() {
            return Err(DomainError::validation("cannot confirm order without lines"));
        }

        Ok(vec![SalesOrderEvent::OrderConfirmed(OrderConfirmed {
            tenant_id: cmd.tenant_id,
            order_id: cmd.order_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_mark_invoiced(&self, cmd: &MarkInvoiced) -> Result<Vec<SalesOrderEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_tenant(cmd.tenant_id)?;
        self.ensure_order_id(cmd.order_id)?;

        if !self.is_invoice_allowed() {
            return Err(DomainError::invariant(
                "cannot invoice order that is not confirmed",
            ));
        }

        Ok(vec![SalesOrderEvent::OrderInvoiced(OrderInvoiced {
            tenant_id: cmd.tenant_id,
            order_id: cmd.order_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saleweight_events::execute;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn test_product_id() -> ProductId {
        ProductId::new(AggregateId::new())
    }

    struct Fixture {
        order: SalesOrder,
        tenant_id: TenantId,
        order_id: SalesOrderId,
    }

    impl Fixture {
        fn created() -> Self {
            let tenant_id = TenantId::new();
            let order_id = SalesOrderId::new(AggregateId::new());
            let mut order = SalesOrder::empty(order_id);
            execute(
                &mut order,
                &SalesOrderCommand::CreateSalesOrder(CreateSalesOrder {
                    tenant_id,
                    order_id,
                    occurred_at: test_time(),
                }),
            )
            .unwrap();
            Self {
                order,
                tenant_id,
                order_id,
            }
        }

        fn add_line(&mut self, quantity: f64) -> Result<Vec<SalesOrderEvent>, DomainError> {
            let cmd = SalesOrderCommand::AddLine(AddLine {
                tenant_id: self.tenant_id,
                order_id: self.order_id,
                product_id: Some(test_product_id()),
                quantity,
                occurred_at: test_time(),
            });
            execute(&mut self.order, &cmd)
        }

        fn set_weight(&mut self, weight: Option<f64>) -> Result<Vec<SalesOrderEvent>, DomainError> {
            let cmd = SalesOrderCommand::SetWeight(SetWeight {
                tenant_id: self.tenant_id,
                order_id: self.order_id,
                weight,
                occurred_at: test_time(),
            });
            execute(&mut self.order, &cmd)
        }

        fn confirm(&mut self) -> Result<Vec<SalesOrderEvent>, DomainError> {
            let cmd = SalesOrderCommand::ConfirmOrder(ConfirmOrder {
                tenant_id: self.tenant_id,
                order_id: self.order_id,
                occurred_at: test_time(),
            });
            execute(&mut self.order, &cmd)
        }
    }

    #[test]
    fn create_sales_order_starts_without_weight() {
        let fx = Fixture::created();
        assert_eq!(fx.order.status(), SalesOrderStatus::Draft);
        assert_eq!(fx.order.weight(), None);
        assert_eq!(fx.order.weight_uom(), None);
        assert_eq!(fx.order.version(), 1);
    }

    #[test]
    fn add_line_accepts_zero_quantity_and_rejects_negative() {
        let mut fx = Fixture::created();
        fx.add_line(0.0).unwrap();
        assert_eq!(fx.order.lines()[0].quantity, 0.0);

        let err = fx.add_line(-1.0).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn line_numbers_are_not_reused_after_removal() {
        let mut fx = Fixture::created();
        fx.add_line(1.0).unwrap();
        fx.add_line(2.0).unwrap();

        execute(
            &mut fx.order,
            &SalesOrderCommand::RemoveLine(RemoveLine {
                tenant_id: fx.tenant_id,
                order_id: fx.order_id,
                line_no: 2,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        fx.add_line(3.0).unwrap();

        let numbers: Vec<u32> = fx.order.lines().iter().map(|l| l.line_no).collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[test]
    fn removing_the_only_line_keeps_numbering_going() {
        let mut fx = Fixture::created();
        fx.add_line(1.0).unwrap();
        execute(
            &mut fx.order,
            &SalesOrderCommand::RemoveLine(RemoveLine {
                tenant_id: fx.tenant_id,
                order_id: fx.order_id,
                line_no: 1,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert!(fx.order.lines().is_empty());

        let events = fx.add_line(5.0).unwrap();
        match &events[0] {
            SalesOrderEvent::LineAdded(e) => assert_eq!(e.line_no, 2),
            other => panic!("Expected LineAdded, got {other:?}"),
        }
    }

    #[test]
    fn zero_weight_is_not_a_declared_weight() {
        let mut fx = Fixture::created();
        fx.set_weight(Some(0.0)).unwrap();
        assert_eq!(fx.order.weight(), Some(0.0));
        assert_eq!(fx.order.declared_weight(), None);

        fx.set_weight(Some(2.0)).unwrap();
        assert_eq!(fx.order.declared_weight(), Some(2.0));
    }

    #[test]
    fn update_quantity_changes_the_addressed_line() {
        let mut fx = Fixture::created();
        fx.add_line(1.0).unwrap();

        execute(
            &mut fx.order,
            &SalesOrderCommand::UpdateLineQuantity(UpdateLineQuantity {
                tenant_id: fx.tenant_id,
                order_id: fx.order_id,
                line_no: 1,
                quantity: 4.0,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(fx.order.lines()[0].quantity, 4.0);

        let err = fx
            .order
            .handle(&SalesOrderCommand::UpdateLineQuantity(UpdateLineQuantity {
                tenant_id: fx.tenant_id,
                order_id: fx.order_id,
                line_no: 9,
                quantity: 1.0,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert_eq!(err, DomainError::validation("unknown line 9"));
    }

    #[test]
    fn set_weight_and_unit_in_draft() {
        let mut fx = Fixture::created();
        fx.set_weight(Some(10.0)).unwrap();
        execute(
            &mut fx.order,
            &SalesOrderCommand::SetWeightUom(SetWeightUom {
                tenant_id: fx.tenant_id,
                order_id: fx.order_id,
                weight_uom: Some(UomId::new("lb")),
                occurred_at: test_time(),
            }),
        )
        .unwrap();

        assert_eq!(fx.order.weight(), Some(10.0));
        assert_eq!(fx.order.weight_uom(), Some(&UomId::new("lb")));

        fx.set_weight(None).unwrap();
        assert_eq!(fx.order.weight(), None);
    }

    #[test]
    fn set_weight_rejects_negative_and_nan() {
        let mut fx = Fixture::created();
        assert!(matches!(fx.set_weight(Some(-0.5)), Err(DomainError::Validation(_))));
        assert!(matches!(fx.set_weight(Some(f64::NAN)), Err(DomainError::Validation(_))));
        assert_eq!(fx.order.weight(), None);
    }

    #[test]
    fn weight_is_read_only_once_confirmed() {
        let mut fx = Fixture::created();
        fx.add_line(1.0).unwrap();
        fx.confirm().unwrap();

        let err = fx.set_weight(Some(3.0)).unwrap_err();
        match err {
            DomainError::InvariantViolation(msg)
                if msg.contains("cannot modify order once it is confirmed or invoiced") => {}
            other => panic!("Expected InvariantViolation, got {other:?}"),
        }
    }

    #[test]
    fn cannot_confirm_order_without_lines() {
        let mut fx = Fixture::created();
        let err = fx.confirm().unwrap_err();
        assert_eq!(err, DomainError::validation("cannot confirm order without lines"));
    }

    #[test]
    fn full_lifecycle_draft_to_confirmed_to_invoiced() {
        let mut fx = Fixture::created();
        fx.add_line(2.0).unwrap();
        fx.confirm().unwrap();
        execute(
            &mut fx.order,
            &SalesOrderCommand::MarkInvoiced(MarkInvoiced {
                tenant_id: fx.tenant_id,
                order_id: fx.order_id,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(fx.order.status(), SalesOrderStatus::Invoiced);
        assert_eq!(fx.order.version(), 4);
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let fx = Fixture::created();
        let before = fx.order.clone();
        let cmd = SalesOrderCommand::SetWeight(SetWeight {
            tenant_id: fx.tenant_id,
            order_id: fx.order_id,
            weight: Some(1.0),
            occurred_at: test_time(),
        });

        let events1 = fx.order.handle(&cmd).unwrap();
        let events2 = fx.order.handle(&cmd).unwrap();
        assert_eq!(fx.order, before);
        assert_eq!(events1, events2);
    }

    #[test]
    fn event_types_are_stable() {
        let fx = Fixture::created();
        let event = SalesOrderEvent::WeightSet(WeightSet {
            tenant_id: fx.tenant_id,
            order_id: fx.order_id,
            weight: Some(1.0),
            occurred_at: test_time(),
        });
        assert_eq!(event.event_type(), "sales.order.weight_set");
        assert_eq!(Event::version(&event), 1);
    }
}
