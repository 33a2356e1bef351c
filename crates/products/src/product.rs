use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use saleweight_core::{Aggregate, AggregateId, AggregateRoot, DomainError, TenantId, ValueObject};
use saleweight_events::Event;
use saleweight_uom::UomId;

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Weight of one unit of the product, expressed in `uom`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductWeight {
    pub weight: f64,
    pub uom: UomId,
}

impl ProductWeight {
    pub fn new(weight: f64, uom: impl Into<UomId>) -> Self {
        Self {
            weight,
            uom: uom.into(),
        }
    }

    fn validate(&self) -> Result<(), DomainError> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(DomainError::validation(
                "product weight must be a non-negative number",
            ));
        }
        Ok(())
    }
}

impl ValueObject for ProductWeight {}

/// Aggregate root: a sellable product and its per-unit weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    id: ProductId,
    tenant_id: Option<TenantId>,
    sku: String,
    name: String,
    weight: Option<ProductWeight>,
    version: u64,
    created: bool,
}

impl Product {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: ProductId) -> Self {
        Self {
            id,
            tenant_id: None,
            sku: String::new(),
            name: String::new(),
            weight: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Per-unit weight, if one was recorded.
    pub fn weight(&self) -> Option<&ProductWeight> {
        self.weight.as_ref()
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateProduct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub sku: String,
    pub name: String,
    pub weight: Option<ProductWeight>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetProductWeight (`None` clears the weight).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetProductWeight {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub weight: Option<ProductWeight>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProductCommand {
    CreateProduct(CreateProduct),
    SetProductWeight(SetProductWeight),
}

/// Event: ProductCreated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub sku: String,
    pub name: String,
    pub weight: Option<ProductWeight>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductWeightSet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductWeightSet {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub weight: Option<ProductWeight>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProductEvent {
    ProductCreated(ProductCreated),
    ProductWeightSet(ProductWeightSet),
}

impl Event for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductCreated(_) => "products.product.created",
            ProductEvent::ProductWeightSet(_) => "products.product.weight_set",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::ProductCreated(e) => e.occurred_at,
            ProductEvent::ProductWeightSet(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Product {
    type Command = ProductCommand;
    type Event = ProductEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProductEvent::ProductCreated(e) => {
                self.id = e.product_id;
                self.tenant_id = Some(e.tenant_id);
                self.sku = e.sku.clone();
                self.name = e.name.clone();
                self.weight = e.weight.clone();
                self.created = true;
            }
            ProductEvent::ProductWeightSet(e) => {
                self.weight = e.weight.clone();
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ProductCommand::CreateProduct(cmd) => self.handle_create(cmd),
            ProductCommand::SetProductWeight(cmd) => self.handle_set_weight(cmd),
        }
    }
}

impl Product {
    fn ensure_tenant(&self, tenant_id: TenantId) -> Result<(), DomainError> {
        if !self.created {
            return Ok(());
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        Ok(())
    }

    fn ensure_product_id(&self, product_id: ProductId) -> Result<(), DomainError> {
        if self.id != product_id {
            return Err(DomainError::invariant("product_id mismatch"));
        }
        Ok(())
    }

    fn ensure_existing(&self, tenant_id: TenantId, product_id: ProductId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_tenant(tenant_id)?;
        self.ensure_product_id(product_id)
    }

    fn handle_create(&self, cmd: &CreateProduct) -> Result<Vec<ProductEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("product already exists"));
        }
        if cmd.sku.trim().is_empty() {
            return Err(DomainError::validation("sku cannot be empty"));
        }
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if let Some(weight) = &cmd.weight {
            weight.validate()?;
        }

        Ok(vec![ProductEvent::ProductCreated(ProductCreated {
            tenant_id: cmd.tenant_id,
            product_id: cmd.product_id,
            sku: cmd.sku.trim().to_string(),
            name: cmd.name.trim().to_string(),
            weight: cmd.weight.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_weight(&self, cmd: &SetProductWeight) -> Result<Vec<ProductEvent>, DomainError> {
        self.ensure_existing(cmd.tenant_id, cmd.product_id)?;
        if let Some(weight) = &cmd.weight {
            weight.validate()?;
        }

        Ok(vec![ProductEvent::ProductWeightSet(ProductWeightSet {
            tenant_id: cmd.tenant_id,
            product_id: cmd.product_id,
            weight: cmd.weight.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}
