//! Sales Orders domain module (event-sourced).
//!
//! Business rules for sales orders and their shipping weight, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage):
//!
//! - [`order`]: the order aggregate with its declared weight and weight unit
//! - [`weight`]: line weight aggregation and weight unit resolution
//! - [`fields`]: dependency graph between the order's derived fields

pub mod fields;
pub mod order;
pub mod weight;

pub use fields::{FieldGraph, SaleField};
pub use order::{
    AddLine, ConfirmOrder, CreateSalesOrder, LineAdded, LineQuantityChanged, LineRemoved,
    MarkInvoiced, OrderConfirmed, OrderInvoiced, OrderLine, RemoveLine, SalesOrder,
    SalesOrderCommand, SalesOrderCreated, SalesOrderEvent, SalesOrderId, SalesOrderStatus,
    SetWeight, SetWeightUom, UpdateLineQuantity, WeightSet, WeightUomSet,
};
pub use weight::{
    DEFAULT_WEIGHT_DIGITS, FALLBACK_WEIGHT_UOM, compute_lines_weight, line_weight,
    resolve_weight_uom, weight_digits,
};
