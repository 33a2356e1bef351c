//! `saleweight-extension` — shipping weight for sales orders.
//!
//! The host owns orders, shipments and invoices. This crate is the bundle of
//! computed accessors and hook functions the host calls at its extension
//! points:
//!
//! - [`SaleWeightExtension::recompute`] after order fields change
//! - [`SaleWeightExtension::carrier_context`] when pricing a carrier
//! - [`SaleWeightExtension::create_shipments`] / [`SaleWeightExtension::create_invoice`]
//!   around downstream record creation

pub mod config;
pub mod extension;
pub mod hooks;
pub mod host;

pub use config::{ConfigError, SaleWeightConfig};
pub use extension::{SaleWeightExtension, SaleWeightFields};
pub use hooks::{InvoiceHost, ShipmentHost, propagate_to_invoice, propagate_to_shipments};
pub use host::InMemoryHost;
