//! Units of measure and the conversion service.
//!
//! Quantities convert only between units of the same [`UomCategory`]; asking
//! for anything else is a data error that callers are expected to prevent by
//! constraining which units can be picked.

pub mod catalog;
pub mod error;
pub mod uom;

pub use catalog::{UomCatalog, UomConverter};
pub use error::UomError;
pub use uom::{Uom, UomCategory, UomId};
