//! Products domain module (event-sourced).
//!
//! Products carry the intrinsic per-unit weight that order weights are built
//! from. The weight logic only ever reads them.

pub mod catalog;
pub mod product;

pub use catalog::{ProductCatalog, ProductWeights};
pub use product::{
    CreateProduct, Product, ProductCommand, ProductCreated, ProductEvent, ProductId, ProductWeight,
    ProductWeightSet, SetProductWeight,
};
