//! Read access to product weights.

use std::collections::HashMap;

use saleweight_core::AggregateRoot;

use crate::product::{Product, ProductId, ProductWeight};

/// Lookup of per-unit product weights.
///
/// The order weight aggregator only needs this narrow view of the catalog, so
/// a host can back it with whatever product store it owns.
pub trait ProductWeights {
    /// Unit weight of `product_id`, or `None` if the product is unknown or
    /// has no weight recorded.
    fn unit_weight(&self, product_id: &ProductId) -> Option<&ProductWeight>;
}

/// In-memory product catalog.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: HashMap<ProductId, Product>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product keyed by its id.
    pub fn insert(&mut self, product: Product) {
        self.products.insert(*product.id(), product);
    }

    pub fn get(&self, product_id: &ProductId) -> Option<&Product> {
        self.products.get(product_id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl ProductWeights for ProductCatalog {
    fn unit_weight(&self, product_id: &ProductId) -> Option<&ProductWeight> {
        self.products.get(product_id).and_then(Product::weight)
    }
}

impl ProductWeights for HashMap<ProductId, ProductWeight> {
    fn unit_weight(&self, product_id: &ProductId) -> Option<&ProductWeight> {
        self.get(product_id)
    }
}
