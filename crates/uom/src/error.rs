use thiserror::Error;

use saleweight_core::DomainError;

use crate::uom::{UomCategory, UomId};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum UomError {
    #[error("unknown unit of measure: {0}")]
    UnknownUom(UomId),

    #[error("cannot convert {from} ({from_category}) into {to} ({to_category})")]
    IncompatibleCategories {
        from: UomId,
        from_category: UomCategory,
        to: UomId,
        to_category: UomCategory,
    },

    #[error("quantity is not a finite number: {0}")]
    InvalidQuantity(f64),
}

impl From<UomError> for DomainError {
    fn from(err: UomError) -> Self {
        match err {
            UomError::UnknownUom(id) => {
                DomainError::validation(format!("unknown unit of measure: {id}"))
            }
            other => DomainError::unit_conversion(other.to_string()),
        }
    }
}
