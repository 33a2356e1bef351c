//! Invoicing domain module (event-sourced).
//!
//! Invoices raised from sales orders. Only the parts that carry the order's
//! shipping weight are modelled here.

pub mod invoice;

pub use invoice::{
    Invoice, InvoiceCommand, InvoiceEvent, InvoiceId, InvoiceIssued, InvoicePosted, InvoiceStatus,
    InvoiceVoided, InvoiceWeightSet, IssueInvoice, PostInvoice, SetInvoiceWeight, VoidInvoice,
};
