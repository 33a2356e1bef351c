//! Shared tracing setup for hosts embedding the sale weight extension.

/// Tracing subscriber configuration (filters, JSON formatting).
pub mod tracing;

/// Initialize process-wide tracing with the `info` default filter.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init_with_default_filter(tracing::DEFAULT_FILTER);
}
