//! Process-wide logging setup for ledger hosts and tests.

/// Initialize tracing/logging with the default filter (`info`, overridable
/// through `RUST_LOG`).
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::DEFAULT_FILTER);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
