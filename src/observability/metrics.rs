//! Metrics recorded through the `metrics` facade.
//!
//! No exporter is installed by the library; embedders pick one.
//!
//! # Metrics
//! - `tzkit_batches_submitted_total` (counter): batches sent to preapply
//! - `tzkit_batches_rejected_total` (counter): batches gated at preapply
//! - `tzkit_operations_injected_total` (counter): operations broadcast
//! - `tzkit_rpc_errors_total` (counter): failed node calls, by endpoint

pub fn record_batch_submitted(operations: usize) {
    ::metrics::counter!("tzkit_batches_submitted_total").increment(1);
    tracing::trace!(operations, "metric: batch submitted");
}

pub fn record_batch_rejected(failed: usize) {
    ::metrics::counter!("tzkit_batches_rejected_total").increment(1);
    tracing::trace!(failed, "metric: batch rejected");
}

pub fn record_operations_injected(count: usize) {
    ::metrics::counter!("tzkit_operations_injected_total").increment(count as u64);
}

pub fn record_rpc_error(endpoint: &'static str) {
    ::metrics::counter!("tzkit_rpc_errors_total", "endpoint" => endpoint).increment(1);
}
