//! Request metrics for the user service client.
//!
//! Recorded through the `metrics` facade; the embedding application decides
//! which recorder (Prometheus, statsd, ...) receives them.

use std::time::Duration;

use crate::domain::ClientError;

pub const REQUESTS_TOTAL: &str = "user_client_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "user_client_request_duration_seconds";

/// Outcome label for a finished call.
#[must_use]
pub fn outcome_label<T>(result: &Result<T, ClientError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    }
}

/// Record one finished call against `operation`.
pub fn record_call(operation: &'static str, outcome: &'static str, elapsed: Duration) {
    metrics::counter!(REQUESTS_TOTAL, "operation" => operation, "outcome" => outcome)
        .increment(1);
    metrics::histogram!(REQUEST_DURATION_SECONDS, "operation" => operation)
        .record(elapsed.as_secs_f64());
}
