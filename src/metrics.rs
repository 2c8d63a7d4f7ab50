use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing relay activity.
#[derive(Default)]
pub struct RelayMetrics {
    authentications: AtomicU64,
    authentication_failures: AtomicU64,
    operations_forwarded: AtomicU64,
    remote_errors: AtomicU64,
    transport_failures: AtomicU64,
}

impl RelayMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed token exchange.
    pub fn record_authentication(&self, succeeded: bool) {
        if succeeded {
            self.authentications.fetch_add(1, Ordering::Relaxed);
        } else {
            self.authentication_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record an operation that reached the remote API and got a response back.
    pub fn record_forwarded(&self, success_status: bool) {
        self.operations_forwarded.fetch_add(1, Ordering::Relaxed);
        if !success_status {
            self.remote_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record an operation that never produced a remote response.
    pub fn record_transport_failure(&self) {
        self.transport_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            authentications: self.authentications.load(Ordering::Relaxed),
            authentication_failures: self.authentication_failures.load(Ordering::Relaxed),
            operations_forwarded: self.operations_forwarded.load(Ordering::Relaxed),
            remote_errors: self.remote_errors.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of relay counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Successful token exchanges since startup.
    pub authentications: u64,
    /// Token exchanges that failed for any reason.
    pub authentication_failures: u64,
    /// Operations that received a remote response, whatever its status.
    pub operations_forwarded: u64,
    /// Forwarded operations answered with a non-2xx status.
    pub remote_errors: u64,
    /// Operations that failed before a remote response arrived.
    pub transport_failures: u64,
}
