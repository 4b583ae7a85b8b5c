//! Request-level counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    redirects_served: AtomicU64,
    wake_timeouts: AtomicU64,
    unmatched_hosts: AtomicU64,
    internal_errors: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirect_served(&self) {
        self.redirects_served.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "redirects_served", "Metric incremented");
    }

    pub fn wake_timeout(&self) {
        self.wake_timeouts.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "wake_timeouts", "Metric incremented");
    }

    pub fn unmatched_host(&self) {
        self.unmatched_hosts.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "unmatched_hosts", "Metric incremented");
    }

    pub fn internal_error(&self) {
        self.internal_errors.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "internal_errors", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            redirects_served: self.redirects_served.load(Ordering::Relaxed),
            wake_timeouts: self.wake_timeouts.load(Ordering::Relaxed),
            unmatched_hosts: self.unmatched_hosts.load(Ordering::Relaxed),
            internal_errors: self.internal_errors.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub redirects_served: u64,
    pub wake_timeouts: u64,
    pub unmatched_hosts: u64,
    pub internal_errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = Metrics::new();
        metrics.redirect_served();
        metrics.redirect_served();
        metrics.wake_timeout();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.redirects_served, 2);
        assert_eq!(snapshot.wake_timeouts, 1);
        assert_eq!(snapshot.unmatched_hosts, 0);
    }
}
