//! Server counters and their export through the `metrics` facade
//!
//! [`ServerMetrics`] keeps its own atomic counters so callers can read a
//! consistent [`MetricsSummary`] at any time, and mirrors every update to the
//! global `metrics` recorder (a no-op unless the application installs one).

use crate::request::RequestType;
use metrics::{counter, gauge, histogram};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counter names published to the `metrics` recorder
pub mod names {
    pub const REQUESTS_ACCEPTED: &str = "qsim_requests_accepted";
    pub const REQUESTS_REJECTED: &str = "qsim_requests_rejected";
    pub const REQUESTS_PROCESSED: &str = "qsim_requests_processed";
    pub const QUEUE_DEPTH: &str = "qsim_queue_depth";
    pub const SERVICE_TIME_MS: &str = "qsim_service_time_ms";
}

/// Thread-safe counters for one server
#[derive(Debug)]
pub struct ServerMetrics {
    server: String,
    accepted: AtomicU64,
    rejected: AtomicU64,
    processed: AtomicU64,
    busy_nanos: AtomicU64,
}

impl ServerMetrics {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            processed: AtomicU64::new(0),
            busy_nanos: AtomicU64::new(0),
        }
    }

    /// Record an accepted admission and the resulting queue depth
    pub fn record_accepted(&self, request_type: &RequestType, queue_depth: usize) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
        counter!(
            names::REQUESTS_ACCEPTED,
            "server" => self.server.clone(),
            "type" => request_type.to_string()
        )
        .increment(1);
        self.record_queue_depth(queue_depth);
    }

    /// Record a request dropped because the queue was full
    pub fn record_rejected(&self, request_type: &RequestType) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        counter!(
            names::REQUESTS_REJECTED,
            "server" => self.server.clone(),
            "type" => request_type.to_string()
        )
        .increment(1);
    }

    /// Record a completed request and how long it was in service
    pub fn record_processed(&self, request_type: &RequestType, service_time: Duration) {
        self.processed.fetch_add(1, Ordering::Relaxed);
        let nanos = u64::try_from(service_time.as_nanos()).unwrap_or(u64::MAX);
        self.busy_nanos.fetch_add(nanos, Ordering::Relaxed);
        counter!(
            names::REQUESTS_PROCESSED,
            "server" => self.server.clone(),
            "type" => request_type.to_string()
        )
        .increment(1);
        histogram!(
            names::SERVICE_TIME_MS,
            "server" => self.server.clone(),
            "type" => request_type.to_string()
        )
        .record(service_time.as_secs_f64() * 1000.0);
    }

    /// Publish the current queue depth
    pub fn record_queue_depth(&self, depth: usize) {
        gauge!(names::QUEUE_DEPTH, "server" => self.server.clone()).set(depth as f64);
    }

    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of the counters
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            server: self.server.clone(),
            accepted: self.accepted(),
            rejected: self.rejected(),
            processed: self.processed(),
            busy_time: Duration::from_nanos(self.busy_nanos.load(Ordering::Relaxed)),
        }
    }
}

/// Snapshot of a server's counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSummary {
    pub server: String,
    pub accepted: u64,
    pub rejected: u64,
    pub processed: u64,
    pub busy_time: Duration,
}

impl MetricsSummary {
    /// Total admission attempts seen by the server
    pub fn offered(&self) -> u64 {
        self.accepted + self.rejected
    }

    /// Fraction of admission attempts that were dropped
    pub fn rejection_ratio(&self) -> f64 {
        match self.offered() {
            0 => 0.0,
            offered => self.rejected as f64 / offered as f64,
        }
    }
}

impl fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} offered, {} accepted, {} rejected ({:.1}%), {} processed, busy {:.1}s",
            self.server,
            self.offered(),
            self.accepted,
            self.rejected,
            self.rejection_ratio() * 100.0,
            self.processed,
            self.busy_time.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = ServerMetrics::new("test-server");
        metrics.record_accepted(&RequestType::Read, 1);
        metrics.record_accepted(&RequestType::Write, 2);
        metrics.record_rejected(&RequestType::Forward);
        metrics.record_processed(&RequestType::Read, Duration::from_millis(250));

        assert_eq!(metrics.accepted(), 2);
        assert_eq!(metrics.rejected(), 1);
        assert_eq!(metrics.processed(), 1);

        let summary = metrics.summary();
        assert_eq!(summary.offered(), 3);
        assert_eq!(summary.busy_time, Duration::from_millis(250));
        assert!((summary.rejection_ratio() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_summary() {
        let summary = ServerMetrics::new("idle").summary();
        assert_eq!(summary.offered(), 0);
        assert_eq!(summary.rejection_ratio(), 0.0);
        assert_eq!(
            summary.to_string(),
            "idle: 0 offered, 0 accepted, 0 rejected (0.0%), 0 processed, busy 0.0s"
        );
    }
}
