//! The server's single consumer
//!
//! The worker drains the queue one request at a time for as long as the
//! server is running. Waiting on an empty queue is bounded by the poll
//! interval so a stop request is noticed within one interval; a request that
//! is already in service always runs to completion.

use crate::server::ServerShared;
use qsim_core::logging::{events, worker_span};
use qsim_core::RequestRecord;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::trace;

/// Default bound on a single wait for the next request
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Sequential request processor bound to one server
pub struct Worker {
    shared: Arc<ServerShared>,
    poll_interval: Duration,
}

impl Worker {
    pub(crate) fn new(shared: Arc<ServerShared>, poll_interval: Duration) -> Self {
        Self {
            shared,
            poll_interval,
        }
    }

    /// Run the worker loop on a dedicated thread
    pub(crate) fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("{}-worker", self.shared.name))
            .spawn(move || self.run())
    }

    fn run(&self) {
        let span = worker_span(&self.shared.name);
        let _guard = span.enter();

        while self.shared.is_running() {
            match self.shared.queue.dequeue_wait(self.poll_interval) {
                Some(record) => self.serve(record),
                None => trace!(poll_interval = ?self.poll_interval, "Queue empty"),
            }
        }
    }

    /// Hold `record` in service for its configured duration
    fn serve(&self, record: RequestRecord) {
        let service = &self.shared.config.service;
        let request_type = record.request_type();
        let service_time = service.duration_for(request_type);
        if !service.is_mapped(request_type) {
            events::unknown_request_type(request_type, service_time);
        }

        *self.shared.in_service.lock() = Some(record.clone());
        self.shared.log.append(format!(
            "Processing '{}' (time: {}s)...",
            record.name(),
            service_time.as_secs_f64()
        ));
        events::service_started(&record, service_time);

        thread::sleep(service_time);

        self.shared
            .log
            .append(format!("'{}' processed.", record.name()));
        self.shared
            .metrics
            .record_processed(request_type, service_time);
        self.shared
            .metrics
            .record_queue_depth(self.shared.queue.len());
        events::service_completed(&record);
        *self.shared.in_service.lock() = None;
    }
}
