//! Server component: bounded queue, single worker thread, and event log
//!
//! The [`Server`] is the composition root of the simulator. It owns the
//! configuration, the request namer, the bounded queue, the event log and the
//! worker thread, and exposes admission and lifecycle operations to the
//! generator and to observers.
//!
//! Admission follows a drop-on-full policy: a request that finds the queue at
//! capacity is logged as blocked and discarded. It is never retried and the
//! caller is never blocked.
//!
//! # Example
//!
//! ```no_run
//! use qsim_components::{Admission, Server};
//! use qsim_core::{Config, RequestType};
//!
//! let server = Server::new(Config::new(2)).unwrap();
//! match server.admit(RequestType::Read) {
//!     Admission::Accepted(record) => println!("queued {}", record.name()),
//!     Admission::Rejected(record) => println!("dropped {}", record.name()),
//!     Admission::Stopped => println!("server is stopped"),
//! }
//! server.stop();
//! ```

use crate::error::{ControlError, QueueError};
use crate::queue::BoundedRequestQueue;
use crate::worker::{Worker, DEFAULT_POLL_INTERVAL};
use parking_lot::{Mutex, RwLock};
use qsim_core::logging::{events, server_span};
use qsim_core::{
    Config, EventLog, MetricsSummary, RequestNamer, RequestRecord, RequestType, ServerMetrics,
    SimError, Validate,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::error;

/// Outcome of offering a request to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The request was named and placed in the queue
    Accepted(RequestRecord),
    /// The queue was full; the request was named, logged as blocked, and dropped
    Rejected(RequestRecord),
    /// The server has been stopped; nothing was named, queued, or logged
    Stopped,
}

impl Admission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Admission::Accepted(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Admission::Rejected(_))
    }

    /// The named record, if the server was still running
    pub fn record(&self) -> Option<&RequestRecord> {
        match self {
            Admission::Accepted(record) | Admission::Rejected(record) => Some(record),
            Admission::Stopped => None,
        }
    }
}

/// State shared between the server handle and its worker thread
pub(crate) struct ServerShared {
    pub(crate) name: String,
    pub(crate) config: Arc<Config>,
    pub(crate) queue: BoundedRequestQueue,
    pub(crate) log: EventLog,
    pub(crate) metrics: ServerMetrics,
    pub(crate) in_service: Mutex<Option<RequestRecord>>,
    running: AtomicBool,
}

impl ServerShared {
    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Builder for [`Server`]
///
/// ```no_run
/// use qsim_components::ServerBuilder;
/// use qsim_core::Config;
/// use std::time::Duration;
///
/// let server = ServerBuilder::new(Config::new(4))
///     .name("edge")
///     .poll_interval(Duration::from_millis(100))
///     .build()
///     .unwrap();
/// # server.stop();
/// ```
#[derive(Debug, Clone)]
pub struct ServerBuilder {
    config: Config,
    name: String,
    poll_interval: Duration,
}

impl ServerBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            name: "server".to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Name used for the worker thread, metrics labels and diagnostics
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Upper bound on how long the worker waits on an empty queue before
    /// re-checking whether the server was stopped
    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Validate the configuration and start the worker
    ///
    /// # Errors
    ///
    /// Returns `SimError::Config` for an invalid configuration (no thread is
    /// started) and `SimError::Spawn` if the worker thread cannot be created.
    pub fn build(self) -> Result<Server, SimError> {
        self.config
            .validate()
            .map_err(qsim_core::ConfigError::from)?;
        qsim_core::builder::validate_non_empty("name", &self.name)
            .map_err(qsim_core::ConfigError::from)?;

        let capacity = self.config.queue_capacity;
        let shared = Arc::new(ServerShared {
            metrics: ServerMetrics::new(self.name.clone()),
            name: self.name,
            config: Arc::new(self.config),
            queue: BoundedRequestQueue::new(capacity),
            log: EventLog::new(),
            in_service: Mutex::new(None),
            running: AtomicBool::new(true),
        });

        let _span = server_span(&shared.name, capacity).entered();
        let worker = Worker::new(Arc::clone(&shared), self.poll_interval)
            .spawn()
            .map_err(|source| SimError::Spawn {
                thread: format!("{}-worker", shared.name),
                source,
            })?;
        events::server_started(&shared.name, capacity, self.poll_interval);

        Ok(Server {
            shared,
            namer: RequestNamer::new(),
            admission_gate: RwLock::new(()),
            worker: Mutex::new(Some(worker)),
            generator_active: AtomicBool::new(false),
            poll_interval: self.poll_interval,
        })
    }
}

/// A single server fed by a bounded request queue
///
/// The worker starts as soon as the server is built and runs until
/// [`Server::stop`]. Dropping the server stops it.
pub struct Server {
    shared: Arc<ServerShared>,
    namer: RequestNamer,
    /// Held shared by `admit` and exclusively by `stop` while it clears the
    /// running flag, so no admission straddles a stop
    admission_gate: RwLock<()>,
    worker: Mutex<Option<JoinHandle<()>>>,
    generator_active: AtomicBool,
    poll_interval: Duration,
}

impl Server {
    /// Build a server with default settings and start its worker
    pub fn new(config: Config) -> Result<Self, SimError> {
        ServerBuilder::new(config).build()
    }

    pub fn builder(config: Config) -> ServerBuilder {
        ServerBuilder::new(config)
    }

    /// Name a request of `request_type` and try to queue it
    ///
    /// Every attempt made while the server is running consumes a name, whether
    /// or not it is accepted. After [`Server::stop`] this is a no-op that
    /// returns [`Admission::Stopped`].
    pub fn admit(&self, request_type: impl Into<RequestType>) -> Admission {
        let _gate = self.admission_gate.read();
        if !self.is_running() {
            return Admission::Stopped;
        }

        let record = self.namer.next_record(request_type.into());
        match self.shared.queue.try_enqueue(record.clone()) {
            Ok(()) => {
                self.shared
                    .log
                    .append(format!("Request '{}' added to the queue.", record.name()));
                let depth = self.shared.queue.len();
                self.shared
                    .metrics
                    .record_accepted(record.request_type(), depth);
                events::request_admitted(&record, depth);
                Admission::Accepted(record)
            }
            Err(QueueError::Full { capacity }) => {
                self.shared.log.append(format!(
                    "Queue is full! Request '{}' blocked.",
                    record.name()
                ));
                self.shared.metrics.record_rejected(record.request_type());
                events::request_rejected(&record, capacity);
                Admission::Rejected(record)
            }
        }
    }

    /// Stop the worker and wait for it to exit
    ///
    /// A request already in service finishes (and logs its completion) before
    /// this returns. Calling `stop` again has no further effect.
    pub fn stop(&self) {
        {
            let _gate = self.admission_gate.write();
            self.shared.running.store(false, Ordering::Release);
        }

        let Some(handle) = self.worker.lock().take() else {
            return;
        };
        if handle.join().is_err() {
            error!(server = %self.shared.name, "Worker thread panicked");
        }
        events::server_stopped(&self.shared.name, self.shared.metrics.processed());
    }

    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    /// True when nothing is queued or in service and every accepted request
    /// has been processed
    pub fn is_idle(&self) -> bool {
        self.shared.queue.is_empty()
            && self.shared.in_service.lock().is_none()
            && self.shared.metrics.accepted() == self.shared.metrics.processed()
    }

    /// Point-in-time copy of the queued requests, oldest first
    pub fn snapshot(&self) -> Vec<RequestRecord> {
        self.shared.queue.snapshot()
    }

    /// The request currently being processed, if any
    pub fn in_service(&self) -> Option<RequestRecord> {
        self.shared.in_service.lock().clone()
    }

    pub fn log(&self) -> &EventLog {
        &self.shared.log
    }

    pub fn queue(&self) -> &BoundedRequestQueue {
        &self.shared.queue
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// How many names have been issued for `request_type`
    pub fn issued(&self, request_type: &RequestType) -> u64 {
        self.namer.issued(request_type)
    }

    pub fn metrics(&self) -> MetricsSummary {
        self.shared.metrics.summary()
    }

    /// Reserve the server for one generator run
    pub(crate) fn claim_generator(&self) -> Result<(), ControlError> {
        if !self.is_running() {
            return Err(ControlError::ServerStopped {
                server: self.shared.name.clone(),
            });
        }
        self.generator_active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| ControlError::AlreadyActive {
                server: self.shared.name.clone(),
            })
    }

    pub(crate) fn release_generator(&self) {
        self.generator_active.store(false, Ordering::Release);
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("name", &self.shared.name)
            .field("capacity", &self.shared.queue.capacity())
            .field("queued", &self.shared.queue.len())
            .field("running", &self.is_running())
            .finish()
    }
}
