//! Core building blocks of the qsim single-server queue simulator.
//!
//! This crate holds everything the concurrent components share but that does
//! not itself run on a thread:
//!
//! - [`Config`]: immutable simulator parameters, loaded from JSON.
//! - [`RequestType`] and [`RequestRecord`]: tagged requests.
//! - [`RequestNamer`]: gap-free per-type request names (`Read1`, `Read2`, ...).
//! - [`EventLog`]: the append-only, timestamped log observers display.
//! - [`ServerMetrics`]: counters exported through the `metrics` facade.
//! - [`logging`]: `tracing` subscriber setup and event helpers.
//!
//! # Basic Usage
//!
//! ```rust
//! use qsim_core::{Config, EventLog, RequestNamer, RequestType};
//!
//! let config = Config::from_json_str(r#"{
//!     "queue_length": 2, "rq_time_arrival": 0,
//!     "read_time": 1, "write_time": 1, "forward_time": 1,
//!     "requests_sequence": ["read", "write", "forward"]
//! }"#).unwrap();
//!
//! let namer = RequestNamer::new();
//! let log = EventLog::new();
//! for request_type in &config.request_sequence {
//!     let name = namer.next(request_type);
//!     log.append(format!("Request '{name}' added to the queue."));
//! }
//! assert_eq!(log.tail(1)[0].message, "Request 'Forward1' added to the queue.");
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod event_log;
pub mod logging;
pub mod metrics;
pub mod naming;
pub mod request;

pub use builder::{Validate, ValidationError, ValidationResult};
pub use config::{Config, ServiceTable, DEFAULT_FALLBACK_DURATION};
pub use error::{ConfigError, SimError};
pub use event_log::{EventLog, LogEntry};
pub use logging::{init_detailed_logging, init_logging, init_logging_with_level};
pub use crate::metrics::{MetricsSummary, ServerMetrics};
pub use naming::RequestNamer;
pub use request::{RequestRecord, RequestType};
