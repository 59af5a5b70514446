//! # qsim - single-server bounded-queue simulator
//!
//! A generator replays a configured sequence of typed requests into a server
//! with a fixed-capacity queue. A worker thread drains the queue, holding each
//! request in service for a type-dependent duration, and every admission,
//! rejection and completion is recorded in an ordered event log.
//!
//! ## Quick Start
//!
//! ```no_run
//! use qsim::prelude::*;
//! use std::sync::Arc;
//!
//! let config = Config::from_path("config.json").unwrap();
//! let server = Arc::new(Server::new(config).unwrap());
//! let generator = Generator::new(Arc::clone(&server));
//! generator.start().unwrap();
//! generator.join();
//!
//! for entry in server.log().tail(10) {
//!     println!("{entry}");
//! }
//! server.stop();
//! println!("{}", server.metrics());
//! ```

pub use qsim_components as components;
pub use qsim_core as core;

pub mod prelude {
    //! Commonly used types
    pub use qsim_components::{
        Admission, BoundedRequestQueue, ControlError, Generator, PlaybackState, QueueError,
        Server, ServerBuilder,
    };
    pub use qsim_core::{
        Config, ConfigError, EventLog, LogEntry, MetricsSummary, RequestRecord, RequestType,
        ServiceTable, SimError,
    };
}
