//! Concurrent components of the qsim single-server queue simulator.
//!
//! - [`BoundedRequestQueue`]: fixed-capacity FIFO with drop-on-full admission.
//! - [`Server`]: owns the queue, the event log and the worker thread that
//!   processes requests one at a time.
//! - [`Generator`]: replays the configured request sequence into a server at
//!   a fixed arrival interval, with pause/resume/stop control.
//!
//! # Example
//!
//! ```no_run
//! use qsim_components::{Generator, Server};
//! use qsim_core::Config;
//! use std::sync::Arc;
//!
//! let server = Arc::new(Server::new(Config::default()).unwrap());
//! let generator = Generator::new(Arc::clone(&server));
//! generator.start().unwrap();
//! generator.join();
//!
//! for entry in server.log().tail(5) {
//!     println!("{entry}");
//! }
//! server.stop();
//! ```

pub mod error;
pub mod generator;
pub mod queue;
pub mod server;
pub mod worker;

pub use error::{ControlError, QueueError};
pub use generator::{Generator, PlaybackState, PAUSE_POLL_SLICE};
pub use queue::BoundedRequestQueue;
pub use server::{Admission, Server, ServerBuilder};
pub use worker::DEFAULT_POLL_INTERVAL;
