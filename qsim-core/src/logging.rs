//! Structured diagnostic logging for the simulator
//!
//! The in-memory [`EventLog`](crate::EventLog) is what observers display; this
//! module wires the `tracing` diagnostics that explain *why* the simulator did
//! what it did (admissions, drops, service start/finish, playback changes).
//!
//! # Controlling output
//!
//! ```rust
//! use qsim_core::logging::init_logging_with_level;
//! init_logging_with_level("debug");
//! ```
//!
//! `RUST_LOG` always wins over the level passed in:
//!
//! ```bash
//! RUST_LOG=qsim_components::worker=trace qsim run --config config.json
//! ```
//!
//! Levels used by the simulator:
//! - **TRACE**: queue polling timeouts
//! - **DEBUG**: admissions, service start/finish, playback transitions
//! - **INFO**: server and generator lifecycle
//! - **WARN**: dropped requests, unknown request types

use crate::request::{RequestRecord, RequestType};
use std::time::Duration;
use tracing::{debug, info, warn, Span};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging at `info`
pub fn init_logging() {
    init_logging_with_level("info")
}

/// Initialize logging with a specific level
///
/// Installing a subscriber twice is not an error; the second call keeps the
/// subscriber already in place.
pub fn init_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("{level},qsim_core={level},qsim_components={level}").into()
    });

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_names(true)
                .with_level(true),
        )
        .with(filter)
        .try_init();

    if installed.is_ok() {
        info!("qsim logging initialized at level: {}", level);
    }
}

/// Initialize pretty-printed logging with everything enabled
pub fn init_detailed_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "trace,qsim_core=trace,qsim_components=trace".into());

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true)
                .pretty(),
        )
        .with(filter)
        .try_init();

    if installed.is_ok() {
        info!("Detailed qsim logging initialized");
    }
}

/// Span covering a server's lifetime
pub fn server_span(server: &str, capacity: usize) -> Span {
    tracing::info_span!("server", name = server, capacity = capacity)
}

/// Span covering the worker loop
pub fn worker_span(server: &str) -> Span {
    tracing::debug_span!("worker", server = server)
}

/// Span covering one generator run
pub fn generator_span(server: &str, sequence_len: usize) -> Span {
    tracing::debug_span!("generator", server = server, sequence_len = sequence_len)
}

/// Logging helpers for simulator events
pub mod events {
    use super::*;

    pub fn server_started(server: &str, capacity: usize, poll_interval: Duration) {
        info!(
            server = server,
            capacity = capacity,
            poll_interval = ?poll_interval,
            "Server started"
        );
    }

    pub fn server_stopped(server: &str, processed: u64) {
        info!(server = server, processed = processed, "Server stopped");
    }

    pub fn request_admitted(record: &RequestRecord, queue_depth: usize) {
        debug!(
            request = record.name(),
            request_type = %record.request_type(),
            queue_depth = queue_depth,
            "Request admitted"
        );
    }

    pub fn request_rejected(record: &RequestRecord, capacity: usize) {
        warn!(
            request = record.name(),
            request_type = %record.request_type(),
            capacity = capacity,
            "Queue full, request dropped"
        );
    }

    pub fn service_started(record: &RequestRecord, service_time: Duration) {
        debug!(
            request = record.name(),
            service_time = ?service_time,
            "Service started"
        );
    }

    pub fn service_completed(record: &RequestRecord) {
        debug!(request = record.name(), "Service completed");
    }

    pub fn unknown_request_type(request_type: &RequestType, fallback: Duration) {
        warn!(
            request_type = %request_type,
            fallback = ?fallback,
            "No service time configured, using fallback"
        );
    }

    pub fn playback_changed(server: &str, from: &str, to: &str) {
        debug!(server = server, from = from, to = to, "Playback state changed");
    }

    pub fn generator_finished(server: &str, admitted: usize, total: usize) {
        info!(
            server = server,
            admitted = admitted,
            total = total,
            "Generator run finished"
        );
    }
}
