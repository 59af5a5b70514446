//! Request generator: replays the configured sequence into a server
//!
//! A [`Generator`] runs on its own thread and offers one request per
//! arrival interval to its [`Server`]. Playback is controlled through an
//! explicit [`PlaybackState`] machine:
//!
//! ```text
//! Idle --start--> Running --pause--> Paused --resume--> Running
//! Idle | Running | Paused --stop / sequence end--> Stopped
//! ```
//!
//! Admissions happen while holding the control lock, so once
//! [`Generator::pause`] or [`Generator::stop`] returns no further request is
//! offered until playback resumes.

use crate::error::ControlError;
use crate::server::Server;
use parking_lot::{Condvar, Mutex};
use qsim_core::logging::{events, generator_span};
use qsim_core::RequestType;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// How long a paused generator sleeps between checks of its control state
pub const PAUSE_POLL_SLICE: Duration = Duration::from_millis(100);

/// Playback state of a generator run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    Idle,
    Running,
    Paused,
    Stopped,
}

impl PlaybackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Running => "running",
            PlaybackState::Paused => "paused",
            PlaybackState::Stopped => "stopped",
        }
    }

    /// Whether `self -> next` is a legal transition
    pub fn can_transition_to(&self, next: PlaybackState) -> bool {
        use PlaybackState::*;
        matches!(
            (self, next),
            (Idle, Running)
                | (Idle, Stopped)
                | (Running, Paused)
                | (Running, Stopped)
                | (Paused, Running)
                | (Paused, Stopped)
        )
    }

    pub fn is_terminal(&self) -> bool {
        *self == PlaybackState::Stopped
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct GeneratorShared {
    server: Arc<Server>,
    sequence: Vec<RequestType>,
    arrival_interval: Duration,
    state: Mutex<PlaybackState>,
    changed: Condvar,
    cursor: AtomicUsize,
    accepted: AtomicUsize,
    rejected: AtomicUsize,
}

impl GeneratorShared {
    /// Move to `next` if the transition is legal. Caller holds the state lock.
    fn transition(
        &self,
        state: &mut PlaybackState,
        next: PlaybackState,
        action: &'static str,
    ) -> Result<(), ControlError> {
        if !state.can_transition_to(next) {
            return Err(ControlError::InvalidTransition {
                from: *state,
                action,
            });
        }
        events::playback_changed(self.server.name(), state.as_str(), next.as_str());
        *state = next;
        self.changed.notify_all();
        Ok(())
    }

    fn run(&self) {
        let _claim = RunClaim(self);
        let span = generator_span(self.server.name(), self.sequence.len());
        let _guard = span.enter();

        let mut state = self.state.lock();
        loop {
            while *state == PlaybackState::Paused {
                self.changed.wait_for(&mut state, PAUSE_POLL_SLICE);
            }
            if *state == PlaybackState::Stopped {
                break;
            }

            let cursor = self.cursor.load(Ordering::Acquire);
            let Some(request_type) = self.sequence.get(cursor) else {
                let _ = self.transition(&mut state, PlaybackState::Stopped, "finish");
                break;
            };

            let admission = self.server.admit(request_type.clone());
            if admission.is_accepted() {
                self.accepted.fetch_add(1, Ordering::AcqRel);
            } else if admission.is_rejected() {
                self.rejected.fetch_add(1, Ordering::AcqRel);
            } else {
                debug!("Server stopped, ending generator run");
                let _ = self.transition(&mut state, PlaybackState::Stopped, "finish");
                break;
            }
            self.cursor.store(cursor + 1, Ordering::Release);

            if cursor + 1 == self.sequence.len() {
                let _ = self.transition(&mut state, PlaybackState::Stopped, "finish");
                break;
            }

            // Pacing; stop cuts it short, pause takes effect at the top of the loop.
            match Instant::now().checked_add(self.arrival_interval) {
                Some(deadline) => {
                    while *state != PlaybackState::Stopped {
                        if self.changed.wait_until(&mut state, deadline).timed_out() {
                            break;
                        }
                    }
                }
                None => {
                    while *state != PlaybackState::Stopped {
                        self.changed.wait(&mut state);
                    }
                }
            }
        }
        drop(state);

        events::generator_finished(
            self.server.name(),
            self.accepted.load(Ordering::Acquire),
            self.sequence.len(),
        );
    }
}

/// Ends a run on every exit path of the playback thread, unwinding included:
/// the state becomes Stopped and the server's generator slot is freed.
struct RunClaim<'a>(&'a GeneratorShared);

impl Drop for RunClaim<'_> {
    fn drop(&mut self) {
        let mut state = self.0.state.lock();
        if !state.is_terminal() {
            let _ = self.0.transition(&mut state, PlaybackState::Stopped, "finish");
        }
        drop(state);
        self.0.server.release_generator();
    }
}

/// Producer thread replaying a request sequence into a [`Server`]
///
/// # Example
///
/// ```no_run
/// use qsim_components::{Generator, Server};
/// use qsim_core::Config;
/// use std::sync::Arc;
///
/// let server = Arc::new(Server::new(Config::default()).unwrap());
/// let generator = Generator::new(Arc::clone(&server));
/// generator.start().unwrap();
/// generator.pause().unwrap();
/// generator.resume().unwrap();
/// generator.join();
/// server.stop();
/// ```
pub struct Generator {
    shared: Arc<GeneratorShared>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Generator {
    /// Create an idle generator for the server's configured sequence and
    /// arrival interval
    pub fn new(server: Arc<Server>) -> Self {
        let sequence = server.config().request_sequence.clone();
        let arrival_interval = server.config().arrival_interval;
        Self {
            shared: Arc::new(GeneratorShared {
                server,
                sequence,
                arrival_interval,
                state: Mutex::new(PlaybackState::Idle),
                changed: Condvar::new(),
                cursor: AtomicUsize::new(0),
                accepted: AtomicUsize::new(0),
                rejected: AtomicUsize::new(0),
            }),
            handle: Mutex::new(None),
        }
    }

    /// Replace the sequence to replay. Only meaningful before `start`.
    pub fn with_sequence<I, T>(mut self, sequence: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RequestType>,
    {
        if let Some(shared) = Arc::get_mut(&mut self.shared) {
            shared.sequence = sequence.into_iter().map(Into::into).collect();
        }
        self
    }

    pub fn with_arrival_interval(mut self, interval: Duration) -> Self {
        if let Some(shared) = Arc::get_mut(&mut self.shared) {
            shared.arrival_interval = interval;
        }
        self
    }

    /// Begin playback on a new thread
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` unless the generator is idle
    /// - `AlreadyActive` if another generator is running on the same server
    /// - `ServerStopped` if the server has been stopped
    /// - `Spawn` if the thread cannot be created
    pub fn start(&self) -> Result<(), ControlError> {
        let mut state = self.shared.state.lock();
        if *state != PlaybackState::Idle {
            return Err(ControlError::InvalidTransition {
                from: *state,
                action: "start",
            });
        }
        self.shared.server.claim_generator()?;
        self.shared
            .transition(&mut state, PlaybackState::Running, "start")?;

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(format!("{}-generator", self.shared.server.name()))
            .spawn(move || shared.run());
        match spawned {
            Ok(handle) => {
                *self.handle.lock() = Some(handle);
                Ok(())
            }
            Err(source) => {
                *state = PlaybackState::Stopped;
                self.shared.server.release_generator();
                Err(ControlError::Spawn(source))
            }
        }
    }

    /// Suspend admissions; the cursor does not advance while paused
    pub fn pause(&self) -> Result<(), ControlError> {
        let mut state = self.shared.state.lock();
        self.shared
            .transition(&mut state, PlaybackState::Paused, "pause")
    }

    /// Continue from the next unconsumed element
    pub fn resume(&self) -> Result<(), ControlError> {
        let mut state = self.shared.state.lock();
        if *state != PlaybackState::Paused {
            return Err(ControlError::InvalidTransition {
                from: *state,
                action: "resume",
            });
        }
        self.shared
            .transition(&mut state, PlaybackState::Running, "resume")
    }

    /// Pause when running, resume when paused
    pub fn toggle_pause(&self) -> Result<PlaybackState, ControlError> {
        let mut state = self.shared.state.lock();
        let next = match *state {
            PlaybackState::Running => PlaybackState::Paused,
            PlaybackState::Paused => PlaybackState::Running,
            from => {
                return Err(ControlError::InvalidTransition {
                    from,
                    action: "toggle pause",
                })
            }
        };
        self.shared
            .transition(&mut state, next, "toggle pause")?;
        Ok(next)
    }

    /// Halt playback immediately, whether running, paused or never started
    ///
    /// Requests already admitted stay queued. Stopping a stopped generator
    /// does nothing.
    pub fn stop(&self) -> Result<(), ControlError> {
        let mut state = self.shared.state.lock();
        if state.is_terminal() {
            return Ok(());
        }
        self.shared
            .transition(&mut state, PlaybackState::Stopped, "stop")
    }

    /// Wait for the playback thread to exit
    pub fn join(&self) {
        let Some(handle) = self.handle.lock().take() else {
            return;
        };
        if handle.join().is_err() {
            error!(server = %self.shared.server.name(), "Generator thread panicked");
        }
    }

    pub fn state(&self) -> PlaybackState {
        *self.shared.state.lock()
    }

    /// Index of the next sequence element to be offered
    pub fn cursor(&self) -> usize {
        self.shared.cursor.load(Ordering::Acquire)
    }

    pub fn sequence_len(&self) -> usize {
        self.shared.sequence.len()
    }

    /// Requests accepted by the server during this run
    pub fn accepted(&self) -> usize {
        self.shared.accepted.load(Ordering::Acquire)
    }

    /// Requests dropped because the queue was full during this run
    pub fn rejected(&self) -> usize {
        self.shared.rejected.load(Ordering::Acquire)
    }

    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    pub fn server(&self) -> &Arc<Server> {
        &self.shared.server
    }
}

impl Drop for Generator {
    fn drop(&mut self) {
        let _ = self.stop();
        self.join();
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("server", &self.shared.server.name())
            .field("state", &self.state())
            .field("cursor", &self.cursor())
            .field("sequence_len", &self.sequence_len())
            .finish()
    }
}
