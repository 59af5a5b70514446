//! Bounded FIFO request queue shared by the admission path and the worker
//!
//! Admission never blocks: [`BoundedRequestQueue::try_enqueue`] either appends
//! or reports [`QueueError::Full`] without touching the queue (drop-on-full).
//! Removal waits on a condition variable for at most the given timeout so the
//! worker can periodically re-check whether it should keep running.

use crate::error::QueueError;
use parking_lot::{Condvar, Mutex};
use qsim_core::RequestRecord;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct QueueState {
    items: VecDeque<RequestRecord>,
    total_enqueued: u64,
    total_dequeued: u64,
}

/// Fixed-capacity FIFO of admitted requests
///
/// The length check and the append happen under the same lock, so no
/// observer ever sees more than `capacity` items.
///
/// # Examples
///
/// ```
/// use qsim_components::queue::BoundedRequestQueue;
/// use qsim_core::{RequestRecord, RequestType};
/// use std::time::Duration;
///
/// let queue = BoundedRequestQueue::new(1);
/// queue.try_enqueue(RequestRecord::new("Read1", RequestType::Read)).unwrap();
/// assert!(queue.try_enqueue(RequestRecord::new("Read2", RequestType::Read)).is_err());
///
/// let next = queue.dequeue_wait(Duration::from_millis(10)).unwrap();
/// assert_eq!(next.name(), "Read1");
/// ```
#[derive(Debug)]
pub struct BoundedRequestQueue {
    state: Mutex<QueueState>,
    available: Condvar,
    capacity: usize,
}

impl BoundedRequestQueue {
    /// Create a queue holding at most `capacity` requests
    ///
    /// A zero-capacity queue is permanently full and rejects every request.
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                ..Default::default()
            }),
            available: Condvar::new(),
            capacity,
        }
    }

    /// Append `record` if there is room
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Full` when the queue is at capacity; the record is
    /// not stored.
    pub fn try_enqueue(&self, record: RequestRecord) -> Result<(), QueueError> {
        let mut state = self.state.lock();
        if state.items.len() >= self.capacity {
            return Err(QueueError::Full {
                capacity: self.capacity,
            });
        }
        state.items.push_back(record);
        state.total_enqueued += 1;
        drop(state);

        self.available.notify_one();
        Ok(())
    }

    /// Remove the oldest request, waiting up to `timeout` for one to arrive
    ///
    /// Returns `None` if the queue stayed empty for the whole timeout.
    pub fn dequeue_wait(&self, timeout: Duration) -> Option<RequestRecord> {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.state.lock();
        loop {
            if let Some(record) = state.items.pop_front() {
                state.total_dequeued += 1;
                return Some(record);
            }
            match deadline {
                Some(deadline) => {
                    if self.available.wait_until(&mut state, deadline).timed_out() {
                        let record = state.items.pop_front();
                        if record.is_some() {
                            state.total_dequeued += 1;
                        }
                        return record;
                    }
                }
                None => self.available.wait(&mut state),
            }
        }
    }

    /// Point-in-time copy of the queued requests, oldest first
    pub fn snapshot(&self) -> Vec<RequestRecord> {
        self.state.lock().items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current depth as a fraction of capacity; 1.0 for a zero-capacity queue
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            return 1.0;
        }
        self.len() as f64 / self.capacity as f64
    }

    /// Total number of requests ever accepted
    pub fn total_enqueued(&self) -> u64 {
        self.state.lock().total_enqueued
    }

    /// Total number of requests ever removed
    pub fn total_dequeued(&self) -> u64 {
        self.state.lock().total_dequeued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsim_core::RequestType;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    fn record(name: &str) -> RequestRecord {
        RequestRecord::new(name, RequestType::from(name.trim_end_matches(char::is_numeric)))
    }

    #[test]
    fn test_fifo_order() {
        let queue = BoundedRequestQueue::new(4);
        assert!(queue.is_empty());

        queue.try_enqueue(record("Read1")).unwrap();
        queue.try_enqueue(record("Write1")).unwrap();
        queue.try_enqueue(record("Read2")).unwrap();
        assert_eq!(queue.len(), 3);

        let timeout = Duration::from_millis(10);
        assert_eq!(queue.dequeue_wait(timeout).unwrap().name(), "Read1");
        assert_eq!(queue.dequeue_wait(timeout).unwrap().name(), "Write1");
        assert_eq!(queue.dequeue_wait(timeout).unwrap().name(), "Read2");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drop_on_full() {
        let queue = BoundedRequestQueue::new(2);
        queue.try_enqueue(record("Read1")).unwrap();
        queue.try_enqueue(record("Write1")).unwrap();
        assert!(queue.is_full());

        let result = queue.try_enqueue(record("Forward1"));
        assert_eq!(result, Err(QueueError::Full { capacity: 2 }));
        let names: Vec<_> = queue.snapshot().iter().map(|r| r.name().to_string()).collect();
        assert_eq!(names, vec!["Read1", "Write1"]);

        // Room again after a removal.
        queue.dequeue_wait(Duration::ZERO);
        assert!(!queue.is_full());
        queue.try_enqueue(record("Forward2")).unwrap();
    }

    #[test]
    fn test_dequeue_times_out_when_empty() {
        let queue = BoundedRequestQueue::new(1);
        let started = Instant::now();
        assert!(queue.dequeue_wait(Duration::from_millis(50)).is_none());
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert!(queue.dequeue_wait(Duration::ZERO).is_none());
    }

    #[test]
    fn test_dequeue_wakes_on_enqueue() {
        let queue = Arc::new(BoundedRequestQueue::new(1));
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.dequeue_wait(Duration::from_secs(5)))
        };

        thread::sleep(Duration::from_millis(20));
        let started = Instant::now();
        queue.try_enqueue(record("Write1")).unwrap();

        let received = consumer.join().unwrap().unwrap();
        assert_eq!(received.name(), "Write1");
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_snapshot_is_not_live() {
        let queue = BoundedRequestQueue::new(3);
        queue.try_enqueue(record("Read1")).unwrap();
        let snapshot = queue.snapshot();
        queue.try_enqueue(record("Read2")).unwrap();
        queue.dequeue_wait(Duration::ZERO);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name(), "Read1");
    }

    #[test]
    fn test_counters_and_utilization() {
        let queue = BoundedRequestQueue::new(4);
        assert_eq!(queue.utilization(), 0.0);
        queue.try_enqueue(record("Read1")).unwrap();
        queue.try_enqueue(record("Read2")).unwrap();
        assert_eq!(queue.utilization(), 0.5);
        queue.dequeue_wait(Duration::ZERO);
        assert_eq!(queue.total_enqueued(), 2);
        assert_eq!(queue.total_dequeued(), 1);
        assert_eq!(queue.capacity(), 4);
    }

    #[test]
    fn test_zero_capacity_rejects_everything() {
        let queue = BoundedRequestQueue::new(0);
        assert!(queue.is_full());
        assert_eq!(queue.utilization(), 1.0);
        assert_eq!(
            queue.try_enqueue(record("Read1")),
            Err(QueueError::Full { capacity: 0 })
        );
        assert!(queue.is_empty());
        assert_eq!(queue.total_enqueued(), 0);
    }

    #[test]
    fn test_capacity_holds_under_contention() {
        let capacity = 3;
        let queue = Arc::new(BoundedRequestQueue::new(capacity));
        let done = Arc::new(AtomicBool::new(false));

        let observer = {
            let queue = Arc::clone(&queue);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut max_seen = 0;
                while !done.load(Ordering::Acquire) {
                    max_seen = max_seen.max(queue.snapshot().len());
                }
                max_seen
            })
        };

        let producers: Vec<_> = (0..4)
            .map(|p| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    let mut accepted = 0;
                    for i in 0..500 {
                        if queue.try_enqueue(record(&format!("Read{}", p * 1000 + i))).is_ok() {
                            accepted += 1;
                        }
                    }
                    accepted
                })
            })
            .collect();

        let consumer = {
            let queue = Arc::clone(&queue);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut taken = 0u64;
                while !done.load(Ordering::Acquire) || !queue.is_empty() {
                    if queue.dequeue_wait(Duration::from_millis(1)).is_some() {
                        taken += 1;
                    }
                }
                taken
            })
        };

        let accepted: u64 = producers.into_iter().map(|h| h.join().unwrap()).sum();
        done.store(true, Ordering::Release);
        let taken = consumer.join().unwrap();
        let max_seen = observer.join().unwrap();

        assert!(max_seen <= capacity);
        assert_eq!(accepted, taken);
        assert_eq!(queue.total_enqueued(), accepted);
    }
}
