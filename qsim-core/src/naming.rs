//! Per-type request naming
//!
//! Every admission attempt, accepted or rejected, consumes the next number of
//! its type's counter, so the names issued for a type are always
//! `Type1, Type2, ...` without gaps.

use crate::request::{RequestRecord, RequestType};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Issues unique request names from per-type monotonic counters
#[derive(Debug, Default)]
pub struct RequestNamer {
    counters: Mutex<HashMap<RequestType, u64>>,
}

impl RequestNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the counter for `request_type` and return the new name
    pub fn next(&self, request_type: &RequestType) -> String {
        let number = {
            let mut counters = self.counters.lock();
            let counter = counters.entry(request_type.clone()).or_insert(0);
            *counter += 1;
            *counter
        };
        format!("{}{}", request_type.display_prefix(), number)
    }

    /// Name a new record of the given type
    pub fn next_record(&self, request_type: RequestType) -> RequestRecord {
        let name = self.next(&request_type);
        RequestRecord::new(name, request_type)
    }

    /// How many names have been issued for `request_type`
    pub fn issued(&self, request_type: &RequestType) -> u64 {
        self.counters
            .lock()
            .get(request_type)
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_counters_start_at_one_per_type() {
        let namer = RequestNamer::new();
        assert_eq!(namer.next(&RequestType::Read), "Read1");
        assert_eq!(namer.next(&RequestType::Write), "Write1");
        assert_eq!(namer.next(&RequestType::Read), "Read2");
        assert_eq!(namer.next(&RequestType::from("ping")), "Ping1");
        assert_eq!(namer.issued(&RequestType::Read), 2);
        assert_eq!(namer.issued(&RequestType::Forward), 0);
    }

    #[test]
    fn test_case_variants_share_a_counter() {
        let namer = RequestNamer::new();
        assert_eq!(namer.next(&RequestType::from("PING")), "Ping1");
        assert_eq!(namer.next(&RequestType::from("ping")), "Ping2");
    }

    #[test]
    fn test_next_record_carries_type() {
        let namer = RequestNamer::new();
        let record = namer.next_record(RequestType::Forward);
        assert_eq!(record.name(), "Forward1");
        assert_eq!(record.request_type(), &RequestType::Forward);
    }

    #[test]
    fn test_concurrent_names_are_unique_and_gap_free() {
        let namer = Arc::new(RequestNamer::new());
        let threads = 8;
        let per_thread = 250;

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let namer = Arc::clone(&namer);
                thread::spawn(move || {
                    (0..per_thread)
                        .map(|_| namer.next(&RequestType::Write))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let names: HashSet<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();

        let total = threads * per_thread;
        assert_eq!(names.len(), total);
        let expected: HashSet<String> = (1..=total).map(|i| format!("Write{i}")).collect();
        assert_eq!(names, expected);
    }
}
