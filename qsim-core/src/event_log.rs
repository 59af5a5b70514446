//! Append-only, timestamped event log
//!
//! The log is shared by the admission path and the worker; observers read the
//! most recent entries with [`EventLog::tail`] or everything after a known
//! position with [`EventLog::since`]. Entries are never modified or reordered
//! once appended, and readers always receive copies.

use chrono::{DateTime, Local, SubsecRound};
use parking_lot::RwLock;
use std::fmt;

/// A single log line: wall-clock time (whole seconds) and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl LogEntry {
    /// Create an entry stamped with the current local time, truncated to seconds
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().trunc_subsecs(0),
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Ordered, append-only record of simulator events
#[derive(Debug, Default)]
pub struct EventLog {
    entries: RwLock<Vec<LogEntry>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message stamped with the current time
    ///
    /// Returns the index of the new entry.
    pub fn append(&self, message: impl Into<String>) -> usize {
        self.push(LogEntry::now(message))
    }

    /// Append a pre-built entry, returning its index
    pub fn push(&self, entry: LogEntry) -> usize {
        let mut entries = self.entries.write();
        entries.push(entry);
        entries.len() - 1
    }

    /// The most recent `n` entries, oldest first
    pub fn tail(&self, n: usize) -> Vec<LogEntry> {
        let entries = self.entries.read();
        let start = entries.len().saturating_sub(n);
        entries[start..].to_vec()
    }

    /// All entries appended at or after index `start`
    pub fn since(&self, start: usize) -> Vec<LogEntry> {
        let entries = self.entries.read();
        entries.get(start..).map(<[LogEntry]>::to_vec).unwrap_or_default()
    }

    /// Copy of the whole log
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.read().clone()
    }

    /// Messages only, in append order
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .read()
            .iter()
            .map(|entry| entry.message.clone())
            .collect()
    }

    /// Whether any entry's message equals `message`
    pub fn contains(&self, message: &str) -> bool {
        self.entries.read().iter().any(|entry| entry.message == message)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_append_and_tail() {
        let log = EventLog::new();
        assert!(log.is_empty());
        assert!(log.tail(5).is_empty());

        for i in 0..5 {
            assert_eq!(log.append(format!("event {i}")), i);
        }

        let tail: Vec<_> = log.tail(2).into_iter().map(|e| e.message).collect();
        assert_eq!(tail, vec!["event 3", "event 4"]);

        // Asking for more than exists returns everything.
        assert_eq!(log.tail(100).len(), 5);
        assert!(log.tail(0).is_empty());
    }

    #[test]
    fn test_since() {
        let log = EventLog::new();
        log.append("a");
        log.append("b");
        log.append("c");

        let messages: Vec<_> = log.since(1).into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["b", "c"]);
        assert!(log.since(3).is_empty());
        assert!(log.since(42).is_empty());
    }

    #[test]
    fn test_timestamp_is_truncated_to_seconds() {
        let entry = LogEntry::now("tick");
        assert_eq!(entry.timestamp.nanosecond(), 0);

        let rendered = entry.to_string();
        assert!(rendered.starts_with('['));
        assert!(rendered.ends_with("] tick"));
        // "[HH:MM:SS] tick"
        assert_eq!(rendered.len(), "[00:00:00] tick".len());
    }

    #[test]
    fn test_tail_is_a_copy() {
        let log = EventLog::new();
        log.append("first");
        let tail = log.tail(10);
        log.append("second");
        assert_eq!(tail.len(), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_concurrent_appends_keep_per_writer_order() {
        let log = Arc::new(EventLog::new());
        let writers: Vec<_> = ["admit", "serve"]
            .into_iter()
            .map(|tag| {
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    for i in 0..500 {
                        log.append(format!("{tag} {i}"));
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        assert_eq!(log.len(), 1000);
        for tag in ["admit", "serve"] {
            let seen: Vec<usize> = log
                .messages()
                .iter()
                .filter_map(|m| m.strip_prefix(tag))
                .map(|n| n.trim().parse().unwrap())
                .collect();
            assert_eq!(seen, (0..500).collect::<Vec<_>>());
        }
        assert!(log.contains("admit 0"));
        assert!(!log.contains("admit 500"));
    }
}
