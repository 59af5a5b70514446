//! Simulator configuration
//!
//! [`Config`] is an immutable value created once at startup and shared by the
//! server and the generator. It is normally loaded from the flat JSON layout
//! used by existing simulator setups:
//!
//! ```json
//! {
//!     "queue_length": 5,
//!     "rq_time_arrival": 1,
//!     "read_time": 2,
//!     "write_time": 3,
//!     "forward_time": 1,
//!     "requests_sequence": ["read", "write", "forward"]
//! }
//! ```
//!
//! Times are seconds and may be fractional. An optional `fallback_time`
//! sets the service duration of request types without a configured time.

use crate::builder::{
    validate_finite, validate_non_negative, validate_positive, Validate, ValidationError,
    ValidationResult,
};
use crate::error::ConfigError;
use crate::request::RequestType;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Service duration used for request types with no configured time
pub const DEFAULT_FALLBACK_DURATION: Duration = Duration::from_secs(1);

/// Service duration per request type, with a fallback for unmapped types
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceTable {
    durations: HashMap<RequestType, Duration>,
    fallback: Duration,
}

impl ServiceTable {
    /// Empty table: every type is served with `fallback`
    pub fn new(fallback: Duration) -> Self {
        Self {
            durations: HashMap::new(),
            fallback,
        }
    }

    /// Set the duration for one request type
    pub fn with(mut self, request_type: RequestType, duration: Duration) -> Self {
        self.durations.insert(request_type, duration);
        self
    }

    /// Service duration for `request_type`, or the fallback if unmapped
    pub fn duration_for(&self, request_type: &RequestType) -> Duration {
        self.durations
            .get(request_type)
            .copied()
            .unwrap_or(self.fallback)
    }

    /// Whether `request_type` has its own duration
    pub fn is_mapped(&self, request_type: &RequestType) -> bool {
        self.durations.contains_key(request_type)
    }

    pub fn fallback(&self) -> Duration {
        self.fallback
    }
}

impl Default for ServiceTable {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_DURATION)
    }
}

/// Static simulator parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Maximum number of requests waiting in the queue
    pub queue_capacity: usize,
    /// Delay between successive admission attempts by the generator
    pub arrival_interval: Duration,
    /// Service duration per request type
    pub service: ServiceTable,
    /// Request types replayed, in order, by each generator run
    pub request_sequence: Vec<RequestType>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            queue_capacity: 5,
            arrival_interval: Duration::from_secs(1),
            service: ServiceTable::default()
                .with(RequestType::Read, Duration::from_secs(2))
                .with(RequestType::Write, Duration::from_secs(3))
                .with(RequestType::Forward, Duration::from_secs(1)),
            request_sequence: vec![
                RequestType::Read,
                RequestType::Write,
                RequestType::Forward,
                RequestType::Read,
                RequestType::Read,
                RequestType::Write,
                RequestType::Forward,
                RequestType::Forward,
            ],
        }
    }
}

impl Config {
    /// Create a config with the given capacity and default timings
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            queue_capacity,
            ..Default::default()
        }
    }

    /// Set the pacing interval between admissions
    pub fn with_arrival_interval(mut self, interval: Duration) -> Self {
        self.arrival_interval = interval;
        self
    }

    /// Replace the service table
    pub fn with_service(mut self, service: ServiceTable) -> Self {
        self.service = service;
        self
    }

    /// Replace the request sequence
    pub fn with_sequence<I, T>(mut self, sequence: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RequestType>,
    {
        self.request_sequence = sequence.into_iter().map(Into::into).collect();
        self
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(json)?;
        let config = Config::try_from(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

impl Validate for Config {
    fn validate(&self) -> ValidationResult<()> {
        validate_positive("queue_length", self.queue_capacity)
    }
}

/// On-disk layout of the configuration
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(alias = "queue_capacity")]
    queue_length: i64,
    #[serde(alias = "arrival_interval")]
    rq_time_arrival: f64,
    read_time: f64,
    write_time: f64,
    forward_time: f64,
    #[serde(default)]
    fallback_time: Option<f64>,
    #[serde(alias = "request_sequence")]
    requests_sequence: Vec<RequestType>,
}

fn seconds(field: &str, value: f64) -> ValidationResult<Duration> {
    validate_finite(field, value)?;
    validate_non_negative(field, value)?;
    Duration::try_from_secs_f64(value).map_err(|err| ValidationError::InvalidValue {
        field: field.to_string(),
        reason: err.to_string(),
    })
}

impl TryFrom<ConfigFile> for Config {
    type Error = ValidationError;

    fn try_from(file: ConfigFile) -> ValidationResult<Self> {
        validate_positive("queue_length", file.queue_length)?;
        let queue_capacity =
            usize::try_from(file.queue_length).map_err(|err| ValidationError::InvalidValue {
                field: "queue_length".to_string(),
                reason: err.to_string(),
            })?;

        let fallback = match file.fallback_time {
            Some(secs) => seconds("fallback_time", secs)?,
            None => DEFAULT_FALLBACK_DURATION,
        };
        let service = ServiceTable::new(fallback)
            .with(RequestType::Read, seconds("read_time", file.read_time)?)
            .with(RequestType::Write, seconds("write_time", file.write_time)?)
            .with(
                RequestType::Forward,
                seconds("forward_time", file.forward_time)?,
            );

        Ok(Config {
            queue_capacity,
            arrival_interval: seconds("rq_time_arrival", file.rq_time_arrival)?,
            service,
            request_sequence: file.requests_sequence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "queue_length": 3,
        "rq_time_arrival": 0.5,
        "read_time": 2,
        "write_time": 3,
        "forward_time": 1.25,
        "requests_sequence": ["read", "Write", "FORWARD", "ping"]
    }"#;

    #[test]
    fn test_parse_flat_layout() {
        let config = Config::from_json_str(SAMPLE).unwrap();
        assert_eq!(config.queue_capacity, 3);
        assert_eq!(config.arrival_interval, Duration::from_millis(500));
        assert_eq!(
            config.service.duration_for(&RequestType::Read),
            Duration::from_secs(2)
        );
        assert_eq!(
            config.service.duration_for(&RequestType::Forward),
            Duration::from_millis(1250)
        );
        assert_eq!(
            config.request_sequence,
            vec![
                RequestType::Read,
                RequestType::Write,
                RequestType::Forward,
                RequestType::Other("ping".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_type_uses_fallback() {
        let config = Config::from_json_str(SAMPLE).unwrap();
        let ping = RequestType::from("ping");
        assert!(!config.service.is_mapped(&ping));
        assert_eq!(config.service.duration_for(&ping), DEFAULT_FALLBACK_DURATION);
    }

    #[test]
    fn test_custom_fallback_time() {
        let json = r#"{
            "queue_length": 1, "rq_time_arrival": 0, "read_time": 1,
            "write_time": 1, "forward_time": 1, "fallback_time": 0.2,
            "requests_sequence": []
        }"#;
        let config = Config::from_json_str(json).unwrap();
        assert_eq!(config.service.fallback(), Duration::from_millis(200));
        assert!(config.request_sequence.is_empty());
    }

    #[test]
    fn test_descriptive_aliases() {
        let json = r#"{
            "queue_capacity": 2, "arrival_interval": 0, "read_time": 1,
            "write_time": 1, "forward_time": 1,
            "request_sequence": ["read"]
        }"#;
        let config = Config::from_json_str(json).unwrap();
        assert_eq!(config.queue_capacity, 2);
        assert_eq!(config.arrival_interval, Duration::ZERO);
    }

    #[test]
    fn test_rejects_non_positive_capacity() {
        let json = SAMPLE.replace("\"queue_length\": 3", "\"queue_length\": 0");
        let err = Config::from_json_str(&json).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");

        let json = SAMPLE.replace("\"queue_length\": 3", "\"queue_length\": -4");
        assert!(matches!(
            Config::from_json_str(&json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_negative_times() {
        let json = SAMPLE.replace("\"read_time\": 2", "\"read_time\": -2");
        match Config::from_json_str(&json) {
            Err(ConfigError::Invalid(ValidationError::ConstraintViolation { field, .. })) => {
                assert_eq!(field, "read_time")
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let json = SAMPLE.replace("\"rq_time_arrival\": 0.5", "\"rq_time_arrival\": -1");
        assert!(Config::from_json_str(&json).is_err());
    }

    #[test]
    fn test_missing_key_is_parse_error() {
        let json = r#"{ "queue_length": 2, "read_time": 1 }"#;
        assert!(matches!(
            Config::from_json_str(json),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_builder_style_construction() {
        let config = Config::new(2)
            .with_arrival_interval(Duration::ZERO)
            .with_sequence(["read", "write", "forward"]);
        assert!(config.validate().is_ok());
        assert_eq!(config.request_sequence.len(), 3);
        assert!(Config::new(0).validate().is_err());
    }
}
