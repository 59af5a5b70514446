//! Request types and the records that travel through the queue
//!
//! A [`RequestRecord`] carries its [`RequestType`] explicitly next to the
//! generated name, so the worker never has to recover the type from the name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of request admitted to the server
///
/// Names are matched case-insensitively. Anything other than the three known
/// kinds is kept as [`RequestType::Other`] (lowercased) and served with the
/// fallback duration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestType {
    Read,
    Write,
    Forward,
    Other(String),
}

impl RequestType {
    /// Lowercase name of this request type
    pub fn as_str(&self) -> &str {
        match self {
            RequestType::Read => "read",
            RequestType::Write => "write",
            RequestType::Forward => "forward",
            RequestType::Other(name) => name,
        }
    }

    /// Whether this is one of the built-in request kinds
    pub fn is_known(&self) -> bool {
        !matches!(self, RequestType::Other(_))
    }

    /// Name prefix used for request identifiers: first letter uppercase, rest lowercase
    pub fn display_prefix(&self) -> String {
        let mut chars = self.as_str().chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        }
    }
}

impl From<&str> for RequestType {
    fn from(name: &str) -> Self {
        let normalized = name.trim().to_lowercase();
        match normalized.as_str() {
            "read" => RequestType::Read,
            "write" => RequestType::Write,
            "forward" => RequestType::Forward,
            _ => RequestType::Other(normalized),
        }
    }
}

impl From<String> for RequestType {
    fn from(name: String) -> Self {
        RequestType::from(name.as_str())
    }
}

impl From<RequestType> for String {
    fn from(request_type: RequestType) -> Self {
        match request_type {
            RequestType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for RequestType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RequestType::from(s))
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request that has been named and offered to the queue
///
/// Immutable once created; the name is unique for the lifetime of the server
/// that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestRecord {
    name: String,
    request_type: RequestType,
}

impl RequestRecord {
    pub fn new(name: impl Into<String>, request_type: RequestType) -> Self {
        Self {
            name: name.into(),
            request_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn request_type(&self) -> &RequestType {
        &self.request_type
    }
}

impl fmt::Display for RequestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.request_type)
    }
}
