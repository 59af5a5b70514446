//! Validation infrastructure shared by configuration and component builders
//!
//! Builders and configuration values implement [`Validate`]; the helpers in this
//! module turn individual field checks into [`ValidationError`]s with the field
//! name attached so callers can report exactly which key was wrong.
//!
//! # Example
//!
//! ```
//! use qsim_core::builder::{validate_positive, ValidationResult};
//!
//! fn check_capacity(capacity: usize) -> ValidationResult<()> {
//!     validate_positive("queue_length", capacity)
//! }
//!
//! assert!(check_capacity(4).is_ok());
//! assert!(check_capacity(0).is_err());
//! ```

/// Validation result for builder configuration
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Errors that can occur during validation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Field '{field}' must be {constraint}")]
    ConstraintViolation { field: String, constraint: String },
}

/// Trait for validating configurations
///
/// Called by constructors before any thread is spawned.
pub trait Validate {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` naming the first offending field.
    fn validate(&self) -> ValidationResult<()> {
        Ok(())
    }
}

/// Helper for validating that a value is positive
pub fn validate_positive<T: PartialOrd + Default + std::fmt::Display>(
    field: &str,
    value: T,
) -> ValidationResult<()> {
    if value <= T::default() {
        Err(ValidationError::ConstraintViolation {
            field: field.to_string(),
            constraint: "positive".to_string(),
        })
    } else {
        Ok(())
    }
}

/// Helper for validating that a value is non-negative
pub fn validate_non_negative<T: PartialOrd + Default + std::fmt::Display>(
    field: &str,
    value: T,
) -> ValidationResult<()> {
    if value < T::default() {
        Err(ValidationError::ConstraintViolation {
            field: field.to_string(),
            constraint: "non-negative".to_string(),
        })
    } else {
        Ok(())
    }
}

/// Helper for validating that a number of seconds is finite
pub fn validate_finite(field: &str, value: f64) -> ValidationResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: format!("{value} is not a finite number of seconds"),
        })
    }
}

/// Helper for validating that a string is not empty
pub fn validate_non_empty(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: "cannot be empty".to_string(),
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("test", 1).is_ok());
        assert!(validate_positive("test", 0).is_err());
        assert!(validate_positive("test", -1).is_err());
        assert!(validate_positive("test", 0.5).is_ok());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("test", 1).is_ok());
        assert!(validate_non_negative("test", 0).is_ok());
        assert!(validate_non_negative("test", -1).is_err());
        assert!(validate_non_negative("test", -0.25).is_err());
    }

    #[test]
    fn test_validate_finite() {
        assert!(validate_finite("test", 2.5).is_ok());
        assert!(validate_finite("test", f64::NAN).is_err());
        assert!(validate_finite("test", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_non_empty() {
        assert!(validate_non_empty("test", "read").is_ok());
        assert!(validate_non_empty("test", "").is_err());
        assert!(validate_non_empty("test", "   ").is_err());
    }

    #[test]
    fn test_error_names_field() {
        let err = validate_positive("queue_length", 0).unwrap_err();
        assert_eq!(err.to_string(), "Field 'queue_length' must be positive");
    }
}
