//! Error handling for networth
//!
//! Defines the typed errors raised by the return engine and its collaborators,
//! and establishes a unified Result type using anyhow for context chaining.

use chrono::NaiveDate;
use thiserror::Error;

/// Core error types for snapshot and performance operations
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Two snapshots share a date after sorting, so periods cannot be formed.
    #[error("unordered input: more than one snapshot dated {0}")]
    UnorderedInput(NaiveDate),

    /// A NaN or infinite amount would poison every later compounded value.
    #[error("non-finite amount in snapshot dated {0}")]
    NonFiniteAmount(NaiveDate),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("pricing error: {0}")]
    PricingError(String),
}

/// Result type alias for application operations
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = TrackerError::ConfigError("flow_weight must be within [0, 1]".to_string());
        assert_eq!(
            err.to_string(),
            "config error: flow_weight must be within [0, 1]"
        );
    }

    #[test]
    fn test_unordered_input_names_the_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let err = TrackerError::UnorderedInput(date);
        assert_eq!(
            err.to_string(),
            "unordered input: more than one snapshot dated 2024-03-01"
        );
    }

    #[test]
    fn test_non_finite_amount_names_the_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            TrackerError::NonFiniteAmount(date).to_string(),
            "non-finite amount in snapshot dated 2024-03-01"
        );
    }

    #[test]
    fn test_anyhow_context_chains_errors() {
        use anyhow::Context;
        let result: Result<()> =
            Err(anyhow::anyhow!("root cause")).context("failed to load snapshots");
        match result {
            Err(e) => {
                assert!(e.to_string().contains("failed to load snapshots"));
                assert!(format!("{:?}", e).contains("root cause"));
            }
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn test_downcast_from_anyhow() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let err: anyhow::Error = TrackerError::UnorderedInput(date).into();
        assert!(matches!(
            err.downcast_ref::<TrackerError>(),
            Some(TrackerError::UnorderedInput(d)) if *d == date
        ));
    }
}
