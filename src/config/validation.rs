//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, interval below deadline)
//! - Check addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>

use alloy::primitives::Address;

use crate::config::schema::ClientConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.rpc.url.parse::<url::Url>() {
        errors.push(ValidationError {
            field: "rpc.url",
            message: format!("invalid URL '{}': {}", config.rpc.url, e),
        });
    }

    if config.rpc.timeout_secs == 0 {
        errors.push(ValidationError {
            field: "rpc.timeout_secs",
            message: "must be greater than 0".to_string(),
        });
    }

    if let Some(address) = &config.kettle.address {
        if let Err(e) = address.parse::<Address>() {
            errors.push(ValidationError {
                field: "kettle.address",
                message: format!("invalid address '{}': {}", address, e),
            });
        }
    }

    if config.receipts.timeout_secs == 0 {
        errors.push(ValidationError {
            field: "receipts.timeout_secs",
            message: "must be greater than 0".to_string(),
        });
    }

    if config.receipts.poll_interval_ms == 0 {
        errors.push(ValidationError {
            field: "receipts.poll_interval_ms",
            message: "must be greater than 0".to_string(),
        });
    } else if config.receipts.poll_interval_ms > config.receipts.timeout_secs * 1000 {
        errors.push(ValidationError {
            field: "receipts.poll_interval_ms",
            message: "must not exceed receipts.timeout_secs".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ClientConfig::default();
        config.rpc.url = "not a url".to_string();
        config.rpc.timeout_secs = 0;
        config.kettle.address = Some("0x1234".to_string());
        config.receipts.poll_interval_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["rpc.url", "rpc.timeout_secs", "kettle.address", "receipts.poll_interval_ms"]
        );
    }

    #[test]
    fn test_interval_longer_than_deadline() {
        let mut config = ClientConfig::default();
        config.receipts.timeout_secs = 1;
        config.receipts.poll_interval_ms = 5000;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("must not exceed"));
    }
}
