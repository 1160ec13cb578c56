//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and parseable strings (URL, chain, gas price)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use crate::common::{is_negative, parse_decimal, ChainId};
use crate::config::schema::ClientConfig;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.node.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "node.url",
            format!("unsupported scheme {:?}", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("node.url", e.to_string())),
    }

    if config.node.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("node.rpc_timeout_secs", "must be greater than zero"));
    }

    if let Err(e) = config.chain.parse::<ChainId>() {
        errors.push(ValidationError::new("chain", e.to_string()));
    }

    match parse_decimal(&config.transfer.gas_price) {
        Ok(price) if is_negative(&price) => {
            errors.push(ValidationError::new("transfer.gas_price", "must not be negative"))
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::new("transfer.gas_price", e.to_string())),
    }

    if config.signing.private_key_env.is_empty() {
        errors.push(ValidationError::new("signing.private_key_env", "must not be empty"));
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
    fn test_collects_every_error() {
        let mut config = ClientConfig::default();
        config.node.url = "ws://localhost:9800".to_string();
        config.node.rpc_timeout_secs = 0;
        config.transfer.gas_price = "-2".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["node.url", "node.rpc_timeout_secs", "transfer.gas_price"]
        );
    }

    #[test]
    fn test_rejects_oversized_chain_id() {
        let mut config = ClientConfig::default();
        config.chain = u64::MAX.to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "chain");
        assert!(errors[0].to_string().contains("exceeds the maximum"));
    }
}
