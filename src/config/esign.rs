//! E-signature provider configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// E-signature provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EsignConfig {
    /// Provider API base URL
    pub base_url: String,

    /// Provider API key
    pub api_key: SecretString,

    /// Bound on a single envelope call; every call is paid, so a hung
    /// request must release its credit reservation promptly
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,
}

impl EsignConfig {
    /// Get the call timeout as Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Validate e-sign configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("ESIGN_API_KEY"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidEsignUrl);
        }
        if self.call_timeout_secs == 0 || self.call_timeout_secs > 120 {
            return Err(ValidationError::InvalidEsignTimeout);
        }
        Ok(())
    }
}

fn default_call_timeout() -> u64 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str, timeout: u64) -> EsignConfig {
        EsignConfig {
            base_url: base_url.to_string(),
            api_key: SecretString::new("esk_test".to_string()),
            call_timeout_secs: timeout,
        }
    }

    #[test]
    fn test_call_timeout_duration() {
        assert_eq!(
            config("https://esign.example.com", 20).call_timeout(),
            Duration::from_secs(20)
        );
    }

    #[test]
    fn test_validation_invalid_url() {
        assert!(config("esign.example.com", 20).validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        assert!(config("https://esign.example.com", 0).validate().is_err());
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(config("https://esign.example.com", 20).validate().is_ok());
    }
}
