//! Payment configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Payment provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Provider API key
    pub api_key: SecretString,

    /// Webhook signing secret
    pub webhook_secret: SecretString,

    /// Provider API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Price id for the platform subscription
    pub subscription_price_id: String,

    /// Price id for one e-sign credit unit
    pub credit_unit_price_id: String,

    /// Promotional trial length granted at provisioning; 0 disables trials
    #[serde(default = "default_trial_days")]
    pub trial_days: i64,
}

impl PaymentConfig {
    /// Check if using the provider's test mode
    pub fn is_test_mode(&self) -> bool {
        self.api_key.expose_secret().starts_with("sk_test_")
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT_API_KEY"));
        }
        if self.webhook_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT_WEBHOOK_SECRET"));
        }

        // Verify key prefixes for safety
        if !self.api_key.expose_secret().starts_with("sk_") {
            return Err(ValidationError::InvalidPaymentKey);
        }
        if !self.webhook_secret.expose_secret().starts_with("whsec_") {
            return Err(ValidationError::InvalidWebhookSecret);
        }

        if self.subscription_price_id.is_empty() {
            return Err(ValidationError::MissingRequired("SUBSCRIPTION_PRICE_ID"));
        }
        if self.credit_unit_price_id.is_empty() {
            return Err(ValidationError::MissingRequired("CREDIT_UNIT_PRICE_ID"));
        }
        if !(0..=365).contains(&self.trial_days) {
            return Err(ValidationError::InvalidTrialDays);
        }

        Ok(())
    }
}

fn default_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_trial_days() -> i64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: &str, webhook_secret: &str) -> PaymentConfig {
        PaymentConfig {
            api_key: SecretString::new(api_key.to_string()),
            webhook_secret: SecretString::new(webhook_secret.to_string()),
            base_url: default_base_url(),
            subscription_price_id: "price_sub".to_string(),
            credit_unit_price_id: "price_credit".to_string(),
            trial_days: 30,
        }
    }

    #[test]
    fn test_is_test_mode() {
        assert!(config("sk_test_xxx", "whsec_xxx").is_test_mode());
        assert!(!config("sk_live_xxx", "whsec_xxx").is_test_mode());
    }

    #[test]
    fn test_validation_missing_api_key() {
        assert!(config("", "whsec_xxx").validate().is_err());
    }

    #[test]
    fn test_validation_invalid_api_key_prefix() {
        assert!(config("pk_test_xxx", "whsec_xxx").validate().is_err());
    }

    #[test]
    fn test_validation_invalid_webhook_secret_prefix() {
        assert!(config("sk_test_xxx", "secret_xxx").validate().is_err());
    }

    #[test]
    fn test_validation_invalid_trial_days() {
        let mut cfg = config("sk_test_xxx", "whsec_xxx");
        cfg.trial_days = -1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(config("sk_test_abcd1234", "whsec_xyz789").validate().is_ok());
    }
}
