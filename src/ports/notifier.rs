//! Outbound notification port.
//!
//! Fire-and-forget sink: callers spawn the send as a detached task whose
//! failure is logged but never blocks or rolls back the operation that
//! triggered it.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// A notification to a landlord.
#[derive(Debug, Clone)]
pub struct Notification {
    pub to_email: String,
    pub subject: String,
    pub body: String,
}

/// Port for the outbound email sender.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends a single notification.
    async fn send(&self, notification: Notification) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifier_is_object_safe() {
        fn _accepts_dyn(_notifier: &dyn Notifier) {}
    }
}
