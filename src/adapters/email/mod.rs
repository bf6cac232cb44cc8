//! Email adapter for the notifier port.

mod resend_notifier;

pub use resend_notifier::ResendNotifier;
