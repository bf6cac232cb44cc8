//! Credit-consuming use cases.

mod start_envelope;

pub use start_envelope::{StartEnvelopeCommand, StartEnvelopeHandler, StartEnvelopeResult};
