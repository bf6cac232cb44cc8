//! Domain layer. No I/O except through the port traits.

pub mod billing;
pub mod credits;
pub mod foundation;
