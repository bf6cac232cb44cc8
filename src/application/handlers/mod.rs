//! Use-case handlers: one struct per operation, ports injected through
//! the constructor.

pub mod billing;
pub mod credits;
