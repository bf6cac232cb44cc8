//! Adapters: concrete implementations of the ports.

pub mod email;
pub mod esign;
pub mod http;
pub mod postgres;
pub mod stripe;
