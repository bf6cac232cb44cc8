//! E-signature adapter for the esign provider port.

mod http_provider;

pub use http_provider::HttpEsignProvider;
