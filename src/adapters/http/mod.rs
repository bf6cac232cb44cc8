//! HTTP adapters: Axum routers, handlers, and DTOs.

pub mod billing;
pub mod esign;
mod error;

pub use error::{ApiError, ErrorResponse};
