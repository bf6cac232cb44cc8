//! E-sign HTTP surface: envelope creation and credit balance display.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::EsignAppState;
pub use routes::esign_routes;
