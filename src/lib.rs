//! RentDesk - Landlord/Tenant Rent Management Backend
//!
//! This crate keeps landlord billing entitlements synchronized with an
//! external payment provider's webhook stream and meters prepaid e-sign
//! credits through a race-free reservation ledger.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
