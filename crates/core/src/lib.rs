//! Parley Core - Domain entities, services, and traits.
//!
//! This crate contains the exchange log domain for Parley.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod constants;
pub mod errors;
pub mod exchanges;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
