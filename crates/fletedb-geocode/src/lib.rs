//! Client for the address geocoding collaborator.
//!
//! Speaks the Google Geocoding JSON API: one free-text address in, the first
//! candidate's coordinates out. There are no retries; every failure is
//! reported to the caller as-is.

pub mod client;
pub mod error;
pub mod types;

pub use client::GeocodingClient;
pub use error::GeocodeError;
pub use types::GeocodedAddress;
