//! Listings query core for a real-estate marketplace.
//!
//! Filters live in the page's query string. [`filters`] decodes them,
//! translates them to backend parameters, re-applies them to the fetched
//! rows and pages the result; [`client`], [`listings`] and [`favorites`]
//! talk to the marketplace backend.

pub mod client;
pub mod config;
pub mod error;
pub mod favorites;
pub mod filters;
pub mod listings;
pub mod models;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::ClientError;
pub use listings::{ListingsLoader, LoadOutcome, LoadedListings};
pub use models::Property;
