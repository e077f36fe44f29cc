//! Competitor scan orchestration.
//!
//! [`Scanner`] ties the places resolvers and the page scraper together:
//! resolve the facility location, search for nearby candidates, then
//! resolve and scrape each candidate into a [`compscan_core::CompetitorRecord`].

pub mod error;
pub mod scanner;

pub use error::ScanError;
pub use scanner::{Scanner, DEFAULT_RADIUS_MILES};
