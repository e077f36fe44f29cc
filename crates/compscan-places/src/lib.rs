pub mod client;
pub mod details;
pub mod error;
pub mod finder;
pub mod location;
pub mod types;

pub use client::PlacesClient;
pub use details::DetailResolver;
pub use error::PlacesError;
pub use finder::{radius_meters, PlaceFinder, MAX_RADIUS_METERS};
pub use location::{parse_coordinate, LocationResolver};
