use compscan_places::PlacesError;
use thiserror::Error;

/// Failures that abort a whole scan.
///
/// Per-candidate failures never surface here; they are recorded on the
/// affected `CompetitorRecord` instead.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The facility address could not be turned into a coordinate.
    #[error("location lookup failed: {0}")]
    Location(#[source] PlacesError),

    /// The nearby-candidate search failed.
    #[error("nearby search failed: {0}")]
    Search(#[source] PlacesError),

    /// The scanner could not be assembled from configuration.
    #[error("scanner setup failed: {0}")]
    Setup(#[source] PlacesError),
}

impl ScanError {
    /// `true` when the caller supplied an address the provider could not
    /// resolve, as opposed to the provider itself failing.
    #[must_use]
    pub fn is_unresolvable_address(&self) -> bool {
        matches!(self, ScanError::Location(PlacesError::Resolution { .. }))
    }
}
