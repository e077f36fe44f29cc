use compscan_core::Retriable;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} timed out after {timeout_secs}s")]
    NavigationTimeout { url: String, timeout_secs: u64 },

    #[error("browser error for {url}: {reason}")]
    Browser { url: String, reason: String },
}

/// Every browser failure is retriable; each attempt launches a fresh session.
impl Retriable for ScrapeError {
    fn is_retriable(&self) -> bool {
        match self {
            ScrapeError::Launch(_)
            | ScrapeError::NavigationTimeout { .. }
            | ScrapeError::Browser { .. } => true,
        }
    }
}
