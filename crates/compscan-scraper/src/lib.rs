pub mod browser;
pub mod error;
pub mod extract;
pub mod scraper;
pub mod throttle;

pub use browser::{BrowserSettings, ChromiumFetcher, PageFetcher};
pub use error::ScrapeError;
pub use extract::{Extraction, PriceExtractor, RegexPriceExtractor};
pub use scraper::PageScraper;
pub use throttle::{HostPermit, HostThrottle};
