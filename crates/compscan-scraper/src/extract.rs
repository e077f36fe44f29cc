//! Heuristic price and unit-size extraction from rendered page text.
//!
//! Extraction sits behind [`PriceExtractor`] so a smarter strategy can
//! replace the regex one without touching fetch, cache, or retry.
//!
//! [`RegexPriceExtractor`] takes the **first** dollar amount and the **first**
//! `NxM` token in document order. It does not check that the amount belongs
//! to a storage unit; promotional banners and fees can win.

use std::sync::LazyLock;

use regex::Regex;

/// `$`, optional whitespace, then either a comma-grouped or plain integer,
/// then optional cents.
static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\s*(\d{1,3}(?:,\d{3})+|\d+)(\.\d{1,2})?").expect("valid price regex")
});

/// One or two digits, `x`/`×`, one or two digits, not embedded in a longer
/// number.
static UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|\D)(\d{1,2})\s*([x×])\s*(\d{1,2})(?:\D|$)").expect("valid unit regex")
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub price: Option<f64>,
    pub unit: Option<String>,
}

pub trait PriceExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Extraction;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RegexPriceExtractor;

impl PriceExtractor for RegexPriceExtractor {
    fn extract(&self, text: &str) -> Extraction {
        Extraction {
            price: first_price(text),
            unit: first_unit(text),
        }
    }
}

fn first_price(text: &str) -> Option<f64> {
    let caps = PRICE_RE.captures(text)?;
    let whole = caps.get(1)?.as_str().replace(',', "");
    let cents = caps.get(2).map_or("", |m| m.as_str());
    format!("{whole}{cents}").parse().ok()
}

fn first_unit(text: &str) -> Option<String> {
    let caps = UNIT_RE.captures(text)?;
    Some(format!(
        "{}{}{}",
        caps.get(1)?.as_str(),
        caps.get(2)?.as_str(),
        caps.get(3)?.as_str()
    ))
}
