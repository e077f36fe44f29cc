//! Median-based price recommendation.

use serde::Deserialize;
use thiserror::Error;

use crate::models::PriceSuggestion;

/// Fraction the recommendation undercuts the competitor median by.
pub const UNDERCUT: f64 = 0.06;

/// Fixed confidence attached to every suggestion. Not derived from sample
/// size or spread.
pub const CONFIDENCE: f64 = 0.6;

#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    #[error("no numeric competitor prices available")]
    InsufficientData,
}

/// A competitor row as submitted for a suggestion. Only `price` is read; a
/// `null`, string, or other non-numeric value contributes nothing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompetitorPrice {
    #[serde(default)]
    pub price: serde_json::Value,
}

/// Numeric prices from `rows`, in order, skipping non-numeric entries.
#[must_use]
pub fn numeric_prices(rows: &[CompetitorPrice]) -> Vec<f64> {
    rows.iter().filter_map(|row| row.price.as_f64()).collect()
}

/// Statistical median. `None` for an empty slice.
#[must_use]
pub fn median(prices: &[f64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    let mut sorted = prices.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Derives a recommended price from competitor prices.
///
/// Non-finite values are ignored.
///
/// # Errors
///
/// Returns [`PricingError::InsufficientData`] when no finite price remains.
pub fn suggest(competitor_prices: &[f64]) -> Result<PriceSuggestion, PricingError> {
    let usable: Vec<f64> = competitor_prices
        .iter()
        .copied()
        .filter(|p| p.is_finite())
        .collect();
    let median = median(&usable).ok_or(PricingError::InsufficientData)?;
    let recommended_price = round_cents(median * (1.0 - UNDERCUT));

    Ok(PriceSuggestion {
        recommended_price,
        rationale: format!(
            "Median competitor price is ${median:.2} across {} competitors; recommending {:.0}% below the median to stay competitive.",
            usable.len(),
            UNDERCUT * 100.0
        ),
        confidence: CONFIDENCE,
    })
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
