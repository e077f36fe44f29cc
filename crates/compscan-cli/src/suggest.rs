use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use compscan_core::{numeric_prices, CompetitorPrice, PriceSuggestion};

/// Accepts either the `compscan scan` output object or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CompetitorFile {
    Wrapped { competitors: Vec<CompetitorPrice> },
    Bare(Vec<CompetitorPrice>),
}

pub(crate) fn parse_competitors(contents: &str) -> anyhow::Result<Vec<CompetitorPrice>> {
    let file: CompetitorFile = serde_json::from_str(contents)
        .context("expected {\"competitors\": [...]} or a JSON array of competitors")?;
    Ok(match file {
        CompetitorFile::Wrapped { competitors } | CompetitorFile::Bare(competitors) => competitors,
    })
}

pub(crate) fn suggest_from_str(contents: &str) -> anyhow::Result<PriceSuggestion> {
    let competitors = parse_competitors(contents)?;
    let prices = numeric_prices(&competitors);
    tracing::debug!(
        competitors = competitors.len(),
        usable_prices = prices.len(),
        "computing price suggestion"
    );
    Ok(compscan_core::suggest(&prices)?)
}

pub(crate) fn run_suggest(path: &Path) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let suggestion = suggest_from_str(&contents)
        .with_context(|| format!("failed to suggest a price from {}", path.display()))?;
    println!("{}", serde_json::to_string_pretty(&suggestion)?);
    Ok(())
}
