use std::sync::Arc;

use serde::Serialize;

use compscan_core::{CompetitorRecord, TtlCache};
use compscan_pipeline::Scanner;

/// Output shape of `compscan scan`; feeds straight into `compscan suggest`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScanOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility_name: Option<String>,
    pub competitors: Vec<CompetitorRecord>,
}

pub(crate) async fn run_scan(
    address: &str,
    radius: f64,
    facility_name: Option<String>,
) -> anyhow::Result<()> {
    let config = compscan_core::load_app_config()?;
    let scanner = Scanner::from_config(&config, Arc::new(TtlCache::new()))?;

    let competitors = scanner.scan(address, radius).await?;
    let priced = competitors.iter().filter(|c| c.price.is_some()).count();
    tracing::info!(competitors = competitors.len(), priced, "scan finished");

    let output = ScanOutput {
        facility_name,
        competitors,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
