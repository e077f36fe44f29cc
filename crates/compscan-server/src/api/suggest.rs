use axum::{extract::rejection::JsonRejection, Extension, Json};
use serde::Deserialize;

use compscan_core::{numeric_prices, CompetitorPrice, PriceSuggestion};

use crate::middleware::RequestId;

use super::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SuggestRequest {
    #[serde(default)]
    pub facility_name: Option<String>,
    #[serde(default)]
    pub competitors: Vec<CompetitorPrice>,
}

pub(super) async fn suggest(
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<SuggestRequest>, JsonRejection>,
) -> Result<Json<PriceSuggestion>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        tracing::warn!(request_id = %req_id.0, error = %e, "rejected malformed suggest request");
        ApiError::new(req_id.0.clone(), "bad_request", e.body_text())
    })?;

    let prices = numeric_prices(&request.competitors);
    tracing::info!(
        facility = request.facility_name.as_deref().unwrap_or("unnamed"),
        competitors = request.competitors.len(),
        usable_prices = prices.len(),
        "price suggestion requested"
    );

    compscan_core::suggest(&prices).map(Json).map_err(|e| {
        tracing::warn!(request_id = %req_id.0, error = %e, "cannot suggest a price");
        ApiError::new(req_id.0, "insufficient_data", e.to_string())
    })
}
