use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use compscan_core::CompetitorRecord;
use compscan_pipeline::{ScanError, DEFAULT_RADIUS_MILES};

use crate::middleware::RequestId;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ScanRequest {
    #[serde(default)]
    pub facility_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Search radius in miles.
    #[serde(default)]
    pub radius: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(super) struct ScanResponse {
    competitors: Vec<CompetitorRecord>,
}

pub(super) async fn scan(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        tracing::warn!(request_id = %req_id.0, error = %e, "rejected malformed scan request");
        ApiError::new(req_id.0.clone(), "bad_request", e.body_text())
    })?;

    let Some(address) = request.address.as_deref().map(str::trim).filter(|a| !a.is_empty()) else {
        tracing::warn!(request_id = %req_id.0, "rejected scan request without address");
        return Err(ApiError::new(req_id.0, "validation_error", "address is required"));
    };

    let radius = request.radius.unwrap_or(DEFAULT_RADIUS_MILES);
    if !radius.is_finite() || radius <= 0.0 {
        tracing::warn!(
            request_id = %req_id.0,
            radius,
            "rejected scan request with invalid radius"
        );
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "radius must be a positive number of miles",
        ));
    }

    tracing::info!(
        facility = request.facility_name.as_deref().unwrap_or("unnamed"),
        address,
        radius,
        "scan requested"
    );

    let competitors = state
        .scanner
        .scan(address, radius)
        .await
        .map_err(|e| map_scan_error(req_id.0, &e))?;

    Ok(Json(ScanResponse { competitors }))
}

fn map_scan_error(request_id: String, error: &ScanError) -> ApiError {
    tracing::error!(request_id = %request_id, error = %error, "competitor scan failed");
    if error.is_unresolvable_address() {
        ApiError::new(request_id, "bad_request", error.to_string())
    } else {
        ApiError::new(request_id, "upstream_error", error.to_string())
    }
}
