//! Decoders for the GraphQL response envelopes returned by the OTP backend.

use anyhow::{Result, bail};
use serde::Deserialize;

use crate::model::{RawVehicle, TripDetail};

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PositionsData {
    #[serde(default)]
    vehicle_positions: Vec<RawVehicle>,
}

#[derive(Deserialize)]
struct TripData {
    trip: Option<TripDetail>,
}

fn unwrap_data<T>(envelope: Envelope<T>) -> Result<T> {
    match envelope.data {
        Some(data) => Ok(data),
        None => {
            let detail = envelope
                .errors
                .and_then(|errs| errs.into_iter().next())
                .and_then(|e| e.message)
                .unwrap_or_else(|| "response carried no data".to_string());
            bail!("GraphQL error: {detail}");
        }
    }
}

/// Decodes a `vehiclePositions` response into position reports.
///
/// # Errors
///
/// Returns an error if the bytes are not valid JSON for the envelope, or
/// if the response carries GraphQL errors instead of data.
pub fn parse_positions(bytes: &[u8]) -> Result<Vec<RawVehicle>> {
    let envelope: Envelope<PositionsData> = serde_json::from_slice(bytes)?;
    Ok(unwrap_data(envelope)?.vehicle_positions)
}

/// Decodes a `trip` response into schedule detail.
///
/// A `null` trip (unknown id or service day) is an error here; the caller
/// decides whether that degrades or aborts.
pub fn parse_trip_detail(bytes: &[u8]) -> Result<TripDetail> {
    let envelope: Envelope<TripData> = serde_json::from_slice(bytes)?;
    match unwrap_data(envelope)?.trip {
        Some(detail) => Ok(detail),
        None => bail!("trip not found for this service day"),
    }
}
