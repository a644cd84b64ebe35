//! Per-vehicle enrichment: position report + trip detail → one compact
//! output record.

use tracing::warn;

use crate::model::{EnrichedVehicle, RawVehicle, StopSummary, StopTime, TripDetail};
use crate::services::transit_api::TransitApi;

/// Enriches one vehicle with schedule detail.
///
/// Returns `None` only for vehicles without a trip identifier; they have
/// no stable identity for the front end and are dropped before the
/// snapshot. Every failure past that point degrades the record instead of
/// dropping it: a failed detail fetch merges against the empty sentinel.
pub async fn enrich_vehicle<A: TransitApi + ?Sized>(
    api: &A,
    vehicle: RawVehicle,
    service_day: &str,
) -> Option<EnrichedVehicle> {
    let RawVehicle {
        lat,
        lon,
        speed,
        heading,
        trip,
        ..
    } = vehicle;

    let trip = trip?;
    let trip_id = trip
        .gtfs_id
        .as_deref()
        .filter(|id| !id.is_empty())?
        .to_string();

    let detail = match api.fetch_trip_detail(&trip_id, service_day).await {
        Ok(detail) => detail,
        Err(error) => {
            warn!(trip_id = %trip_id, error = %error, "Trip detail fetch failed, emitting bare position");
            TripDetail::default()
        }
    };

    let route_long_name = detail
        .route
        .as_ref()
        .and_then(|r| r.long_name.as_deref());

    Some(EnrichedVehicle {
        id: trip_id,
        name: display_name(route_long_name, trip.trip_short_name.as_deref()),
        headsgn: trip.trip_headsign,
        lat,
        lon,
        sp: speed,
        hd: heading,
        mode: trip.route.and_then(|r| r.mode),
        stops: compact_stops(detail.stoptimes),
    })
}

/// Short route long-names are line brand codes worth surfacing; longer
/// ones would clutter the label.
fn display_name(route_long_name: Option<&str>, trip_short_name: Option<&str>) -> Option<String> {
    match route_long_name {
        Some(long) if !long.is_empty() && long.chars().count() < 6 => Some(format!(
            "[{long}] {}",
            trip_short_name.unwrap_or_default()
        )),
        _ => trip_short_name.map(str::to_string),
    }
}

fn compact_stops(stoptimes: Vec<StopTime>) -> Vec<StopSummary> {
    stoptimes
        .into_iter()
        .map(|st| {
            let stop = st.stop.unwrap_or_default();
            StopSummary {
                name: stop.name,
                ra: st.realtime_arrival,
                rd: st.realtime_departure,
                sa: st.scheduled_arrival,
                sd: st.scheduled_departure,
                a: st.arrival_delay,
                d: st.departure_delay,
                v: stop.platform_code,
            }
        })
        .collect()
}
