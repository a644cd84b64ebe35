//! Bounded-concurrency scheduler for the per-vehicle enrichment fan-out.

use std::sync::Arc;

use tracing::warn;

use crate::enrich::enrich_vehicle;
use crate::model::{EnrichedVehicle, RawVehicle};
use crate::services::transit_api::TransitApi;

/// Drives the enricher over `vehicles` in consecutive chunks of `limit`.
///
/// Members of a chunk run concurrently as spawned tasks; the next chunk
/// starts only after every member of the current one settles, so peak
/// concurrency against the upstream is deterministic. Chunking operates on
/// the full input; the no-trip-id filter lives inside the enricher.
///
/// Output order is chunk order, then input order within each chunk,
/// successes only. A task that dies is logged and skipped; the rest of its
/// chunk is kept and the cycle continues.
pub async fn enrich_all<A: TransitApi + 'static>(
    api: &Arc<A>,
    vehicles: Vec<RawVehicle>,
    service_day: &str,
    limit: usize,
) -> Vec<EnrichedVehicle> {
    let limit = limit.max(1);
    let mut enriched = Vec::with_capacity(vehicles.len());

    for chunk in vehicles.chunks(limit) {
        let mut handles = Vec::with_capacity(chunk.len());
        for vehicle in chunk {
            let api = Arc::clone(api);
            let vehicle = vehicle.clone();
            let service_day = service_day.to_string();
            handles.push(tokio::spawn(async move {
                enrich_vehicle(api.as_ref(), vehicle, &service_day).await
            }));
        }

        for handle in handles {
            match handle.await {
                Ok(Some(vehicle)) => enriched.push(vehicle),
                Ok(None) => {}
                Err(error) => {
                    warn!(error = %error, "Enrichment task died, keeping chunk partials");
                }
            }
        }
    }

    enriched
}
