//! One full refresh pass: fetch, enrich, assemble, publish.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::warn;

use crate::batch;
use crate::config::RefreshConfig;
use crate::model::Snapshot;
use crate::output;
use crate::services::transit_api::{TransitApi, service_day};
use crate::snapshot::SnapshotStore;
use crate::stats::CycleStats;

/// Runs a single refresh cycle against `api` and publishes the result.
///
/// A failed bulk fetch aborts the cycle with an error and leaves the
/// previous snapshot current; there is no partial data worth salvaging at
/// that point. Past the bulk fetch the cycle always publishes — an empty
/// vehicle list is a valid state, not an error.
#[tracing::instrument(skip_all)]
pub async fn run_cycle<A: TransitApi + 'static>(
    api: &Arc<A>,
    config: &RefreshConfig,
    store: &SnapshotStore,
) -> Result<CycleStats> {
    let started = Instant::now();
    let day = service_day();

    let vehicles = api
        .fetch_positions()
        .await
        .context("bulk position fetch failed")?;
    let fetched = vehicles.len();

    let enriched = batch::enrich_all(api, vehicles, &day, config.concurrency).await;

    let snapshot = Snapshot {
        last_updated: Utc::now().timestamp(),
        vehicles: enriched,
    };
    let stats = CycleStats::from_cycle(fetched, &snapshot, started.elapsed());

    // The store swap is the contract; the file mirror is best effort.
    if let Some(path) = &config.data_file {
        if let Err(error) = output::write_snapshot(path, &snapshot) {
            warn!(path = %path.display(), error = %error, "Snapshot mirror write failed");
        }
    }

    store.publish(snapshot).await;

    Ok(stats)
}
