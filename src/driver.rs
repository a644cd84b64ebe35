//! Periodic driver for the refresh pipeline.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::config::RefreshConfig;
use crate::refresh::run_cycle;
use crate::services::transit_api::TransitApi;
use crate::snapshot::SnapshotStore;

/// Owns the refresh loop's lifecycle.
///
/// The first tick fires immediately so the store is warm as soon as
/// possible; after that, one cycle per interval. The loop awaits each
/// cycle before asking for the next tick, so cycles never overlap — a
/// cycle slower than the interval skips ticks instead of piling up.
pub struct PeriodicDriver<A> {
    api: Arc<A>,
    config: RefreshConfig,
    store: SnapshotStore,
}

impl<A: TransitApi + 'static> PeriodicDriver<A> {
    pub fn new(api: Arc<A>, config: RefreshConfig, store: SnapshotStore) -> Self {
        Self { api, config, store }
    }

    /// Runs one cycle, logging the outcome either way.
    pub async fn run_once(&self) {
        match run_cycle(&self.api, &self.config, &self.store).await {
            Ok(stats) => info!(
                fetched = stats.fetched,
                published = stats.published,
                dropped = stats.dropped,
                with_stops = stats.with_stops,
                duration_ms = stats.duration_ms,
                "Refresh cycle complete"
            ),
            Err(error) => error!(error = %error, "Refresh cycle failed, keeping previous snapshot"),
        }
    }

    /// Spawns the forever loop and returns its handle.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.config.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                self.run_once().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawVehicle, TripDetail, TripRef};
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct FlakyApi {
        fail_bulk: AtomicBool,
        cycles: AtomicUsize,
    }

    #[async_trait]
    impl TransitApi for FlakyApi {
        async fn fetch_positions(&self) -> Result<Vec<RawVehicle>> {
            self.cycles.fetch_add(1, Ordering::SeqCst);
            if self.fail_bulk.load(Ordering::SeqCst) {
                return Err(anyhow!("upstream unavailable"));
            }
            Ok(vec![RawVehicle {
                trip: Some(TripRef {
                    gtfs_id: Some("1:1".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }])
        }

        async fn fetch_trip_detail(&self, _trip_id: &str, _day: &str) -> Result<TripDetail> {
            Ok(TripDetail::default())
        }
    }

    #[tokio::test]
    async fn test_run_once_publishes() {
        let api = Arc::new(FlakyApi {
            fail_bulk: AtomicBool::new(false),
            cycles: AtomicUsize::new(0),
        });
        let store = SnapshotStore::new();
        let driver = PeriodicDriver::new(api, RefreshConfig::default(), store.clone());

        driver.run_once().await;

        assert_eq!(store.current().await.unwrap().vehicles.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_cycle_keeps_previous_snapshot() {
        let api = Arc::new(FlakyApi {
            fail_bulk: AtomicBool::new(false),
            cycles: AtomicUsize::new(0),
        });
        let store = SnapshotStore::new();
        let driver = PeriodicDriver::new(api.clone(), RefreshConfig::default(), store.clone());

        driver.run_once().await;
        let before = store.current().await.unwrap();

        api.fail_bulk.store(true, Ordering::SeqCst);
        driver.run_once().await;

        let after = store.current().await.unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(api.cycles.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_fires_immediately_then_on_interval() {
        let api = Arc::new(FlakyApi {
            fail_bulk: AtomicBool::new(false),
            cycles: AtomicUsize::new(0),
        });
        let store = SnapshotStore::new();
        let config = RefreshConfig {
            interval: std::time::Duration::from_secs(45),
            ..Default::default()
        };
        let driver = PeriodicDriver::new(api.clone(), config, store.clone());
        let handle = driver.start();

        // First cycle fires without waiting for the interval.
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert_eq!(api.cycles.load(Ordering::SeqCst), 1);

        tokio::time::sleep(std::time::Duration::from_secs(46)).await;
        assert_eq!(api.cycles.load(Ordering::SeqCst), 2);

        handle.abort();
    }
}
