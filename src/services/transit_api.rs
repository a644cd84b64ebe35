//! Trait for the upstream transit data provider.

use anyhow::Result;
use chrono::Utc;

use crate::model::{RawVehicle, TripDetail};

/// Abstraction over the provider's two queries.
///
/// `fetch_positions` failing aborts the whole refresh cycle; the previous
/// snapshot stays current. `fetch_trip_detail` failing degrades a single
/// vehicle only; the enricher maps the error to an empty [`TripDetail`].
#[async_trait::async_trait]
pub trait TransitApi: Send + Sync {
    /// Returns all tracked vehicle positions within the configured
    /// bounding box and mode filter.
    async fn fetch_positions(&self) -> Result<Vec<RawVehicle>>;

    /// Returns schedule/stop detail for one trip on one service day.
    async fn fetch_trip_detail(&self, trip_id: &str, service_day: &str) -> Result<TripDetail>;
}

/// Current service day as `YYYY-MM-DD`.
///
/// Computed once per refresh cycle. A cycle that straddles midnight keeps
/// the day it started with.
pub fn service_day() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_day_format() {
        let day = service_day();
        assert_eq!(day.len(), 10);
        let parts: Vec<&str> = day.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 4);
        assert!(parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit())));
    }
}
