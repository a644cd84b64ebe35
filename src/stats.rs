use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::Snapshot;

/// Summary of one refresh cycle, logged after every pass.
#[derive(Debug, Default, Serialize)]
pub struct CycleStats {
    pub timestamp: DateTime<Utc>,
    /// Vehicles returned by the bulk fetch.
    pub fetched: usize,
    /// Vehicles in the published snapshot.
    pub published: usize,
    /// Vehicles dropped for lacking a trip identifier (or a dead task).
    pub dropped: usize,
    /// Published vehicles that carry stop detail.
    pub with_stops: usize,
    /// Published vehicles with a usable position.
    pub with_position: usize,
    pub duration_ms: u64,
}

impl CycleStats {
    pub fn from_cycle(fetched: usize, snapshot: &Snapshot, elapsed: Duration) -> Self {
        let published = snapshot.vehicles.len();
        CycleStats {
            timestamp: Utc::now(),
            fetched,
            published,
            dropped: fetched.saturating_sub(published),
            with_stops: snapshot
                .vehicles
                .iter()
                .filter(|v| !v.stops.is_empty())
                .count(),
            with_position: snapshot
                .vehicles
                .iter()
                .filter(|v| v.lat.is_some() && v.lon.is_some())
                .count(),
            duration_ms: elapsed.as_millis() as u64,
        }
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn stops_pct(&self) -> f64 {
        Self::pct(self.with_stops, self.published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EnrichedVehicle;

    fn vehicle(id: &str, with_pos: bool, stop_count: usize) -> EnrichedVehicle {
        EnrichedVehicle {
            id: id.to_string(),
            name: None,
            headsgn: None,
            lat: with_pos.then_some(47.0),
            lon: with_pos.then_some(19.0),
            sp: None,
            hd: None,
            mode: None,
            stops: vec![Default::default(); stop_count],
        }
    }

    #[test]
    fn test_pct_with_zero_total() {
        assert_eq!(CycleStats::pct(10, 0), 0.0);
    }

    #[test]
    fn test_pct_normal_values() {
        assert_eq!(CycleStats::pct(50, 100), 50.0);
        assert_eq!(CycleStats::pct(1, 4), 25.0);
    }

    #[test]
    fn test_from_cycle_counts() {
        let snapshot = Snapshot {
            last_updated: 1_700_000_000,
            vehicles: vec![
                vehicle("1:1", true, 5),
                vehicle("1:2", true, 0),
                vehicle("1:3", false, 2),
            ],
        };
        let stats = CycleStats::from_cycle(5, &snapshot, Duration::from_millis(1234));

        assert_eq!(stats.fetched, 5);
        assert_eq!(stats.published, 3);
        assert_eq!(stats.dropped, 2);
        assert_eq!(stats.with_stops, 2);
        assert_eq!(stats.with_position, 2);
        assert_eq!(stats.duration_ms, 1234);
    }

    #[test]
    fn test_from_cycle_empty_snapshot() {
        let snapshot = Snapshot {
            last_updated: 0,
            vehicles: vec![],
        };
        let stats = CycleStats::from_cycle(0, &snapshot, Duration::ZERO);
        assert_eq!(stats.published, 0);
        assert_eq!(stats.dropped, 0);
        assert_eq!(stats.stops_pct(), 0.0);
    }
}
