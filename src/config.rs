//! Startup-time configuration for the refresh pipeline.
//!
//! Nothing here is runtime-mutable; the CLI builds these once and the
//! pipeline borrows them for its lifetime.

use std::path::PathBuf;
use std::time::Duration;

/// Geographic filter for the bulk position query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub sw_lat: f64,
    pub sw_lon: f64,
    pub ne_lat: f64,
    pub ne_lon: f64,
}

impl Default for BoundingBox {
    /// Covers the Hungarian national network with a margin into
    /// neighboring countries for cross-border services.
    fn default() -> Self {
        Self {
            sw_lat: 45.5,
            sw_lon: 16.1,
            ne_lat: 48.7,
            ne_lon: 22.8,
        }
    }
}

/// Connection parameters for the OTP backend.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// OTP router base URL. The GraphQL endpoint lives at
    /// `{base}/index/graphql`, the geocoder at `{base}/geocode/stations`.
    pub base_url: String,
    pub bounding_box: BoundingBox,
    /// Transport modes included in the position query.
    pub modes: Vec<String>,
    /// Per-request deadline for trip detail fetches.
    pub trip_timeout: Duration,
}

pub const DEFAULT_BASE_URL: &str = "https://emma.mav.hu/otp2-backend/otp/routers/default";

pub const DEFAULT_MODES: [&str; 5] = [
    "RAIL",
    "RAIL_REPLACEMENT_BUS",
    "COACH",
    "SUBURBAN_RAILWAY",
    "TRAMTRAIN",
];

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            bounding_box: BoundingBox::default(),
            modes: DEFAULT_MODES.iter().map(|m| m.to_string()).collect(),
            trip_timeout: Duration::from_millis(10_000),
        }
    }
}

/// Parameters of the periodic refresh loop.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Tick interval between cycles.
    pub interval: Duration,
    /// Vehicles enriched concurrently within one chunk.
    pub concurrency: usize,
    /// Optional on-disk mirror of the published snapshot.
    pub data_file: Option<PathBuf>,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(45_000),
            concurrency: 10,
            data_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_defaults() {
        let upstream = UpstreamConfig::default();
        assert_eq!(upstream.trip_timeout, Duration::from_secs(10));
        assert_eq!(upstream.modes.len(), 5);
        assert!(upstream.base_url.starts_with("https://"));

        let refresh = RefreshConfig::default();
        assert_eq!(refresh.interval, Duration::from_secs(45));
        assert_eq!(refresh.concurrency, 10);
        assert!(refresh.data_file.is_none());
    }
}
