//! Wire types for the EMMA/OTP2 upstream and the published snapshot.
//!
//! Upstream types deserialize the GraphQL responses with their exact
//! camelCase field names. Every upstream field is optional; absence is
//! decided here once instead of being re-checked downstream.

use serde::{Deserialize, Serialize};

/// One live position report from the `vehiclePositions` query.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawVehicle {
    pub vehicle_id: Option<String>,
    pub label: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
    pub trip: Option<TripRef>,
}

/// Trip reference embedded in a position report.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TripRef {
    pub gtfs_id: Option<String>,
    pub trip_short_name: Option<String>,
    pub trip_headsign: Option<String>,
    pub route: Option<RouteRef>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RouteRef {
    pub mode: Option<String>,
}

/// Per-trip schedule detail from the `trip` query.
///
/// `Default` doubles as the empty-detail sentinel used when the detail
/// fetch fails; merging with it yields a vehicle without schedule fields.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TripDetail {
    pub gtfs_id: Option<String>,
    pub trip_headsign: Option<String>,
    pub train_category_name: Option<String>,
    pub train_name: Option<String>,
    pub route: Option<RouteDetail>,
    pub stoptimes: Vec<StopTime>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteDetail {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
}

/// One scheduled stop of a trip. Arrival/departure instants are seconds
/// since midnight of the service day, as OTP reports them.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StopTime {
    pub stop: Option<StopInfo>,
    pub realtime_arrival: Option<i64>,
    pub realtime_departure: Option<i64>,
    pub scheduled_arrival: Option<i64>,
    pub scheduled_departure: Option<i64>,
    pub arrival_delay: Option<i64>,
    pub departure_delay: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StopInfo {
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub platform_code: Option<String>,
}

/// One enriched vehicle in the published snapshot.
///
/// Field names are the serving contract; renaming any of them is a
/// breaking change for the front end. Absent optionals are omitted from
/// the JSON rather than serialized as null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedVehicle {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headsgn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    pub stops: Vec<StopSummary>,
}

/// Compact stop entry: a field-renamed [`StopTime`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StopSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ra: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rd: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sa: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sd: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub a: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v: Option<String>,
}

/// The immutable published state: all enriched vehicles plus a timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub last_updated: i64,
    pub vehicles: Vec<EnrichedVehicle>,
}
