use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::{BoundingBox, UpstreamConfig};
use crate::fetch::{self, BasicClient};
use crate::model::{RawVehicle, TripDetail};
use crate::parser;
use crate::services::transit_api::TransitApi;

/// Client for the EMMA OTP2 backend.
///
/// Owns the wire details: query text, endpoints, header profile (via
/// [`BasicClient`]) and the per-trip deadline. The refresh pipeline only
/// sees the [`TransitApi`] trait; the serving layer additionally uses the
/// two proxy operations.
pub struct OtpClient {
    http: BasicClient,
    graphql_url: String,
    geocode_url: String,
    bounding_box: BoundingBox,
    modes: Vec<String>,
    trip_timeout: std::time::Duration,
}

impl OtpClient {
    pub fn new(config: &UpstreamConfig) -> Self {
        let base = config.base_url.trim_end_matches('/');
        Self {
            http: BasicClient::new(),
            graphql_url: format!("{base}/index/graphql"),
            geocode_url: format!("{base}/geocode/stations"),
            bounding_box: config.bounding_box,
            modes: config.modes.clone(),
            trip_timeout: config.trip_timeout,
        }
    }

    fn positions_query(&self) -> String {
        let b = &self.bounding_box;
        format!(
            r#"{{
    vehiclePositions(
      swLat: {},
      swLon: {},
      neLat: {},
      neLon: {},
      modes: [{}]
    ) {{
      trip {{
        gtfsId
        tripShortName
        tripHeadsign
        route {{
          mode
        }}
      }}
      vehicleId
      lat
      lon
      label
      speed
      heading
    }}
}}"#,
            b.sw_lat,
            b.sw_lon,
            b.ne_lat,
            b.ne_lon,
            self.modes.join(", ")
        )
    }

    fn trip_query(trip_id: &str, service_day: &str) -> String {
        format!(
            r#"{{
    trip(id: "{trip_id}", serviceDay: "{service_day}") {{
      gtfsId
      tripHeadsign
      trainCategoryName
      trainName
      route {{
        longName(language: "hu")
        shortName
      }}
      stoptimes {{
        stop {{
          name
          lat
          lon
          platformCode
        }}
        realtimeArrival
        realtimeDeparture
        arrivalDelay
        departureDelay
        scheduledArrival
        scheduledDeparture
      }}
    }}
}}"#
        )
    }

    /// Station name search, relayed for the serving layer.
    ///
    /// Returns the upstream status code with either the upstream JSON body
    /// or an error body describing the non-success status. Transport
    /// failures (including timeout) are `Err`.
    pub async fn search_stations(&self, query: &str, limit: u32) -> Result<(u16, Value)> {
        let url = format!("{}?q={}&limit={}", self.geocode_url, query, limit);
        let resp = fetch::get(&self.http, &url, Some(self.trip_timeout)).await?;

        let status = resp.status().as_u16();
        if resp.status().is_success() {
            Ok((status, resp.json().await?))
        } else {
            Ok((status, json!({"error": format!("MAV API returned status {status}")})))
        }
    }

    /// Issues the trip-planning query and returns its itineraries.
    pub async fn plan_trip(&self, request: &ValidPlanRequest) -> Result<PlanOutcome> {
        let query = plan_query(request);
        let bytes = fetch::post_json(
            &self.http,
            &self.graphql_url,
            &json!({"query": query}),
            Some(PLAN_TIMEOUT),
        )
        .await?;

        let body: Value = serde_json::from_slice(&bytes)?;
        if let Some(errors) = body.get("errors").filter(|e| !e.is_null()) {
            return Ok(PlanOutcome::UpstreamErrors(errors.clone()));
        }
        let itineraries = body
            .pointer("/data/plan/itineraries")
            .cloned()
            .unwrap_or_else(|| json!([]));
        Ok(PlanOutcome::Itineraries(itineraries))
    }
}

#[async_trait]
impl TransitApi for OtpClient {
    async fn fetch_positions(&self) -> Result<Vec<RawVehicle>> {
        let body = json!({"query": self.positions_query()});
        // No deadline here: the bulk response is large and the cycle has
        // nothing better to do than wait for it.
        let bytes = fetch::post_json(&self.http, &self.graphql_url, &body, None).await?;
        parser::parse_positions(&bytes)
    }

    async fn fetch_trip_detail(&self, trip_id: &str, service_day: &str) -> Result<TripDetail> {
        let body = json!({"query": Self::trip_query(trip_id, service_day)});
        let bytes =
            fetch::post_json(&self.http, &self.graphql_url, &body, Some(self.trip_timeout))
                .await?;
        parser::parse_trip_detail(&bytes)
    }
}

const PLAN_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Client-supplied trip-planning request, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanRequest {
    pub from: Option<PlanCoord>,
    pub to: Option<PlanCoord>,
    pub num_itineraries: Option<u32>,
    pub date_time: Option<String>,
    pub arrive_by: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct PlanCoord {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// A [`PlanRequest`] whose coordinates have been checked.
#[derive(Debug, Clone)]
pub struct ValidPlanRequest {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub num_itineraries: u32,
    pub date_time: Option<String>,
    pub arrive_by: bool,
}

/// What the plan query produced: itineraries, or GraphQL-level errors the
/// serving layer reports as an upstream failure.
#[derive(Debug)]
pub enum PlanOutcome {
    Itineraries(Value),
    UpstreamErrors(Value),
}

fn plan_query(request: &ValidPlanRequest) -> String {
    let mut params = vec![
        format!(
            "from: {{lat: {}, lon: {}}}",
            request.from.0, request.from.1
        ),
        format!("to: {{lat: {}, lon: {}}}", request.to.0, request.to.1),
        format!("numItineraries: {}", request.num_itineraries),
        "transportModes: [{mode: RAIL}, {mode: COACH}, {mode: BUS}, {mode: TRAM}, {mode: SUBWAY}]"
            .to_string(),
        "walkReluctance: 2.0".to_string(),
        "walkBoardCost: 600".to_string(),
        "minTransferTime: 120".to_string(),
        "maxWalkDistance: 2000".to_string(),
    ];

    if let Some(when) = request.date_time.as_deref().and_then(parse_date_time) {
        params.push(format!("date: \"{}\"", when.format("%Y-%m-%d")));
        params.push(format!("time: \"{}\"", when.format("%H:%M")));
        params.push(format!("arriveBy: {}", request.arrive_by));
    }

    format!(
        r#"{{
    plan(
        {}
    ) {{
        itineraries {{
            duration
            walkTime
            waitingTime
            legs {{
                mode
                startTime
                endTime
                duration
                distance
                from {{
                    name
                    lat
                    lon
                }}
                to {{
                    name
                    lat
                    lon
                }}
                intermediateStops {{
                    name
                    lat
                    lon
                }}
                realTime
                legGeometry {{
                    points
                }}
                route {{
                    shortName
                    longName
                    mode
                }}
                trip {{
                    tripShortName
                    tripHeadsign
                }}
            }}
        }}
    }}
}}"#,
        params.join(",\n        ")
    )
}

/// Accepts RFC 3339 (converted to UTC) or a bare local `YYYY-MM-DDTHH:MM`
/// (used as given). Anything else is ignored and the query runs for "now".
fn parse_date_time(raw: &str) -> Option<NaiveDateTime> {
    if !raw.contains('T') {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> OtpClient {
        OtpClient::new(&UpstreamConfig::default())
    }

    #[test]
    fn test_urls_derived_from_base() {
        let client = test_client();
        assert!(client.graphql_url.ends_with("/index/graphql"));
        assert!(client.geocode_url.ends_with("/geocode/stations"));
    }

    #[test]
    fn test_positions_query_carries_bbox_and_modes() {
        let query = test_client().positions_query();
        assert!(query.contains("swLat: 45.5"));
        assert!(query.contains("neLon: 22.8"));
        assert!(query.contains("RAIL, RAIL_REPLACEMENT_BUS, COACH, SUBURBAN_RAILWAY, TRAMTRAIN"));
        assert!(query.contains("gtfsId"));
        assert!(query.contains("heading"));
    }

    #[test]
    fn test_trip_query_interpolates_id_and_day() {
        let query = OtpClient::trip_query("1:234", "2026-08-07");
        assert!(query.contains(r#"trip(id: "1:234", serviceDay: "2026-08-07")"#));
        assert!(query.contains("stoptimes"));
        assert!(query.contains("platformCode"));
        assert!(query.contains(r#"longName(language: "hu")"#));
    }

    #[test]
    fn test_plan_query_without_date_time() {
        let request = ValidPlanRequest {
            from: (47.5, 19.0),
            to: (46.2, 20.1),
            num_itineraries: 5,
            date_time: None,
            arrive_by: false,
        };
        let query = plan_query(&request);
        assert!(query.contains("from: {lat: 47.5, lon: 19}"));
        assert!(query.contains("numItineraries: 5"));
        assert!(query.contains("walkReluctance: 2.0"));
        assert!(!query.contains("arriveBy"));
    }

    #[test]
    fn test_plan_query_with_local_date_time() {
        let request = ValidPlanRequest {
            from: (47.5, 19.0),
            to: (46.2, 20.1),
            num_itineraries: 3,
            date_time: Some("2026-08-07T08:30".to_string()),
            arrive_by: true,
        };
        let query = plan_query(&request);
        assert!(query.contains(r#"date: "2026-08-07""#));
        assert!(query.contains(r#"time: "08:30""#));
        assert!(query.contains("arriveBy: true"));
    }

    #[test]
    fn test_parse_date_time_variants() {
        assert_eq!(
            parse_date_time("2026-08-07T10:00:00Z").map(|d| d.format("%H:%M").to_string()),
            Some("10:00".to_string())
        );
        assert_eq!(
            parse_date_time("2026-08-07T10:00:00+02:00").map(|d| d.format("%H:%M").to_string()),
            Some("08:00".to_string())
        );
        assert!(parse_date_time("2026-08-07T08:30").is_some());
        assert!(parse_date_time("not a date").is_none());
        assert!(parse_date_time("2026-08-07").is_none());
    }
}
