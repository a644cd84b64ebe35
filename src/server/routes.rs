use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::warn;

use crate::infra::otp::{OtpClient, PlanOutcome, PlanRequest, ValidPlanRequest};
use crate::snapshot::SnapshotStore;

#[derive(Clone)]
pub struct AppState {
    pub store: SnapshotStore,
    pub otp: Arc<OtpClient>,
}

pub fn router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/train_data.json", get(train_data))
        .route("/api/stations", get(stations))
        .route("/api/plan", post(plan))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

/// Serves the current snapshot; before the first successful cycle the
/// front end gets an explicit "not yet" body it knows how to render.
async fn train_data(State(state): State<AppState>) -> Response {
    match state.store.current().await {
        Some(snapshot) => Json(snapshot.as_ref()).into_response(),
        None => Json(json!({
            "error": "Data not available yet",
            "vehicles": [],
            "lastUpdated": 0
        }))
        .into_response(),
    }
}

#[derive(Deserialize)]
struct StationsQuery {
    q: Option<String>,
    limit: Option<u32>,
}

async fn stations(
    State(state): State<AppState>,
    Query(params): Query<StationsQuery>,
) -> Response {
    let query = params.q.unwrap_or_default();
    if query.chars().count() < 2 {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Query must be at least 2 characters long",
        );
    }

    match state
        .otp
        .search_stations(&query, params.limit.unwrap_or(5))
        .await
    {
        Ok((status, body)) => {
            let status =
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(body)).into_response()
        }
        Err(error) if is_timeout(&error) => {
            error_response(StatusCode::GATEWAY_TIMEOUT, "Request timeout")
        }
        Err(error) => {
            warn!(error = %error, "Station search proxy failed");
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                &format!("Network error: {error}"),
            )
        }
    }
}

async fn plan(State(state): State<AppState>, Json(request): Json<PlanRequest>) -> Response {
    let request = match validate_plan_request(request) {
        Ok(request) => request,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    match state.otp.plan_trip(&request).await {
        Ok(PlanOutcome::Itineraries(itineraries)) => Json(json!({
            "success": true,
            "plan": { "itineraries": itineraries }
        }))
        .into_response(),
        Ok(PlanOutcome::UpstreamErrors(details)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "GraphQL errors", "details": details})),
        )
            .into_response(),
        Err(error) if is_timeout(&error) => error_response(
            StatusCode::GATEWAY_TIMEOUT,
            "Request timeout - please try again",
        ),
        Err(error) => {
            warn!(error = %error, "Trip plan proxy failed");
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                &format!("Network error: {error}"),
            )
        }
    }
}

fn validate_plan_request(request: PlanRequest) -> Result<ValidPlanRequest, &'static str> {
    let from = request.from.ok_or("From and to coordinates are required")?;
    let to = request.to.ok_or("From and to coordinates are required")?;

    let from = (
        from.lat.ok_or("Missing lat/lon in coordinates")?,
        from.lon.ok_or("Missing lat/lon in coordinates")?,
    );
    let to = (
        to.lat.ok_or("Missing lat/lon in coordinates")?,
        to.lon.ok_or("Missing lat/lon in coordinates")?,
    );

    Ok(ValidPlanRequest {
        from,
        to,
        num_itineraries: request.num_itineraries.unwrap_or(5),
        date_time: request.date_time,
        arrive_by: request.arrive_by.unwrap_or(false),
    })
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"error": message}))).into_response()
}

fn is_timeout(error: &anyhow::Error) -> bool {
    error
        .chain()
        .any(|cause| {
            cause
                .downcast_ref::<reqwest::Error>()
                .is_some_and(|e| e.is_timeout())
        })
}
