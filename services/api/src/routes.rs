use std::sync::Arc;

use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::Utc;
use serde_json::json;
use talentwatch::tracking::{
    tracking_router, EmploymentSnapshot, PersonId, RosterError, TrackingServiceError,
};

use crate::infra::{ApiService, AppState, QueuedSnapshotFetcher};

/// Wrapper carrying the concrete fetcher so the snapshot-push route can feed
/// it; the generic tracking router stays infrastructure-agnostic.
#[derive(Clone)]
pub(crate) struct SnapshotGateway {
    pub(crate) service: Arc<ApiService>,
    pub(crate) fetcher: Arc<QueuedSnapshotFetcher>,
}

pub(crate) fn with_tracking_routes(
    service: Arc<ApiService>,
) -> axum::Router {
    tracking_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/tracking/people/:person_id/snapshot",
            axum::routing::post(push_snapshot_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Accept a pushed snapshot for a tracked person and immediately run the
/// old-versus-new classification on it.
pub(crate) async fn push_snapshot_endpoint(
    Extension(gateway): Extension<SnapshotGateway>,
    Path(person_id): Path<String>,
    Json(snapshot): Json<EmploymentSnapshot>,
) -> impl IntoResponse {
    let id = PersonId(person_id);
    gateway.fetcher.push(&id, snapshot);

    match gateway.service.check_at(&id, Utc::now()) {
        Ok(departure) => (
            StatusCode::OK,
            Json(json!({ "departure": departure })),
        )
            .into_response(),
        Err(TrackingServiceError::Roster(RosterError::UnknownPerson(id))) => {
            let payload = json!({
                "error": format!("person {} is not on the tracking roster", id.0),
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
