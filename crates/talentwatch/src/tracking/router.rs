use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::dispatch::AlertNotifier;
use super::domain::{AlertLevel, EnrichedPerson, PersonId};
use super::repository::{DepartureRepository, RosterRepository};
use super::roster::RosterError;
use super::service::{SnapshotFetcher, TrackingService, TrackingServiceError};

/// Router builder exposing the operator surface for the tracking core.
pub fn tracking_router<R, D, F, N>(service: Arc<TrackingService<R, D, F, N>>) -> Router
where
    R: RosterRepository + 'static,
    D: DepartureRepository + 'static,
    F: SnapshotFetcher + 'static,
    N: AlertNotifier + 'static,
{
    Router::new()
        .route("/api/v1/tracking/people", post(track_handler::<R, D, F, N>))
        .route(
            "/api/v1/tracking/people/:person_id",
            get(person_handler::<R, D, F, N>),
        )
        .route(
            "/api/v1/tracking/people/:person_id/check",
            post(check_handler::<R, D, F, N>),
        )
        .route(
            "/api/v1/tracking/people/:person_id/revert",
            post(revert_handler::<R, D, F, N>),
        )
        .route("/api/v1/tracking/check", post(check_all_handler::<R, D, F, N>))
        .route("/api/v1/tracking/alerts", get(alerts_handler::<R, D, F, N>))
        .route(
            "/api/v1/tracking/alerts/dispatch",
            post(dispatch_handler::<R, D, F, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackPersonRequest {
    pub(crate) company: String,
    pub(crate) person: EnrichedPerson,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlertQuery {
    min_level: Option<u8>,
}

pub(crate) async fn track_handler<R, D, F, N>(
    State(service): State<Arc<TrackingService<R, D, F, N>>>,
    axum::Json(request): axum::Json<TrackPersonRequest>,
) -> Response
where
    R: RosterRepository + 'static,
    D: DepartureRepository + 'static,
    F: SnapshotFetcher + 'static,
    N: AlertNotifier + 'static,
{
    match service.track(&request.company, request.person) {
        Ok(person) => (StatusCode::ACCEPTED, axum::Json(person.status_view())).into_response(),
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn person_handler<R, D, F, N>(
    State(service): State<Arc<TrackingService<R, D, F, N>>>,
    Path(person_id): Path<String>,
) -> Response
where
    R: RosterRepository + 'static,
    D: DepartureRepository + 'static,
    F: SnapshotFetcher + 'static,
    N: AlertNotifier + 'static,
{
    let id = PersonId(person_id);
    match service.person(&id) {
        Ok(Some(person)) => (StatusCode::OK, axum::Json(person.status_view())).into_response(),
        Ok(None) => unknown_person(&id),
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn check_handler<R, D, F, N>(
    State(service): State<Arc<TrackingService<R, D, F, N>>>,
    Path(person_id): Path<String>,
) -> Response
where
    R: RosterRepository + 'static,
    D: DepartureRepository + 'static,
    F: SnapshotFetcher + 'static,
    N: AlertNotifier + 'static,
{
    let id = PersonId(person_id);
    match service.check(&id) {
        Ok(departure) => (
            StatusCode::OK,
            axum::Json(json!({ "departure": departure })),
        )
            .into_response(),
        Err(TrackingServiceError::Roster(RosterError::UnknownPerson(_))) => unknown_person(&id),
        Err(TrackingServiceError::Fetch(err)) => {
            let payload = json!({ "error": err.to_string(), "retry": "next cycle" });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn revert_handler<R, D, F, N>(
    State(service): State<Arc<TrackingService<R, D, F, N>>>,
    Path(person_id): Path<String>,
) -> Response
where
    R: RosterRepository + 'static,
    D: DepartureRepository + 'static,
    F: SnapshotFetcher + 'static,
    N: AlertNotifier + 'static,
{
    let id = PersonId(person_id);
    match service.revert(&id) {
        Ok(person) => (StatusCode::OK, axum::Json(person.status_view())).into_response(),
        Err(TrackingServiceError::Roster(RosterError::UnknownPerson(_))) => unknown_person(&id),
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn check_all_handler<R, D, F, N>(
    State(service): State<Arc<TrackingService<R, D, F, N>>>,
) -> Response
where
    R: RosterRepository + 'static,
    D: DepartureRepository + 'static,
    F: SnapshotFetcher + 'static,
    N: AlertNotifier + 'static,
{
    match service.check_all() {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn alerts_handler<R, D, F, N>(
    State(service): State<Arc<TrackingService<R, D, F, N>>>,
    Query(query): Query<AlertQuery>,
) -> Response
where
    R: RosterRepository + 'static,
    D: DepartureRepository + 'static,
    F: SnapshotFetcher + 'static,
    N: AlertNotifier + 'static,
{
    let raw_level = query.min_level.unwrap_or(1);
    let min_level = match AlertLevel::from_value(raw_level) {
        Some(level) => level,
        None => {
            let payload = json!({
                "error": format!("min_level must be 1, 2, or 3 (got {raw_level})"),
            });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    match service.list_alerts(min_level) {
        Ok(departures) => (StatusCode::OK, axum::Json(departures)).into_response(),
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn dispatch_handler<R, D, F, N>(
    State(service): State<Arc<TrackingService<R, D, F, N>>>,
) -> Response
where
    R: RosterRepository + 'static,
    D: DepartureRepository + 'static,
    F: SnapshotFetcher + 'static,
    N: AlertNotifier + 'static,
{
    match service.dispatch_alerts() {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(err) => internal_error(err),
    }
}

fn unknown_person(id: &PersonId) -> Response {
    let payload = json!({
        "error": format!("person {} is not on the tracking roster", id.0),
    });
    (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
}

fn internal_error(err: TrackingServiceError) -> Response {
    let payload = json!({ "error": err.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
