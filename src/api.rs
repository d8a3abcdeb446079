//! ==============================================================================
//! api.rs - http api for measurements and stats
//! ==============================================================================
//!
//! routes:
//!     POST   /measurements               record a measurement      -> 201 + Location
//!     GET    /measurements/:timestamp    instant -> one record, date -> all that day
//!     PUT    /measurements/:timestamp    replace an existing record -> 204
//!     PATCH  /measurements/:timestamp    merge fields into a record -> 204
//!     DELETE /measurements/:timestamp    remove a record            -> 204
//!     GET    /stats                      ?metric=&stat=&fromDateTime=&toDateTime=
//!     GET    /health                     liveness + store summary
//!
//! shared state:
//!     the store sits behind arc<rwlock<>>:
//!     - writes (post/put/patch/delete) take the write half
//!     - reads (get/stats/health) share the read half
//!
//! relationships:
//!     - uses: store.rs, stats.rs, domain.rs, timestamp.rs
//!     - errors: error.rs (MeasurementError renders itself as a response)
//!     - used by: main.rs (serve), tests/api.rs (oneshot)
//!
//! ==============================================================================

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequest, Path, Query, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::domain::Measurement;
use crate::error::{MeasurementError, Result};
use crate::stats::{self, StatResult, StatsQuery};
use crate::store::MeasurementStore;
use crate::timestamp::{self, Timestamp};

// ==============================================================================
// shared state
// ==============================================================================

#[derive(Clone, Default)]
pub struct AppState {
    pub store: Arc<RwLock<MeasurementStore>>,
}

impl AppState {
    pub fn new(store: MeasurementStore) -> Self {
        Self { store: Arc::new(RwLock::new(store)) }
    }
}

pub fn create_router(state: AppState, log_requests: bool) -> Router {
    let mut app = Router::new()
        .route("/health", get(health_handler))
        .route("/measurements", post(create_handler))
        .route(
            "/measurements/:timestamp",
            get(fetch_handler)
                .put(replace_handler)
                .patch(update_handler)
                .delete(delete_handler),
        )
        .route("/stats", get(stats_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    if log_requests {
        app = app.layer(TraceLayer::new_for_http());
    }
    app
}

// ==============================================================================
// request body
// ==============================================================================
// sensors post json, curl users often post forms. both end up as one
// name -> value map; a body that can't be read as one carries no usable
// timestamp, so it is rejected the same way a missing timestamp is.

pub struct MeasurementBody(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for MeasurementBody
where
    S: Send + Sync,
{
    type Rejection = MeasurementError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| {
                    tracing::debug!(error = %e, "unreadable form body");
                    MeasurementError::InvalidTimestamp
                })?;
            // repeated names: last one wins
            return Ok(Self(
                pairs.into_iter().map(|(k, v)| (k, Value::String(v))).collect(),
            ));
        }

        let Json(map) = Json::<Map<String, Value>>::from_request(req, state)
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "unreadable json body");
                MeasurementError::InvalidTimestamp
            })?;
        Ok(Self(map))
    }
}

// ==============================================================================
// handlers
// ==============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub measurements: usize,
    /// rfc3339 instant of the last write, if any
    pub last_update: Option<String>,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.store.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        measurements: store.len(),
        last_update: store.last_update().map(|at| at.to_rfc3339()),
    })
}

async fn create_handler(
    State(state): State<AppState>,
    MeasurementBody(body): MeasurementBody,
) -> Result<impl IntoResponse> {
    let measurement = Measurement::from_body(&body)?;
    let location = format!("/measurements/{}", measurement.timestamp);

    tracing::info!(timestamp = %measurement.timestamp, fields = measurement.fields.len(), "measurement recorded");
    state.store.write().await.put(measurement);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)]))
}

/// an instant returns one record, a bare date returns every record that day
async fn fetch_handler(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response> {
    let ts = Timestamp::parse(&raw)?;
    let key = ts.key();
    let store = state.store.read().await;

    if ts.is_date() {
        let day = store.get_by_date_prefix(&key);
        if day.is_empty() {
            return Err(MeasurementError::NotFound(key));
        }
        return Ok(Json(day).into_response());
    }

    store
        .get(&key)
        .map(|m| Json(m).into_response())
        .ok_or(MeasurementError::NotFound(key))
}

async fn replace_handler(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    MeasurementBody(body): MeasurementBody,
) -> Result<StatusCode> {
    let measurement = validate_update(&raw, &body)?;
    let mut store = state.store.write().await;
    if !store.contains(&measurement.timestamp) {
        return Err(MeasurementError::NotFound(measurement.timestamp));
    }

    tracing::info!(timestamp = %measurement.timestamp, "measurement replaced");
    store.put(measurement);
    Ok(StatusCode::NO_CONTENT)
}

async fn update_handler(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    MeasurementBody(body): MeasurementBody,
) -> Result<StatusCode> {
    let measurement = validate_update(&raw, &body)?;
    let mut store = state.store.write().await;
    if !store.contains(&measurement.timestamp) {
        return Err(MeasurementError::NotFound(measurement.timestamp));
    }

    tracing::info!(timestamp = %measurement.timestamp, fields = measurement.fields.len(), "measurement updated");
    store.merge_update(measurement);
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_handler(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<StatusCode> {
    let key = timestamp::normalize(&raw)?;
    let mut store = state.store.write().await;

    match store.delete(&key) {
        Some(_) => {
            tracing::info!(timestamp = %key, "measurement deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(MeasurementError::NotFound(key)),
    }
}

/// repeated params arrive as repeated pairs, so read the query as a list
async fn stats_handler(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<Vec<StatResult>> {
    let query = StatsQuery::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    let store = state.store.read().await;
    Json(stats::compute_stats(&store, &query))
}

/// path and body must both carry a valid timestamp, and the same one
fn validate_update(raw: &str, body: &Map<String, Value>) -> Result<Measurement> {
    let key = timestamp::normalize(raw)?;
    let measurement = Measurement::from_body(body)?;
    if measurement.timestamp != key {
        return Err(MeasurementError::TimestampMismatch);
    }
    Ok(measurement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_validate_update_normalizes_both_sides() {
        let m = validate_update(
            "2015-09-01T16:00:00Z",
            &body(json!({"timestamp": "2015-09-01T18:00:00+02:00", "temperature": 1.0})),
        )
        .unwrap();
        assert_eq!(m.timestamp, "2015-09-01T16:00:00.000Z");
    }

    #[test]
    fn test_validate_update_checks_in_order() {
        assert_eq!(
            validate_update("nope", &body(json!({"timestamp": "2015-09-01T16:00:00Z"}))),
            Err(MeasurementError::InvalidTimestamp)
        );
        assert_eq!(
            validate_update(
                "2015-09-01T16:00:00Z",
                &body(json!({"timestamp": "2015-09-02T16:00:00Z", "temperature": "hot"}))
            ),
            Err(MeasurementError::NonNumericField("temperature".into()))
        );
        assert_eq!(
            validate_update(
                "2015-09-01T16:00:00Z",
                &body(json!({"timestamp": "2015-09-02T16:00:00Z"}))
            ),
            Err(MeasurementError::TimestampMismatch)
        );
    }
}
