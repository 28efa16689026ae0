//! HTTP API for the Motorbay daemon.
//!
//! Provides REST endpoints for:
//! - Health check
//! - Reservation listing, lookup, creation, update, status change and removal
//! - Login gate for the dashboard

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use motorbay_domain::{
    Reservation, ReservationForm, ReservationId, ReservationPatch, ReservationStatus,
};
use motorbay_store::{PersistenceHealth, ReservationFilter, ReservationRepository, ReservationStore};

use crate::config::AuthConfig;
use crate::error::DaemonError;

// =============================================================================
// API State
// =============================================================================

/// Shared state for API handlers.
pub struct ApiState {
    pub store: Arc<ReservationStore>,
    pub auth: AuthConfig,
    pub mock_latency: Duration,
}

impl ApiState {
    /// Wait out the configured artificial latency, if any.
    async fn simulate_latency(&self) {
        if !self.mock_latency.is_zero() {
            tokio::time::sleep(self.mock_latency).await;
        }
    }
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Response envelope shared by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

type ApiError = (StatusCode, Json<ApiResponse<()>>);
type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub persistence: PersistenceHealth,
}

/// Listing filters as they arrive on the query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationQuery {
    pub date: Option<String>,
    pub status: Option<String>,
    pub license_plate: Option<String>,
    pub assigned_to: Option<String>,
    pub customer_name: Option<String>,
}

impl ReservationQuery {
    fn into_filter(self) -> Result<ReservationFilter, DaemonError> {
        let date = match non_blank(self.date) {
            Some(raw) => Some(NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                DaemonError::BadRequest(format!("date must be YYYY-MM-DD, got {}", raw))
            })?),
            None => None,
        };
        let status = non_blank(self.status)
            .map(|raw| raw.parse::<ReservationStatus>())
            .transpose()?;

        Ok(ReservationFilter {
            date,
            status,
            license_plate: non_blank(self.license_plate),
            assigned_to: non_blank(self.assigned_to),
            customer_name: non_blank(self.customer_name),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Request to change a reservation's status.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// Response after removing a reservation.
#[derive(Debug, Serialize, Deserialize)]
pub struct RemovedResponse {
    pub id: ReservationId,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile returned on a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

// =============================================================================
// Router
// =============================================================================

/// Create the API router.
pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/reservations", get(list_handler).post(create_handler))
        .route("/api/reservations/create", post(create_handler))
        .route(
            "/api/reservations/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .route("/api/reservations/:id/status", patch(status_handler))
        .route("/api/auth/login", post(login_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint.
async fn health_handler(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        persistence: state.store.persistence_health().await,
    })
}

/// List reservations, optionally filtered.
async fn list_handler(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ReservationQuery>,
) -> ApiResult<Vec<Reservation>> {
    state.simulate_latency().await;

    let filter = query.into_filter().map_err(to_error_response)?;
    let reservations = state
        .store
        .search(&filter)
        .await
        .map_err(|e| to_error_response(e.into()))?;

    debug!(count = reservations.len(), "Listed reservations");
    Ok(Json(ApiResponse::ok(reservations)))
}

/// Get a single reservation.
async fn get_handler(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> ApiResult<Reservation> {
    state.simulate_latency().await;

    let reservation = find_existing(&state, &ReservationId::from(id)).await?;
    Ok(Json(ApiResponse::ok(reservation)))
}

/// Create a reservation from a submitted form.
async fn create_handler(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<ReservationForm>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Reservation>>), ApiError> {
    state.simulate_latency().await;

    let Json(form) = body.map_err(rejection_response)?;
    let draft = form.into_draft().map_err(|e| to_error_response(e.into()))?;

    let reservation = state
        .store
        .create(draft)
        .await
        .map_err(|e| to_error_response(e.into()))?;

    info!(
        reservation_id = %reservation.id,
        customer = %reservation.customer_name,
        date = %reservation.date,
        "Reservation created via API"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(reservation, "Reservation created")),
    ))
}

/// Merge a partial update into an existing reservation.
async fn update_handler(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    body: Result<Json<ReservationPatch>, JsonRejection>,
) -> ApiResult<Reservation> {
    state.simulate_latency().await;

    let Json(patch) = body.map_err(rejection_response)?;
    let reservation = state
        .store
        .update(&ReservationId::from(id), patch)
        .await
        .map_err(|e| to_error_response(e.into()))?;

    Ok(Json(ApiResponse::ok_with_message(reservation, "Reservation updated")))
}

/// Change only the status of a reservation.
async fn status_handler(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    body: Result<Json<StatusRequest>, JsonRejection>,
) -> ApiResult<Reservation> {
    state.simulate_latency().await;

    let Json(request) = body.map_err(rejection_response)?;
    let status = request
        .status
        .parse::<ReservationStatus>()
        .map_err(|e| to_error_response(e.into()))?;

    let reservation = state
        .store
        .update_status(&ReservationId::from(id), status)
        .await
        .map_err(|e| to_error_response(e.into()))?;

    Ok(Json(ApiResponse::ok_with_message(reservation, "Status updated")))
}

/// Remove a reservation. Unknown ids are reported as 404.
async fn delete_handler(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> ApiResult<RemovedResponse> {
    state.simulate_latency().await;

    let id = ReservationId::from(id);
    find_existing(&state, &id).await?;

    state
        .store
        .remove(&id)
        .await
        .map_err(|e| to_error_response(e.into()))?;

    info!(reservation_id = %id, "Reservation removed via API");
    Ok(Json(ApiResponse::ok_with_message(RemovedResponse { id }, "Reservation deleted")))
}

/// Check the single configured credential.
async fn login_handler(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<UserProfile> {
    let Json(request) = body.map_err(rejection_response)?;

    if request.email != state.auth.email || request.password != state.auth.password {
        warn!(email = %request.email, "Rejected login");
        return Err(to_error_response(DaemonError::Unauthorized));
    }

    Ok(Json(ApiResponse::ok_with_message(
        UserProfile {
            id: "1".to_string(),
            email: state.auth.email.clone(),
            name: "Test User".to_string(),
            role: "admin".to_string(),
        },
        "Login successful",
    )))
}

// =============================================================================
// Helpers
// =============================================================================

async fn find_existing(state: &ApiState, id: &ReservationId) -> Result<Reservation, ApiError> {
    state
        .store
        .find_by_id(id)
        .await
        .map_err(|e| to_error_response(e.into()))?
        .ok_or_else(|| to_error_response(DaemonError::ReservationNotFound(id.to_string())))
}

fn rejection_response(rejection: JsonRejection) -> ApiError {
    to_error_response(DaemonError::BadRequest(rejection.body_text()))
}

fn to_error_response(error: DaemonError) -> ApiError {
    let status = match &error {
        DaemonError::ReservationNotFound(_) => StatusCode::NOT_FOUND,
        DaemonError::Store(e) if e.is_not_found() => StatusCode::NOT_FOUND,
        DaemonError::Domain(_) | DaemonError::BadRequest(_) => StatusCode::BAD_REQUEST,
        DaemonError::Unauthorized => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        warn!(error = %error, "Request failed");
    }

    (status, Json(ApiResponse::error(error.to_string())))
}

// =============================================================================
// Tests
// =============================================================================
