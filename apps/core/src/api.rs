//! JSON HTTP surface.
//!
//! Authentication happens upstream. The proxy forwards the caller as
//! `x-user-id`, and `x-user-role: admin` unlocks the `/api/admin` routes.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, DefaultBodyLimit, FromRequestParts, Path, Query, State},
    http::{header::CONTENT_TYPE, request::Parts, HeaderMap, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::analytics::{self, DashboardSummary};
use crate::error::AppError;
use crate::models::{City, ComplaintStatus, ImageUpload, StoredComplaint, SubmissionReceipt, SubmissionRequest};
use crate::submission::SubmissionService;
use crate::traits::ComplaintStore;
use crate::uploads::MAX_IMAGES_PER_COMPLAINT;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";
const ADMIN_ROLE: &str = "admin";

/// Room for JSON framing around the base64 image payloads.
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub submissions: Arc<SubmissionService>,
    pub store: Arc<dyn ComplaintStore>,
    pub uploads_dir: PathBuf,
    pub max_image_bytes: usize,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Classification(_) => StatusCode::BAD_GATEWAY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Database(_) | AppError::Io(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if status.is_server_error() {
            error!("Request failed: {}", self);
            match self {
                AppError::Classification(_) => "Complaint analysis is unavailable, please try again later".to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// The authenticated caller, taken from the proxy headers.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: String,
    pub is_admin: bool,
}

impl Caller {
    fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let user_id = headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Sign in to continue".to_string()))?;

        let is_admin = headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|role| role.trim().eq_ignore_ascii_case(ADMIN_ROLE));

        Ok(Self {
            user_id: user_id.to_string(),
            is_admin,
        })
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Caller::from_headers(&parts.headers)
    }
}

/// A caller holding the admin role.
#[derive(Debug, Clone)]
pub struct AdminCaller(pub Caller);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AdminCaller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let caller = Caller::from_request_parts(parts, state).await?;
        if !caller.is_admin {
            return Err(AppError::Forbidden("Administrator role required".to_string()));
        }
        Ok(AdminCaller(caller))
    }
}

#[derive(Debug, Deserialize)]
pub struct ImagePayload {
    pub name: String,
    /// Base64 encoded file content.
    pub data: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitComplaintBody {
    pub complaint: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub images: Vec<ImagePayload>,
}

impl SubmitComplaintBody {
    fn into_request(self) -> Result<SubmissionRequest, AppError> {
        let images = self
            .images
            .into_iter()
            .map(|image| {
                Ok(ImageUpload {
                    bytes: STANDARD.decode(image.data.trim())?,
                    file_name: image.name,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(SubmissionRequest {
            text: self.complaint,
            city: self.city,
            images,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub city: Option<String>,
}

impl CityQuery {
    fn city(&self) -> Result<Option<City>, AppError> {
        City::parse_optional(self.city.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateBody {
    pub status: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.max_image_bytes.saturating_mul(MAX_IMAGES_PER_COMPLAINT) / 3 * 4 + BODY_OVERHEAD_BYTES;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(USER_ROLE_HEADER),
        ]);

    Router::new()
        .route("/health", get(health))
        .route("/api/cities", get(list_cities))
        .route("/api/complaints", post(submit_complaint).get(list_my_complaints))
        .route("/api/complaints/:id", get(get_complaint))
        .route("/api/admin/complaints", get(list_all_complaints))
        .route("/api/admin/complaints/:id/status", patch(update_complaint_status))
        .route("/api/admin/analytics", get(dashboard))
        .nest_service("/uploads", ServeDir::new(&state.uploads_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn list_cities() -> Json<Vec<&'static str>> {
    Json(City::ALL.iter().map(City::label).collect())
}

async fn submit_complaint(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<SubmitComplaintBody>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmissionReceipt>), AppError> {
    let Json(body) = body?;
    let request = body.into_request()?;

    let receipt = state.submissions.submit(&caller.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn list_my_complaints(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<StoredComplaint>>, AppError> {
    Ok(Json(state.store.list_for_user(&caller.user_id).await?))
}

async fn get_complaint(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<StoredComplaint>, AppError> {
    // Other users' complaints look exactly like missing ones.
    match state.store.get(&id).await? {
        Some(complaint) if caller.is_admin || complaint.user_id == caller.user_id => Ok(Json(complaint)),
        _ => Err(AppError::NotFound(format!("Complaint {}", id))),
    }
}

async fn list_all_complaints(
    State(state): State<AppState>,
    _admin: AdminCaller,
    Query(query): Query<CityQuery>,
) -> Result<Json<Vec<StoredComplaint>>, AppError> {
    let city = query.city()?;
    let complaints = state.store.list_all().await?;
    Ok(Json(analytics::filter_by_city(complaints, city)))
}

async fn dashboard(
    State(state): State<AppState>,
    _admin: AdminCaller,
    Query(query): Query<CityQuery>,
) -> Result<Json<DashboardSummary>, AppError> {
    let city = query.city()?;
    let complaints = analytics::filter_by_city(state.store.list_all().await?, city);
    Ok(Json(analytics::compute(&complaints)))
}

async fn update_complaint_status(
    State(state): State<AppState>,
    AdminCaller(admin): AdminCaller,
    Path(id): Path<String>,
    body: Result<Json<StatusUpdateBody>, JsonRejection>,
) -> Result<Json<StoredComplaint>, AppError> {
    let Json(body) = body?;
    let status: ComplaintStatus = body.status.trim().parse()?;

    let updated = state
        .store
        .update_status(&id, status)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Complaint {}", id)))?;

    info!(complaint_id = %id, admin = %admin.user_id, status = status.as_str(), "Complaint status updated");
    Ok(Json(updated))
}
