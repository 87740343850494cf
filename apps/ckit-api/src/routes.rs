use axum::{
	Json, Router,
	extract::{Path, State},
	http::{HeaderValue, StatusCode, header},
	response::{IntoResponse, Response},
	routing::{delete, get},
};
use serde::Serialize;

use ckit_service::{Error, HealthReport, Resolution, StoreInfo};

use crate::state::AppState;

const INDEX: &str = "\
ckit citation fusion service

GET    /id/{id}      index data fused with citing and cited documents
GET    /doi/{doi}    redirect to the local id carrying the DOI
GET    /info         store sizes
GET    /health       store health
GET    /cache/size   number of cached responses
DELETE /cache        flush cached responses
";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/", get(index))
		.route("/health", get(health))
		.route("/info", get(info))
		.route("/id/{id}", get(by_id))
		.route("/doi/{*doi}", get(by_doi))
		.route("/cache/size", get(cache_size))
		.route("/cache", delete(flush_cache))
		.with_state(state)
}

async fn index() -> &'static str {
	INDEX
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthReport>, ApiError> {
	match state.service.ping().await {
		Ok(report) => Ok(Json(report)),
		Err(err) => {
			tracing::error!(error = %err, "Health check failed.");

			Err(json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", err.to_string()))
		},
	}
}

async fn info(State(state): State<AppState>) -> Result<Json<StoreInfo>, ApiError> {
	let info = state.service.info().await?;

	Ok(Json(info))
}

async fn by_id(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
	let resolution = state.service.resolve(&id).await?;
	let status = match resolution {
		Resolution::NoRelated { .. } => StatusCode::NOT_FOUND,
		Resolution::Cached(_) | Resolution::Resolved(_) => StatusCode::OK,
	};
	let body = resolution.into_body()?;

	Ok((status, [(header::CONTENT_TYPE, "application/json")], body).into_response())
}

async fn by_doi(
	State(state): State<AppState>,
	Path(doi): Path<String>,
) -> Result<Response, ApiError> {
	let id = state.service.resolve_doi(&doi).await?;
	// One path segment, so `/` and non-ASCII bytes in the id are escaped.
	let path = format!("/id/{}", urlencoding::encode(&id));
	let location = HeaderValue::try_from(path).map_err(|err| {
		json_error(StatusCode::INTERNAL_SERVER_ERROR, "invalid_identifier", err.to_string())
	})?;

	Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
}

#[derive(Debug, Serialize)]
struct CacheSize {
	count: usize,
}

/// Empty body when caching is disabled.
async fn cache_size(State(state): State<AppState>) -> Response {
	match state.service.cache_size() {
		Some(count) => Json(CacheSize { count }).into_response(),
		None => StatusCode::OK.into_response(),
	}
}

async fn flush_cache(State(state): State<AppState>) -> StatusCode {
	state.service.flush_cache();

	StatusCode::NO_CONTENT
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	/// `None` renders a bare status.
	body: Option<ErrorBody>,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			status,
			body: Some(ErrorBody { error_code: error_code.into(), message: message.into() }),
		}
	}

	fn bare(status: StatusCode) -> Self {
		Self { status, body: None }
	}
}

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError::new(status, code, message)
}

impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::NotFound { message } => json_error(StatusCode::NOT_FOUND, "not_found", message),
			Error::Canceled => {
				tracing::debug!("Request canceled.");

				ApiError::bare(StatusCode::REQUEST_TIMEOUT)
			},
			err @ (Error::Storage { .. } | Error::IndexData { .. }) => {
				tracing::error!(error = %err, "Backing store failed.");

				json_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					"backing_store_unavailable",
					err.to_string(),
				)
			},
			err @ Error::InvariantViolation { .. } => json_error(
				StatusCode::INTERNAL_SERVER_ERROR,
				"invariant_violation",
				err.to_string(),
			),
			err @ Error::Encode { .. } => {
				tracing::error!(error = %err, "Response encoding failed.");

				json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", err.to_string())
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		match self.body {
			Some(body) => (self.status, Json(body)).into_response(),
			None => self.status.into_response(),
		}
	}
}
