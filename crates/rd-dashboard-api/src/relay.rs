use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use rd_core::metrics;
use reqwest::Url;
use serde::de::IgnoredAny;
use serde_json::json;
use thiserror::Error;

use crate::{AppState, SERVICE_NAME};

pub const BACKEND_UNREACHABLE: &str = "Failed to reach backend";
const CALLS_PATH: [&str; 2] = ["api", "calls"];

/// A backend response carried back untouched: status, content type and raw
/// body bytes. The body is never parsed.
#[derive(Debug)]
pub struct Passthrough {
    status: StatusCode,
    content_type: HeaderValue,
    body: Bytes,
}

impl Passthrough {
    async fn from_backend(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("application/json"));
        let body = response.bytes().await?;
        Ok(Self {
            status,
            content_type,
            body,
        })
    }
}

impl IntoResponse for Passthrough {
    fn into_response(self) -> Response {
        (self.status, [(CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

/// Why the relay answered locally. Every variant renders the same envelope;
/// the detail only goes to the log.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid backend url: {0}")]
    BackendUrl(String),
    #[error("call id is not a valid path segment: {0}")]
    InvalidPath(#[source] PathRejection),
    #[error("request body could not be read: {0}")]
    UnreadableBody(#[source] BytesRejection),
    #[error("request body is not JSON: {0}")]
    InvalidBody(#[source] serde_json::Error),
    #[error("backend request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": BACKEND_UNREACHABLE })),
        )
            .into_response()
    }
}

pub(crate) async fn list_calls(State(state): State<AppState>) -> Result<Passthrough, RelayError> {
    relay(&state, "list_calls", Method::GET, None, None).await
}

// Extractor rejections are taken as values so they render the relay envelope
// instead of axum's plain-text 400/413 bodies.
pub(crate) async fn get_call(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Passthrough, RelayError> {
    let id = call_id("get_call", id)?;
    relay(&state, "get_call", Method::GET, Some(&id), None).await
}

pub(crate) async fn update_call(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Passthrough, RelayError> {
    let id = call_id("update_call", id)?;
    let body = body
        .map_err(RelayError::UnreadableBody)
        .and_then(|body| {
            serde_json::from_slice::<IgnoredAny>(&body)
                .map(|_| body)
                .map_err(RelayError::InvalidBody)
        });
    let body = match body {
        Ok(body) => body,
        Err(err) => {
            tracing::warn!(
                operation = "update_call",
                call_id = %id,
                error = %err,
                "backend relay skipped"
            );
            metrics::inc_backend_relay(
                SERVICE_NAME,
                "update_call",
                metrics::RELAY_RESULT_REJECTED_BODY,
            );
            return Err(err);
        }
    };
    relay(&state, "update_call", Method::PATCH, Some(&id), Some(body)).await
}

fn call_id(
    operation: &'static str,
    id: Result<Path<String>, PathRejection>,
) -> Result<String, RelayError> {
    match id {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => {
            let err = RelayError::InvalidPath(rejection);
            tracing::warn!(operation, error = %err, "backend relay skipped");
            metrics::inc_backend_relay(
                SERVICE_NAME,
                operation,
                metrics::RELAY_RESULT_REJECTED_PATH,
            );
            Err(err)
        }
    }
}

/// `{base}/api/calls` or `{base}/api/calls/{id}`, with `id` encoded as one segment.
pub fn calls_url(base: &str, id: Option<&str>) -> Result<Url, RelayError> {
    let mut url = Url::parse(base).map_err(|err| RelayError::BackendUrl(err.to_string()))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| RelayError::BackendUrl(format!("{base} cannot be a base url")))?;
        segments.pop_if_empty().extend(CALLS_PATH);
        if let Some(id) = id {
            segments.push(id);
        }
    }
    Ok(url)
}

async fn relay(
    state: &AppState,
    operation: &'static str,
    method: Method,
    id: Option<&str>,
    body: Option<Bytes>,
) -> Result<Passthrough, RelayError> {
    let result = forward(state, method, id, body).await;
    match &result {
        Ok(passthrough) => {
            tracing::debug!(operation, status = passthrough.status.as_u16(), "backend relayed");
            metrics::inc_backend_relay(SERVICE_NAME, operation, metrics::RELAY_RESULT_RELAYED);
        }
        Err(err) => {
            tracing::error!(
                operation,
                call_id = id.unwrap_or("-"),
                error = %err,
                "backend relay failed"
            );
            metrics::inc_backend_relay(SERVICE_NAME, operation, metrics::RELAY_RESULT_UNREACHABLE);
        }
    }
    result
}

async fn forward(
    state: &AppState,
    method: Method,
    id: Option<&str>,
    body: Option<Bytes>,
) -> Result<Passthrough, RelayError> {
    let settings = state.settings.get().await;
    let url = calls_url(&settings.backend_url, id)?;

    let mut request = state
        .backend
        .request(method, url)
        .header(CACHE_CONTROL, "no-store");
    if let Some(body) = body {
        request = request
            .header(CONTENT_TYPE, "application/json")
            .body(body);
    }

    let response = request.send().await.map_err(RelayError::Transport)?;
    Passthrough::from_backend(response)
        .await
        .map_err(RelayError::Transport)
}
