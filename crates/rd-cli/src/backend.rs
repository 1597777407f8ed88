use rd_calls::{CallPatch, CallRecord};
use rd_dashboard_api::relay::calls_url;
use reqwest::header::CACHE_CONTROL;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
    #[error("failed to reach backend: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected backend payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Typed client for the call-record backend. One attempt per call, no retries.
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// A payload that is not a JSON array is treated as an empty list.
    pub async fn list_calls(&self) -> Result<Vec<CallRecord>, BackendError> {
        let response = self
            .http
            .get(self.url(None)?)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;
        let payload: Value = read_json(response).await?;
        match payload {
            Value::Array(_) => Ok(serde_json::from_value(payload)?),
            other => {
                tracing::warn!(kind = json_kind(&other), "backend call list was not an array");
                Ok(Vec::new())
            }
        }
    }

    pub async fn get_call(&self, id: &str) -> Result<CallRecord, BackendError> {
        let response = self
            .http
            .get(self.url(Some(id))?)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn update_call(
        &self,
        id: &str,
        patch: &CallPatch,
    ) -> Result<CallRecord, BackendError> {
        let response = self
            .http
            .patch(self.url(Some(id))?)
            .json(patch)
            .send()
            .await?;
        read_json(response).await
    }

    fn url(&self, id: Option<&str>) -> Result<Url, BackendError> {
        calls_url(&self.base_url, id).map_err(|err| BackendError::InvalidUrl(err.to_string()))
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        return Err(BackendError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }
    Ok(serde_json::from_slice(&body)?)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
