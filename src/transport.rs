use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{
    multipart::{Form, Part},
    Method,
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};

const USER_AGENT: &str = concat!("nutriscan/", env!("CARGO_PKG_VERSION"));

/// One file part of a multipart upload.
#[derive(Debug, Clone)]
pub struct FormPart {
    pub field: &'static str,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL, e.g. `/scan/enhanced`.
    pub path: String,
    pub bearer: Option<String>,
    pub body: RequestBody,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>, body: RequestBody) -> Self {
        Self {
            method,
            path: path.into(),
            bearer: None,
            body,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path, RequestBody::Empty)
    }

    pub fn post_json(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::POST, path, RequestBody::Json(body))
    }

    pub fn put_json(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::PUT, path, RequestBody::Json(body))
    }

    pub fn multipart(path: impl Into<String>, parts: Vec<FormPart>) -> Self {
        Self::new(Method::POST, path, RequestBody::Multipart(parts))
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

/// Status and raw body; interpretation is left to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        serde_json::from_str(&self.body).map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }

    /// `error` (or `message`) field of a JSON error payload, else the raw body.
    pub fn error_message(&self) -> String {
        serde_json::from_str::<serde_json::Value>(&self.body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .or_else(|| v.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| self.body.clone())
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse>;
}

/// reqwest-backed transport. The timeout is the only deadline applied to
/// any backend call.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        let request_id = Uuid::new_v4();

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header("x-request-id", request_id.to_string());
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        debug!(%request_id, method = %request.method, url = %url, "sending request");
        let response = builder.send().await.map_err(|e| {
            warn!(%request_id, error = %e, timeout = e.is_timeout(), "request failed");
            ClientError::Network(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        debug!(%request_id, status, bytes = body.len(), "response received");
        Ok(ApiResponse { status, body })
    }
}

fn build_form(parts: Vec<FormPart>) -> ClientResult<Form> {
    let mut form = Form::new();
    for p in parts {
        let part = Part::bytes(p.bytes.to_vec())
            .file_name(p.file_name)
            .mime_str(&p.content_type)
            .map_err(|e| ClientError::Validation(format!("content type {}: {}", p.content_type, e)))?;
        form = form.part(p.field, part);
    }
    Ok(form)
}
