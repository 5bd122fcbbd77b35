//! Typed client for the async conversion API.
//!
//! Wraps a [`Transport`] with URL construction, JSON encoding and request
//! signing. Each method is one row of the backend's HTTP contract and
//! returns the raw [`TransportError`]; the pipeline stages decide which
//! workflow error it becomes.

use percent_encoding::percent_decode_str;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{Doc2MdError, TransportError};
use crate::protocol::{
    CreateTaskRequest, CreateTaskResponse, DeleteTaskResponse, DownloadDescriptor, HealthStatus,
    TaskStatusResponse, UploadSlot, UploadUrlRequest,
};
use crate::signer::RequestSigner;
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// Signed access to the backend endpoints.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    signer: RequestSigner,
    transport: Arc<dyn Transport>,
    request_timeout: Duration,
    transfer_timeout: Duration,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("signer", &self.signer)
            .finish()
    }
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        signer: RequestSigner,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, Doc2MdError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            Doc2MdError::InvalidConfig(format!("base URL '{}' is invalid: {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Doc2MdError::InvalidConfig(format!(
                "base URL '{}' cannot carry a path",
                config.base_url
            )));
        }
        Ok(Self {
            base_url,
            signer,
            transport,
            request_timeout: config.request_timeout,
            transfer_timeout: config.transfer_timeout,
        })
    }

    /// Append path segments to the base URL, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "cannot be a base".into(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sign and send a request to an API endpoint, returning the raw response.
    async fn signed(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<String>,
    ) -> Result<HttpResponse, TransportError> {
        let url = self.endpoint(segments)?;
        let body = body.unwrap_or_default();
        // The server authenticates against the decoded request path.
        let path = percent_decode_str(url.path()).decode_utf8_lossy();
        let signed = self.signer.sign(method.as_str(), &path, &body);

        let mut request = HttpRequest::new(method, url.as_str()).timeout(self.request_timeout);
        for (name, value) in signed.headers() {
            request = request.header(name, value);
        }
        if !body.is_empty() {
            request = request.header("Content-Type", "application/json").body(body);
        }

        self.transport.send(request).await?.error_for_status()
    }

    async fn signed_json<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<String>,
    ) -> Result<T, TransportError> {
        self.signed(method, segments, body).await?.json()
    }

    fn encode<T: serde::Serialize>(value: &T) -> Result<String, TransportError> {
        serde_json::to_string(value).map_err(|e| TransportError::Decode(e.to_string()))
    }

    pub async fn request_upload_slot(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<UploadSlot, TransportError> {
        let body = Self::encode(&UploadUrlRequest {
            filename,
            content_type,
        })?;
        debug!("Requesting upload slot for {}", filename);
        self.signed_json(Method::POST, &["upload-url"], Some(body)).await
    }

    /// Unsigned PUT of the raw bytes to a presigned storage URL.
    pub async fn transfer(
        &self,
        upload_url: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), TransportError> {
        Url::parse(upload_url).map_err(|e| TransportError::InvalidUrl {
            url: upload_url.to_string(),
            reason: e.to_string(),
        })?;
        let request = HttpRequest::new(Method::PUT, upload_url)
            .header("Content-Type", content_type)
            .body(bytes)
            .timeout(self.transfer_timeout);
        self.transport.send(request).await?.error_for_status()?;
        Ok(())
    }

    pub async fn create_task(
        &self,
        object_name: &str,
        original_filename: &str,
        extract_images: bool,
        user_id: Option<&str>,
    ) -> Result<CreateTaskResponse, TransportError> {
        let body = Self::encode(&CreateTaskRequest {
            object_name,
            original_filename,
            extract_images,
            user_id,
        })?;
        self.signed_json(Method::POST, &["create-task"], Some(body)).await
    }

    pub async fn task_status(&self, task_id: &str) -> Result<TaskStatusResponse, TransportError> {
        self.signed_json(Method::GET, &["task", task_id], None).await
    }

    pub async fn download_descriptor(
        &self,
        task_id: &str,
    ) -> Result<DownloadDescriptor, TransportError> {
        self.signed_json(Method::GET, &["download", task_id], None).await
    }

    /// Unsigned GET of a converted artifact.
    pub async fn fetch_artifact(&self, download_url: &str) -> Result<String, TransportError> {
        Url::parse(download_url).map_err(|e| TransportError::InvalidUrl {
            url: download_url.to_string(),
            reason: e.to_string(),
        })?;
        let request = HttpRequest::new(Method::GET, download_url).timeout(self.request_timeout);
        let response = self.transport.send(request).await?.error_for_status()?;
        String::from_utf8(response.body)
            .map_err(|e| TransportError::Decode(format!("artifact is not UTF-8: {e}")))
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<DeleteTaskResponse, TransportError> {
        let response = self.signed(Method::DELETE, &["task", task_id], None).await?;
        if response.body.is_empty() {
            return Ok(DeleteTaskResponse::default());
        }
        response.json()
    }

    /// Unsigned; the backend exempts `/health` from authentication.
    pub async fn health(&self) -> Result<HealthStatus, TransportError> {
        let url = self.endpoint(&["health"])?;
        let request = HttpRequest::new(Method::GET, url.as_str()).timeout(self.request_timeout);
        self.transport.send(request).await?.error_for_status()?.json()
    }
}
