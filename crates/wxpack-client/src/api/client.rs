//! HTTP client for the wxpack backend
//!
//! Wraps the compile/events/download/health endpoints. Owns no mutable
//! state beyond the base address; each progress stream runs on its own
//! spawned task and is torn down through the returned [`Subscription`].

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::error::TransportError;
use super::sse::SseDecoder;
use super::subscription::Subscription;
use super::types::{HealthStatus, JobResponse, ProgressEvent};

/// Callback invoked for every well-formed progress message
pub type EventCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Remote operations the orchestrator depends on
#[async_trait]
pub trait Transport: Send + Sync {
    /// Submit a package for processing.
    ///
    /// Fails only on transport problems; a `success: false` body is returned
    /// as a normal response for the caller to branch on.
    async fn submit_job(
        &self,
        file: Vec<u8>,
        app_id: Option<&str>,
        beautify: Option<bool>,
    ) -> Result<JobResponse, TransportError>;

    /// Open the progress stream for one task.
    ///
    /// `on_event` fires for every well-formed message, in delivery order.
    /// The stream closes itself after a terminal event; any transport-level
    /// stream error closes it without retry.
    fn open_progress_stream(&self, task_id: &str, on_event: EventCallback) -> Subscription;

    /// Location a completed result can be fetched from. Pure, no I/O.
    fn download_location(&self, task_id: &str) -> String;
}

/// Stateless client for the wxpack backend API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    /// Create a client for the given base address, e.g. `http://host/api`
    pub fn new(base: &str) -> Result<Self, TransportError> {
        // Validate early; endpoints are built by joining paths onto this.
        Url::parse(base)?;
        Ok(Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    /// Liveness probe, unrelated to the job lifecycle
    pub async fn health_check(&self) -> Result<HealthStatus, TransportError> {
        let response = self.http.get(self.endpoint("health")).send().await?;
        if !response.status().is_success() {
            return Err(TransportError::from_response(response).await);
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn submit_job(
        &self,
        file: Vec<u8>,
        app_id: Option<&str>,
        beautify: Option<bool>,
    ) -> Result<JobResponse, TransportError> {
        let mut form = Form::new().part("file", Part::bytes(file).file_name("package.wxapkg"));
        if let Some(app_id) = app_id {
            form = form.text("appId", app_id.to_string());
        }
        if let Some(beautify) = beautify {
            form = form.text("beautify", beautify.to_string());
        }

        debug!("submitting job to {}", self.endpoint("compile"));
        let response = self
            .http
            .post(self.endpoint("compile"))
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TransportError::from_response(response).await);
        }
        Ok(response.json().await?)
    }

    fn open_progress_stream(&self, task_id: &str, on_event: EventCallback) -> Subscription {
        let token = CancellationToken::new();
        let url = match Url::parse_with_params(&self.endpoint("events"), &[("taskId", task_id)]) {
            Ok(url) => url,
            Err(err) => {
                warn!("invalid events url for task {task_id}: {err}");
                token.cancel();
                return Subscription::new(token);
            }
        };

        let http = self.http.clone();
        let task_id = task_id.to_string();
        let stream_token = token.clone();
        tokio::spawn(async move {
            let response = match http.get(url).send().await {
                Ok(response) if response.status().is_success() => response,
                Ok(response) => {
                    warn!(
                        "progress stream for task {task_id} rejected with status {}",
                        response.status()
                    );
                    return;
                }
                Err(err) => {
                    warn!("progress stream for task {task_id} failed to open: {err}");
                    return;
                }
            };

            info!("progress stream opened for task {task_id}");
            let mut body = response.bytes_stream();
            let mut decoder = SseDecoder::new();
            loop {
                tokio::select! {
                    _ = stream_token.cancelled() => {
                        debug!("progress stream for task {task_id} cancelled");
                        break;
                    }
                    chunk = body.next() => match chunk {
                        Some(Ok(bytes)) => {
                            for event in decoder.push_chunk(&bytes) {
                                let terminal = event.kind.is_terminal();
                                on_event(event);
                                if terminal {
                                    info!("progress stream for task {task_id} finished");
                                    return;
                                }
                            }
                        }
                        Some(Err(err)) => {
                            // Closed without a terminal event; no failure is
                            // forced here, the task state simply stops moving.
                            warn!("progress stream for task {task_id} errored: {err}");
                            break;
                        }
                        None => {
                            debug!("progress stream for task {task_id} closed by server");
                            break;
                        }
                    }
                }
            }
        });

        Subscription::new(token)
    }

    fn download_location(&self, task_id: &str) -> String {
        self.endpoint(&format!("download/{task_id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalized() {
        let client = ApiClient::new("http://localhost:8080/api/").unwrap();
        assert_eq!(client.endpoint("compile"), "http://localhost:8080/api/compile");
        assert_eq!(client.endpoint("/health"), "http://localhost:8080/api/health");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(TransportError::BaseUrl(_))
        ));
    }

    #[test]
    fn test_download_location_is_pure() {
        let client = ApiClient::new("http://localhost:8080/api").unwrap();
        assert_eq!(
            client.download_location("T1"),
            "http://localhost:8080/api/download/T1"
        );
    }
}
