//! Task orchestrator
//!
//! Drives one submission through the remote processing stages: create the
//! job, subscribe to its progress stream, fold every inbound event into the
//! owned [`UploadState`]. Resubmitting or resetting always tears the
//! previous stream down first, so at most one stream is ever live.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use super::state::UploadState;
use crate::api::{ProgressEventKind, Subscription, Transport};

/// Optional parameters for a submission
#[derive(Debug, Clone, Default)]
pub struct SubmitOptions {
    /// Mini-program app id forwarded to the backend
    pub app_id: Option<String>,
    /// Whether the backend should beautify the repacked sources
    pub beautify: Option<bool>,
}

/// Orchestrates one remote processing task at a time
pub struct TaskOrchestrator {
    transport: Arc<dyn Transport>,
    state: Arc<Mutex<UploadState>>,
    subscription: Option<Subscription>,
}

impl TaskOrchestrator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            state: Arc::new(Mutex::new(UploadState::default())),
            subscription: None,
        }
    }

    /// Snapshot of the current task state
    pub fn state(&self) -> UploadState {
        self.state.lock().clone()
    }

    /// Submit a package and start tracking its progress.
    ///
    /// Never fails outward: a transport error and a `success: false` answer
    /// both collapse into the same failed state shape, with the raw cause in
    /// `error`. Returns the snapshot taken right after submission settled.
    pub async fn submit(&mut self, file: Vec<u8>, options: SubmitOptions) -> UploadState {
        // At most one live stream per orchestrator.
        self.cancel_subscription();
        *self.state.lock() = UploadState::uploading();

        let response = match self
            .transport
            .submit_job(file, options.app_id.as_deref(), options.beautify)
            .await
        {
            Ok(response) if response.success => response,
            Ok(response) => {
                warn!("job creation rejected: {}", response.message);
                *self.state.lock() =
                    UploadState::failed("Upload failed, please retry", response.message);
                return self.state();
            }
            Err(err) => {
                warn!("job creation failed: {err}");
                *self.state.lock() =
                    UploadState::failed("Upload failed, please retry", err.to_string());
                return self.state();
            }
        };

        info!("job created with task id {}", response.task_id);
        self.state.lock().begin_processing(&response.task_id);

        let state = Arc::clone(&self.state);
        let transport = Arc::clone(&self.transport);
        let subscription = self.transport.open_progress_stream(
            &response.task_id,
            Box::new(move |event| {
                let download_url = match event.kind {
                    ProgressEventKind::Complete => event
                        .task_id
                        .as_deref()
                        .map(|id| transport.download_location(id)),
                    _ => None,
                };
                state.lock().apply_event(&event, download_url);
            }),
        );
        self.subscription = Some(subscription);

        self.state()
    }

    /// Drop any open subscription and return to the idle state
    pub fn reset(&mut self) {
        self.cancel_subscription();
        *self.state.lock() = UploadState::default();
    }

    fn cancel_subscription(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
    }
}
