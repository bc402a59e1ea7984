//! Observable task state
//!
//! One `UploadState` per orchestrator, replaced wholesale on every
//! transition so readers always see a coherent snapshot.

use serde::Serialize;

use crate::api::{ProgressEvent, ProgressEventKind};

/// Fallback when a failure carries no usable cause text
const UNKNOWN_ERROR: &str = "unknown error";

/// Snapshot of one in-flight or finished task.
///
/// At most one of `error` and `is_complete` is set at a time. `task_id` is
/// recorded at job creation and never changes within a task's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadState {
    /// True from submission until a terminal transition
    pub is_uploading: bool,
    /// Latest reported percent, trusted verbatim from the server
    pub progress: f64,
    /// Server-authored stage label, or one of the client markers
    /// (`uploading`, `processing`, `completed`, `error`); empty at rest
    pub stage: String,
    /// Human-readable status, last value wins
    pub message: String,
    /// Number of files in the result, set on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_count: Option<u32>,
    /// Derived location of the result, set on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    /// Failure description, set on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Server-assigned task identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    /// True only after successful completion
    pub is_complete: bool,
}

impl UploadState {
    /// State while the package is being sent
    pub(crate) fn uploading() -> Self {
        Self {
            is_uploading: true,
            stage: "uploading".to_string(),
            message: "Uploading file...".to_string(),
            ..Self::default()
        }
    }

    /// Terminal failure shape shared by every failure origin
    pub(crate) fn failed(message: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            stage: "error".to_string(),
            message: message.into(),
            error: Some(if error.is_empty() {
                UNKNOWN_ERROR.to_string()
            } else {
                error
            }),
            ..Self::default()
        }
    }

    /// Record the created task and move into the processing stage
    pub(crate) fn begin_processing(&mut self, task_id: &str) {
        self.task_id = Some(task_id.to_string());
        self.stage = "processing".to_string();
        self.message = "Processing started...".to_string();
    }

    /// Apply one stream event; later events always overwrite earlier state.
    ///
    /// Progress values are not clamped or reordered, and stage labels are
    /// not reinterpreted. `download_url` is the derived result location for
    /// a completion, absent when the event carries no task id.
    pub(crate) fn apply_event(&mut self, event: &ProgressEvent, download_url: Option<String>) {
        match event.kind {
            ProgressEventKind::Progress => {
                self.progress = event.percent;
                self.stage = event.stage.clone();
                self.message = event.message.clone();
            }
            ProgressEventKind::Complete => {
                *self = Self {
                    progress: 100.0,
                    stage: "completed".to_string(),
                    message: event.message.clone(),
                    file_count: event.file_count,
                    download_url,
                    task_id: event.task_id.clone(),
                    is_complete: true,
                    ..Self::default()
                };
            }
            ProgressEventKind::Error => {
                *self = Self::failed(
                    event.message.clone(),
                    event.error.clone().unwrap_or_default(),
                );
            }
        }
    }
}
