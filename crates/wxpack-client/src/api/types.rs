//! Wire types for the wxpack backend API

use serde::{Deserialize, Serialize};

/// Response to a job submission.
///
/// A non-2xx status is a transport error; `success: false` with a 2xx status
/// is a normal response the caller branches on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub success: bool,
    #[serde(default)]
    pub task_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

/// Discriminant of a progress-stream message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressEventKind {
    Progress,
    Complete,
    Error,
}

impl ProgressEventKind {
    /// Terminal events end the stream
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }
}

/// One message from the per-task progress stream.
///
/// Everything but the discriminant is defaulted so partial server payloads
/// still deserialize. Stage labels are server-authored and passed through
/// verbatim, which keeps the client compatible with new backend stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    #[serde(rename = "type")]
    pub kind: ProgressEventKind,
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub percent: f64,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Liveness probe response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}
