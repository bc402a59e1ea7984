//! Client-side orchestration for a remote wxapkg processing service.
//!
//! A package is submitted to the backend with [`TaskOrchestrator::submit`];
//! the backend processes it in stages (decrypt, unpack, repackage) and
//! reports progress over a server-push event stream. The orchestrator folds
//! those events into a single observable [`UploadState`] that a presentation
//! layer can poll at any time.

pub mod api;
pub mod task;

pub use api::{
    ApiClient, EventCallback, HealthStatus, JobResponse, ProgressEvent, ProgressEventKind,
    Subscription, Transport, TransportError,
};
pub use task::{SubmitOptions, TaskOrchestrator, UploadState};
