//! Transport layer for the wxpack backend
//!
//! Stateless HTTP client plus the SSE plumbing for per-task progress streams.

mod client;
mod error;
mod sse;
mod subscription;
mod types;

pub use client::{ApiClient, EventCallback, Transport};
pub use error::TransportError;
pub use subscription::Subscription;
pub use types::{HealthStatus, JobResponse, ProgressEvent, ProgressEventKind};
