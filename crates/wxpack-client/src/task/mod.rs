//! Task orchestration
//!
//! The state machine that folds transport events into one observable task
//! state.

mod orchestrator;
mod state;

pub use orchestrator::{SubmitOptions, TaskOrchestrator};
pub use state::UploadState;
