//! Orchestration of check, interactive, pull and hook passes

pub mod orchestrator;
pub mod outcome;

pub use orchestrator::SyncOrchestrator;
pub use outcome::{RepoFailure, SyncOutcome};
