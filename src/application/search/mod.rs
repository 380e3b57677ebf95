//! Search orchestration: the state machine behind the result list.

mod orchestrator;
mod state;

pub use orchestrator::SearchOrchestrator;
pub use state::{Aggregate, Operation, OperationFailure, SearchSnapshot, SearchState};
