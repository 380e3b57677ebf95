//! Application layer with search orchestration and supporting services.

/// Search state machine.
pub mod search;
/// Supporting services.
pub mod services;

pub use search::{SearchOrchestrator, SearchSnapshot, SearchState};
pub use services::{Debouncer, GenreDirectory};
