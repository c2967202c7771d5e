//! Core logic for the RPM matrix: generation, progress, state machine.

pub mod generate;
pub mod progress;
pub mod state;

pub use generate::{GenerateError, GeminiClient, GeminiConfig, PlanGenerator};
pub use progress::{Progress, TopReason};
pub use state::{AppState, Effect, Msg, Phase, ValidationError, reduce};
