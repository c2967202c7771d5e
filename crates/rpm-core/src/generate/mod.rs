//! Plan generation through a hosted generative model.
//!
//! ```text
//! state machine --StartGeneration--> PlanGenerator::generate(tasks, goals)
//!                                         |
//!                                         v
//!                              GeminiClient (one HTTP round trip)
//!                                         |
//!                                         v
//!                              parse_plan_json (boundary validator)
//! ```

pub mod gemini;
pub mod parser;
pub mod prompt;
pub mod trait_def;

use thiserror::Error;

pub use gemini::{GeminiClient, GeminiConfig};
pub use parser::{PlanParseError, parse_plan_json};
pub use prompt::{DAILY_TOP_COUNT, build_prompt, response_schema};
pub use trait_def::PlanGenerator;

/// Why a generation attempt failed.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// No API credential is configured. Not recoverable without outside action.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The remote call failed, or answered without usable text. Retrying may help.
    #[error("generation failed: {0}")]
    Generation(String),

    /// The answer did not match the plan shape.
    #[error(transparent)]
    Parse(#[from] PlanParseError),
}

impl GenerateError {
    /// The inline message shown to the user.
    ///
    /// Parse failures read the same as remote failures; the details go to the
    /// log instead.
    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration(_) => {
                "API key is missing. Set GEMINI_API_KEY or run `rpm init --api-key <KEY>`."
                    .to_string()
            }
            Self::Generation(_) | Self::Parse(_) => {
                "Failed to generate plan. Please try again.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for GenerateError {
    fn from(e: reqwest::Error) -> Self {
        Self::Generation(e.to_string())
    }
}
