//! Application state machine.
//!
//! All state lives in one [`AppState`]. Every change goes through
//! [`reduce`], which returns the side effects the caller must run:
//!
//! ```text
//! Input   --Generate (valid)------> Input + loading   [StartGeneration]
//! loading --GenerationFinished ok-> Results           [Persist]
//! loading --GenerationFinished err> Input + error
//! Results --Toggle----------------> Results           [Persist]
//! Results --RequestReset----------> Results + confirm
//! confirm --ConfirmReset----------> Input             [ClearStorage]
//! confirm --CancelReset-----------> Results
//! ```
//!
//! Every generation carries a request number. A reset or a newer request
//! makes older numbers stale, and a stale `GenerationFinished` is dropped.

pub mod effects;

use thiserror::Error;
use tracing::{debug, info};

use rpm_store::models::{CompletionState, RpmPlan, Snapshot};

use crate::generate::GenerateError;

pub use effects::{apply_storage_effect, run_generation};

/// Shown when generate is requested with both fields blank.
pub const EMPTY_INPUT_MESSAGE: &str = "Please enter what's on your mind first.";

/// Input rejected before any generation is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter what's on your mind first.")]
    EmptyInput,
}

/// At least one of the two fields must hold non-whitespace text.
pub fn validate_inputs(tasks: &str, goals: &str) -> Result<(), ValidationError> {
    if tasks.trim().is_empty() && goals.trim().is_empty() {
        return Err(ValidationError::EmptyInput);
    }
    Ok(())
}

/// Top-level view, derived from whether a plan is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Input,
    Results,
}

/// Inputs to the state machine.
#[derive(Debug)]
pub enum Msg {
    EditTasks(String),
    EditGoals(String),
    Generate,
    GenerationFinished {
        request: u64,
        result: Result<RpmPlan, GenerateError>,
    },
    Toggle(String),
    RequestReset,
    ConfirmReset,
    CancelReset,
}

/// Side effects requested by [`reduce`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartGeneration {
        request: u64,
        tasks: String,
        goals: String,
    },
    Persist(Snapshot),
    ClearStorage,
}

/// Complete application state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub tasks: String,
    pub goals: String,
    pub plan: Option<RpmPlan>,
    pub completion: CompletionState,
    pub loading: bool,
    pub error: Option<String>,
    /// A reset is waiting for the user's confirmation.
    pub reset_pending: bool,
    /// Number of the request whose answer is still wanted.
    pending_request: Option<u64>,
    next_request: u64,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a stored snapshot, if any. With one the state opens in
    /// [`Phase::Results`].
    pub fn restore(snapshot: Option<Snapshot>) -> Self {
        let mut state = Self::new();
        if let Some(snapshot) = snapshot {
            state.plan = Some(snapshot.plan);
            state.completion = snapshot.completion_status;
        }
        state
    }

    pub fn phase(&self) -> Phase {
        if self.plan.is_some() {
            Phase::Results
        } else {
            Phase::Input
        }
    }

    /// The pair to persist, when a plan is present.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.plan.as_ref().map(|plan| Snapshot {
            plan: plan.clone(),
            completion_status: self.completion.clone(),
        })
    }

    pub fn pending_request(&self) -> Option<u64> {
        self.pending_request
    }

    fn persist(&self) -> Vec<Effect> {
        self.snapshot().map(Effect::Persist).into_iter().collect()
    }
}

/// Apply `msg` to `state` and return the effects to run.
pub fn reduce(state: &mut AppState, msg: Msg) -> Vec<Effect> {
    match msg {
        Msg::EditTasks(text) => {
            state.tasks = text;
            Vec::new()
        }
        Msg::EditGoals(text) => {
            state.goals = text;
            Vec::new()
        }
        Msg::Generate => start_generation(state),
        Msg::GenerationFinished { request, result } => finish_generation(state, request, result),
        Msg::Toggle(id) => {
            if state.plan.is_none() {
                return Vec::new();
            }
            let done = state.completion.toggle(&id);
            debug!(reason = %id, done, "toggled reason");
            state.persist()
        }
        Msg::RequestReset => {
            if state.plan.is_some() {
                state.reset_pending = true;
            }
            Vec::new()
        }
        Msg::CancelReset => {
            state.reset_pending = false;
            Vec::new()
        }
        Msg::ConfirmReset => {
            if !state.reset_pending {
                return Vec::new();
            }
            info!("matrix reset");
            let next_request = state.next_request;
            *state = AppState {
                next_request,
                ..AppState::new()
            };
            vec![Effect::ClearStorage]
        }
    }
}

fn start_generation(state: &mut AppState) -> Vec<Effect> {
    if state.loading {
        return Vec::new();
    }
    if let Err(e) = validate_inputs(&state.tasks, &state.goals) {
        state.error = Some(e.to_string());
        return Vec::new();
    }

    state.next_request += 1;
    let request = state.next_request;
    state.pending_request = Some(request);
    state.loading = true;
    state.error = None;

    vec![Effect::StartGeneration {
        request,
        tasks: state.tasks.clone(),
        goals: state.goals.clone(),
    }]
}

fn finish_generation(
    state: &mut AppState,
    request: u64,
    result: Result<RpmPlan, GenerateError>,
) -> Vec<Effect> {
    if state.pending_request != Some(request) {
        debug!(request, "discarding stale generation result");
        return Vec::new();
    }
    state.pending_request = None;
    state.loading = false;

    match result {
        Ok(plan) => {
            state.plan = Some(plan);
            state.completion.clear();
            state.error = None;
            state.reset_pending = false;
            state.persist()
        }
        Err(e) => {
            state.error = Some(e.user_message());
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rpm_store::models::{Framework, ReasonItem, RpmCategory};

    fn plan(ids: &[&str]) -> RpmPlan {
        RpmPlan {
            categories: vec![RpmCategory {
                id: "c1".into(),
                name: "Health".into(),
                outcome: "o".into(),
                purpose: "p".into(),
                reasons: ids
                    .iter()
                    .map(|id| ReasonItem {
                        id: id.to_string(),
                        description: "d".into(),
                        framework: Framework::HumanNeeds,
                        is_brainstormed: true,
                    })
                    .collect(),
            }],
            daily_top5_ids: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn request_of(effects: &[Effect]) -> u64 {
        match effects {
            [Effect::StartGeneration { request, .. }] => *request,
            other => panic!("expected one StartGeneration, got {other:?}"),
        }
    }

    fn generated_state(ids: &[&str]) -> AppState {
        let mut state = AppState::new();
        reduce(&mut state, Msg::EditTasks("stuck".into()));
        let request = request_of(&reduce(&mut state, Msg::Generate));
        reduce(
            &mut state,
            Msg::GenerationFinished {
                request,
                result: Ok(plan(ids)),
            },
        );
        state
    }

    #[test]
    fn blank_inputs_do_not_start_generation() {
        let mut state = AppState::new();
        reduce(&mut state, Msg::EditTasks("   ".into()));
        reduce(&mut state, Msg::EditGoals("\n".into()));

        let effects = reduce(&mut state, Msg::Generate);
        assert!(effects.is_empty());
        assert_eq!(state.error.as_deref(), Some(EMPTY_INPUT_MESSAGE));
        assert!(!state.loading);
        assert_eq!(state.phase(), Phase::Input);
    }

    #[test]
    fn validation_message_matches_inline_error() {
        assert_eq!(ValidationError::EmptyInput.to_string(), EMPTY_INPUT_MESSAGE);
        assert!(validate_inputs("", " x ").is_ok());
        assert_eq!(validate_inputs(" ", "\t"), Err(ValidationError::EmptyInput));
    }

    #[test]
    fn one_filled_field_is_enough() {
        let mut state = AppState::new();
        reduce(&mut state, Msg::EditGoals("Earn 10x".into()));
        let effects = reduce(&mut state, Msg::Generate);
        assert_eq!(
            effects,
            vec![Effect::StartGeneration {
                request: 1,
                tasks: String::new(),
                goals: "Earn 10x".into(),
            }]
        );
        assert!(state.loading);
    }

    #[test]
    fn generate_ignored_while_loading() {
        let mut state = AppState::new();
        reduce(&mut state, Msg::EditTasks("x".into()));
        assert_eq!(reduce(&mut state, Msg::Generate).len(), 1);
        assert!(reduce(&mut state, Msg::Generate).is_empty());
    }

    #[test]
    fn success_enters_results_with_empty_completion() {
        let mut state = AppState::new();
        state.completion.toggle("leftover");
        reduce(&mut state, Msg::EditTasks("x".into()));
        let request = request_of(&reduce(&mut state, Msg::Generate));

        let effects = reduce(
            &mut state,
            Msg::GenerationFinished {
                request,
                result: Ok(plan(&["a", "b"])),
            },
        );

        assert_eq!(state.phase(), Phase::Results);
        assert!(state.completion.is_empty());
        assert!(!state.loading);
        assert_eq!(
            effects,
            vec![Effect::Persist(Snapshot {
                plan: plan(&["a", "b"]),
                completion_status: CompletionState::new(),
            })]
        );
    }

    #[test]
    fn failure_keeps_input_state_and_sets_error() {
        let mut state = AppState::new();
        reduce(&mut state, Msg::EditTasks("x".into()));
        let request = request_of(&reduce(&mut state, Msg::Generate));

        let effects = reduce(
            &mut state,
            Msg::GenerationFinished {
                request,
                result: Err(GenerateError::Generation("HTTP 503".into())),
            },
        );

        assert!(effects.is_empty());
        assert_eq!(state.phase(), Phase::Input);
        assert_eq!(state.tasks, "x");
        assert!(!state.loading);
        assert_eq!(
            state.error.as_deref(),
            Some("Failed to generate plan. Please try again.")
        );
    }

    #[test]
    fn toggle_persists_and_is_involutive() {
        let mut state = generated_state(&["a", "b"]);

        let effects = reduce(&mut state, Msg::Toggle("a".into()));
        assert!(state.completion.is_done("a"));
        match effects.as_slice() {
            [Effect::Persist(snap)] => assert!(snap.completion_status.is_done("a")),
            other => panic!("expected Persist, got {other:?}"),
        }

        reduce(&mut state, Msg::Toggle("a".into()));
        assert!(!state.completion.is_done("a"));
    }

    #[test]
    fn toggle_without_plan_does_nothing() {
        let mut state = AppState::new();
        assert!(reduce(&mut state, Msg::Toggle("a".into())).is_empty());
        assert!(state.completion.is_empty());
    }

    #[test]
    fn reset_requires_confirmation() {
        let mut state = generated_state(&["a"]);
        reduce(&mut state, Msg::Toggle("a".into()));

        assert!(reduce(&mut state, Msg::ConfirmReset).is_empty());
        assert_eq!(state.phase(), Phase::Results);

        reduce(&mut state, Msg::RequestReset);
        assert!(state.reset_pending);
        reduce(&mut state, Msg::CancelReset);
        assert!(!state.reset_pending);
        assert_eq!(state.phase(), Phase::Results);
        assert!(state.completion.is_done("a"));
    }

    #[test]
    fn confirmed_reset_clears_everything() {
        let mut state = generated_state(&["a"]);
        reduce(&mut state, Msg::EditGoals("dreams".into()));
        reduce(&mut state, Msg::Toggle("a".into()));

        reduce(&mut state, Msg::RequestReset);
        let effects = reduce(&mut state, Msg::ConfirmReset);

        assert_eq!(effects, vec![Effect::ClearStorage]);
        assert_eq!(state.phase(), Phase::Input);
        assert!(state.tasks.is_empty());
        assert!(state.goals.is_empty());
        assert!(state.completion.is_empty());
        assert!(state.error.is_none());
    }

    #[test]
    fn late_response_after_reset_is_discarded() {
        let mut state = generated_state(&["a"]);
        reduce(&mut state, Msg::EditTasks("again".into()));
        let late = request_of(&reduce(&mut state, Msg::Generate));

        reduce(&mut state, Msg::RequestReset);
        reduce(&mut state, Msg::ConfirmReset);

        let effects = reduce(
            &mut state,
            Msg::GenerationFinished {
                request: late,
                result: Ok(plan(&["z"])),
            },
        );
        assert!(effects.is_empty());
        assert_eq!(state.phase(), Phase::Input);
        assert!(!state.loading);

        // Request numbers keep increasing across resets.
        reduce(&mut state, Msg::EditTasks("fresh".into()));
        assert!(request_of(&reduce(&mut state, Msg::Generate)) > late);
    }

    #[test]
    fn restore_opens_results() {
        let mut completion = CompletionState::new();
        completion.toggle("a");
        let state = AppState::restore(Some(Snapshot {
            plan: plan(&["a"]),
            completion_status: completion.clone(),
        }));
        assert_eq!(state.phase(), Phase::Results);
        assert_eq!(state.completion, completion);

        assert_eq!(AppState::restore(None).phase(), Phase::Input);
    }
}
