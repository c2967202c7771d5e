//! `rpm generate` command: build a new matrix without the dashboard.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::info;

use rpm_core::generate::{GeminiClient, PlanGenerator};
use rpm_core::state::{AppState, Effect, Msg, apply_storage_effect, reduce, run_generation};
use rpm_store::{SnapshotStore, Storage, open_store};

use crate::config::RpmConfig;
use crate::status_cmd::render_summary;

/// Take a field's text from the inline flag, a file, or stdin when the file
/// is `-`. Neither given yields an empty string.
pub fn read_input(inline: Option<String>, file: Option<&Path>) -> Result<String> {
    match (inline, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) if path == Path::new("-") => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        (None, None) => Ok(String::new()),
    }
}

/// Run the generate command against Gemini and print the new matrix.
pub async fn run_generate(config: &RpmConfig, tasks: String, goals: String) -> Result<()> {
    let store = open_store(&config.store);
    let generator = GeminiClient::new(config.gemini.clone());
    eprintln!("Consulting the Council of Sages...");
    let state = generate_into(&store, &generator, tasks, goals).await?;
    if let Some(plan) = state.plan.as_ref() {
        print!("{}", render_summary(plan, &state.completion));
    }
    Ok(())
}

/// Drive one generation through the reducer, running its effects inline.
///
/// On success the new plan replaces whatever was saved and completion
/// starts empty. On failure nothing is written and the user-facing message
/// becomes the error.
pub async fn generate_into<S: Storage>(
    store: &SnapshotStore<S>,
    generator: &dyn PlanGenerator,
    tasks: String,
    goals: String,
) -> Result<AppState> {
    let mut state = AppState::restore(store.load());
    reduce(&mut state, Msg::EditTasks(tasks));
    reduce(&mut state, Msg::EditGoals(goals));

    let mut queue = vec![Msg::Generate];
    while let Some(msg) = queue.pop() {
        for effect in reduce(&mut state, msg) {
            match effect {
                Effect::StartGeneration {
                    request,
                    tasks,
                    goals,
                } => {
                    info!(generator = generator.name(), request, "starting generation");
                    queue.push(run_generation(generator, request, &tasks, &goals).await);
                }
                other => {
                    apply_storage_effect(store, &other).context("failed to save matrix")?;
                }
            }
        }
    }

    if let Some(message) = state.error.take() {
        bail!(message);
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rpm_core::generate::GenerateError;
    use rpm_core::state::EMPTY_INPUT_MESSAGE;
    use rpm_store::MemoryStorage;
    use rpm_store::models::{Framework, ReasonItem, RpmCategory, RpmPlan};

    struct FixedGenerator(Result<RpmPlan, String>);

    #[async_trait]
    impl PlanGenerator for FixedGenerator {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn generate(&self, _tasks: &str, _goals: &str) -> Result<RpmPlan, GenerateError> {
            self.0.clone().map_err(GenerateError::Generation)
        }
    }

    fn plan() -> RpmPlan {
        RpmPlan {
            categories: vec![RpmCategory {
                id: "c1".into(),
                name: "Wealth".into(),
                outcome: "o".into(),
                purpose: "p".into(),
                reasons: vec![ReasonItem {
                    id: "r1".into(),
                    description: "ship it".into(),
                    framework: Framework::QuantumEconomics,
                    is_brainstormed: true,
                }],
            }],
            daily_top5_ids: vec!["r1".into()],
        }
    }

    #[tokio::test]
    async fn success_saves_new_plan() {
        let store = SnapshotStore::new(MemoryStorage::new());
        let generator = FixedGenerator(Ok(plan()));

        let state = generate_into(&store, &generator, "tasks".into(), String::new())
            .await
            .unwrap();

        assert_eq!(state.plan, Some(plan()));
        let saved = store.load().unwrap();
        assert_eq!(saved.plan, plan());
        assert!(saved.completion_status.is_empty());
    }

    #[tokio::test]
    async fn blank_inputs_fail_before_generating() {
        let store = SnapshotStore::new(MemoryStorage::new());
        let generator = FixedGenerator(Ok(plan()));

        let err = generate_into(&store, &generator, "  ".into(), "\n".into())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), EMPTY_INPUT_MESSAGE);
        assert!(store.load().is_none());
    }

    #[tokio::test]
    async fn failure_reports_friendly_message() {
        let store = SnapshotStore::new(MemoryStorage::new());
        let generator = FixedGenerator(Err("boom".into()));

        let err = generate_into(&store, &generator, "tasks".into(), "goals".into())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to generate plan. Please try again.");
        assert!(store.load().is_none());
    }

    #[test]
    fn inline_text_wins_over_file() {
        let text = read_input(Some("inline".into()), Some(Path::new("/does/not/exist"))).unwrap();
        assert_eq!(text, "inline");
    }

    #[test]
    fn reads_text_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("dump.txt");
        std::fs::write(&path, "too many meetings").unwrap();
        assert_eq!(read_input(None, Some(&path)).unwrap(), "too many meetings");
        assert_eq!(read_input(None, None).unwrap(), "");
    }
}
