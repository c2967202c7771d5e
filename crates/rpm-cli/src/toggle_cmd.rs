//! `rpm toggle` command: flip one reason between pending and realized.

use anyhow::{Context, Result, bail};

use rpm_core::progress::plan_progress;
use rpm_core::state::{AppState, Msg, apply_storage_effect, reduce};
use rpm_store::{SnapshotStore, Storage};

use crate::status_cmd::NO_MATRIX_MESSAGE;

/// Toggle `reason_id` in the saved matrix and persist the result.
///
/// Returns the reason's new completion flag.
pub fn run_toggle<S: Storage>(store: &SnapshotStore<S>, reason_id: &str) -> Result<bool> {
    let mut state = AppState::restore(store.load());
    let Some(plan) = state.plan.as_ref() else {
        bail!(NO_MATRIX_MESSAGE);
    };
    let Some((_, reason)) = plan.find_reason(reason_id) else {
        bail!("no reason with ID `{reason_id}` in the saved matrix (see `rpm status`)");
    };
    let description = reason.description.clone();

    for effect in reduce(&mut state, Msg::Toggle(reason_id.to_string())) {
        apply_storage_effect(store, &effect).context("failed to save matrix")?;
    }

    let done = state.completion.is_done(reason_id);
    if let Some(plan) = state.plan.as_ref() {
        let progress = plan_progress(plan, &state.completion);
        let mark = if done { "[x]" } else { "[ ]" };
        println!("{mark} {description}");
        println!(
            "Internalization Level: {}% ({} / {})",
            progress.percent, progress.completed, progress.total
        );
    }
    Ok(done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpm_store::MemoryStorage;
    use rpm_store::models::{
        CompletionState, Framework, ReasonItem, RpmCategory, RpmPlan, Snapshot,
    };

    fn store_with_plan() -> SnapshotStore<MemoryStorage> {
        let store = SnapshotStore::new(MemoryStorage::new());
        let plan = RpmPlan {
            categories: vec![RpmCategory {
                id: "c1".into(),
                name: "Health".into(),
                outcome: "o".into(),
                purpose: "p".into(),
                reasons: vec![ReasonItem {
                    id: "r1".into(),
                    description: "move daily".into(),
                    framework: Framework::Relativity,
                    is_brainstormed: true,
                }],
            }],
            daily_top5_ids: vec!["r1".into()],
        };
        store
            .save(&Snapshot {
                plan,
                completion_status: CompletionState::new(),
            })
            .unwrap();
        store
    }

    #[test]
    fn toggle_persists_and_flips_back() {
        let store = store_with_plan();

        assert!(run_toggle(&store, "r1").unwrap());
        assert!(store.load().unwrap().completion_status.is_done("r1"));

        assert!(!run_toggle(&store, "r1").unwrap());
        assert!(!store.load().unwrap().completion_status.is_done("r1"));
    }

    #[test]
    fn unknown_id_is_rejected_without_writing() {
        let store = store_with_plan();
        let err = run_toggle(&store, "nope").unwrap_err().to_string();
        assert!(err.contains("nope"), "{err}");
        assert!(store.load().unwrap().completion_status.is_empty());
    }

    #[test]
    fn no_saved_matrix_is_an_error() {
        let store = SnapshotStore::new(MemoryStorage::new());
        let err = run_toggle(&store, "r1").unwrap_err().to_string();
        assert_eq!(err, NO_MATRIX_MESSAGE);
    }
}
