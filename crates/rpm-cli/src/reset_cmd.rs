//! `rpm reset` command: discard the saved matrix after confirmation.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use rpm_core::state::{AppState, Msg, apply_storage_effect, reduce};
use rpm_store::{SnapshotStore, Storage};

pub const CONFIRM_PROMPT: &str = "Start over? This will clear your current Matrix. [y/N] ";

/// Run the reset command.
///
/// Unless `yes` is set, reads one line from `input` and only clears storage
/// when it starts with `y`. A saved document that cannot be read back is
/// cleared the same way. Returns whether anything was cleared.
pub fn run_reset<S: Storage>(
    store: &SnapshotStore<S>,
    yes: bool,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool> {
    let mut state = AppState::restore(store.load());
    if state.plan.is_none() {
        if !store.exists().context("failed to read saved matrix")? {
            writeln!(out, "Nothing to reset.")?;
            return Ok(false);
        }
        writeln!(out, "The saved matrix is unreadable.")?;
        if !confirmed(yes, input, out)? {
            writeln!(out, "Left the saved data in place.")?;
            return Ok(false);
        }
        store.clear().context("failed to clear saved matrix")?;
        writeln!(out, "Matrix cleared.")?;
        return Ok(true);
    }

    reduce(&mut state, Msg::RequestReset);

    if !confirmed(yes, input, out)? {
        reduce(&mut state, Msg::CancelReset);
        writeln!(out, "Kept your current Matrix.")?;
        return Ok(false);
    }

    for effect in reduce(&mut state, Msg::ConfirmReset) {
        apply_storage_effect(store, &effect).context("failed to clear saved matrix")?;
    }
    writeln!(out, "Matrix cleared.")?;
    Ok(true)
}

fn confirmed(yes: bool, input: &mut impl BufRead, out: &mut impl Write) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    write!(out, "{CONFIRM_PROMPT}")?;
    out.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().to_ascii_lowercase().starts_with('y'))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use rpm_store::MemoryStorage;
    use rpm_store::snapshot::SNAPSHOT_KEY;
    use rpm_store::models::{CompletionState, RpmPlan, Snapshot};

    fn saved_store() -> SnapshotStore<MemoryStorage> {
        let store = SnapshotStore::new(MemoryStorage::new());
        store
            .save(&Snapshot {
                plan: RpmPlan {
                    categories: vec![],
                    daily_top5_ids: vec![],
                },
                completion_status: CompletionState::new(),
            })
            .unwrap();
        store
    }

    fn reset(store: &SnapshotStore<MemoryStorage>, yes: bool, answer: &str) -> (bool, String) {
        let mut out = Vec::new();
        let cleared = run_reset(store, yes, &mut Cursor::new(answer), &mut out).unwrap();
        (cleared, String::from_utf8(out).unwrap())
    }

    #[test]
    fn confirm_clears_storage() {
        let store = saved_store();
        let (cleared, out) = reset(&store, false, "y\n");
        assert!(cleared);
        assert!(out.starts_with(CONFIRM_PROMPT));
        assert!(store.load().is_none());
    }

    #[test]
    fn decline_keeps_storage() {
        let store = saved_store();
        for answer in ["n\n", "\n", ""] {
            let (cleared, out) = reset(&store, false, answer);
            assert!(!cleared);
            assert!(out.contains("Kept"));
        }
        assert!(store.load().is_some());
    }

    #[test]
    fn yes_flag_skips_prompt() {
        let store = saved_store();
        let (cleared, out) = reset(&store, true, "");
        assert!(cleared);
        assert!(!out.contains(CONFIRM_PROMPT));
        assert!(store.load().is_none());
    }

    #[test]
    fn nothing_saved_is_a_no_op() {
        let store = SnapshotStore::new(MemoryStorage::new());
        let (cleared, out) = reset(&store, true, "");
        assert!(!cleared);
        assert_eq!(out, "Nothing to reset.\n");
    }

    #[test]
    fn unreadable_document_is_cleared() {
        let store = SnapshotStore::new(MemoryStorage::new());
        store.storage().set(SNAPSHOT_KEY, "{\"plan\": 42}").unwrap();

        let (cleared, out) = reset(&store, false, "n\n");
        assert!(!cleared);
        assert!(out.contains("unreadable"));
        assert!(store.exists().unwrap());

        let (cleared, out) = reset(&store, true, "");
        assert!(cleared);
        assert!(out.ends_with("Matrix cleared.\n"));
        assert!(!store.exists().unwrap());
    }
}
