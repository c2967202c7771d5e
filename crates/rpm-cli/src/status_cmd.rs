//! `rpm status` command: show the saved matrix with progress.

use std::fmt::Write as _;

use anyhow::Result;

use rpm_core::progress::{category_progress, daily_top5, plan_progress};
use rpm_store::models::{CompletionState, RpmPlan};
use rpm_store::{SnapshotStore, Storage};

/// Printed when there is nothing saved yet.
pub const NO_MATRIX_MESSAGE: &str =
    "No matrix saved yet. Run `rpm generate` or open the dashboard with `rpm`.";

/// Run the status command.
pub fn run_status<S: Storage>(store: &SnapshotStore<S>) -> Result<()> {
    match store.load() {
        Some(snapshot) => print!("{}", render_summary(&snapshot.plan, &snapshot.completion_status)),
        None => println!("{NO_MATRIX_MESSAGE}"),
    }
    Ok(())
}

fn checkbox(done: bool) -> &'static str {
    if done { "[x]" } else { "[ ]" }
}

/// Render the plan as plain text: overall level, the daily top five, then
/// every category with its reasons.
pub fn render_summary(plan: &RpmPlan, completion: &CompletionState) -> String {
    let mut out = String::new();
    let overall = plan_progress(plan, completion);

    let _ = writeln!(out, "Internalization Level: {}% realized", overall.percent);
    let _ = writeln!(
        out,
        "  {} sparks / {} total reasons",
        overall.completed, overall.total
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "Daily Top 5");
    let top = daily_top5(plan);
    if top.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for entry in &top {
        let _ = writeln!(
            out,
            "  {} {:<8} {}  ({} - {})",
            checkbox(completion.is_done(&entry.reason.id)),
            entry.reason.id,
            entry.reason.description,
            entry.category_name,
            entry.reason.framework.label(),
        );
    }

    for category in &plan.categories {
        let progress = category_progress(category, completion);
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{}  {}% realized ({} reasons)",
            category.name, progress.percent, progress.total
        );
        let _ = writeln!(out, "  Outcome: {}", category.outcome);
        let _ = writeln!(out, "  Purpose: {}", category.purpose);
        for reason in &category.reasons {
            let _ = writeln!(
                out,
                "  {} {:<8} {}  [{}]",
                checkbox(completion.is_done(&reason.id)),
                reason.id,
                reason.description,
                reason.framework.label(),
            );
        }
    }

    out
}
