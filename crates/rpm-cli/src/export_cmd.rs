//! `rpm export` command: write the saved plan and completion map as JSON.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, bail};

use rpm_store::{SnapshotStore, Storage};

use crate::status_cmd::NO_MATRIX_MESSAGE;

/// Export the saved snapshot, in the same camelCase layout it is stored in.
pub fn run_export<S: Storage>(
    store: &SnapshotStore<S>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let Some(snapshot) = store.load() else {
        bail!(NO_MATRIX_MESSAGE);
    };
    let json = serde_json::to_string_pretty(&snapshot).context("failed to serialize matrix")?;

    let mut writer: Box<dyn Write> = if let Some(path) = output {
        Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("cannot create output file: {}", path.display()))?,
        )
    } else {
        Box::new(std::io::stdout().lock())
    };
    writeln!(writer, "{json}")?;
    writer.flush()?;

    if let Some(path) = output {
        println!(
            "Exported {} reasons to {}",
            snapshot.plan.reason_count(),
            path.display()
        );
    }

    Ok(())
}
