//! Effect execution helpers shared by the dashboard and the CLI commands.

use rpm_store::{SnapshotStore, Storage, StoreError};

use crate::generate::PlanGenerator;

use super::{Effect, Msg};

/// Run a storage effect synchronously. Other effects are ignored.
pub fn apply_storage_effect<S: Storage>(
    store: &SnapshotStore<S>,
    effect: &Effect,
) -> Result<(), StoreError> {
    match effect {
        Effect::Persist(snapshot) => store.save(snapshot),
        Effect::ClearStorage => store.clear(),
        Effect::StartGeneration { .. } => Ok(()),
    }
}

/// Perform the round trip for a `StartGeneration` effect and wrap the
/// outcome as the message to feed back into the reducer.
pub async fn run_generation(
    generator: &dyn PlanGenerator,
    request: u64,
    tasks: &str,
    goals: &str,
) -> Msg {
    let result = generator.generate(tasks, goals).await;
    Msg::GenerationFinished { request, result }
}
