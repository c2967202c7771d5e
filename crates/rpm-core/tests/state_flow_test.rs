//! End-to-end tests of the state machine driving a stub generator and a
//! real file store, the same way the dashboard does.

use rpm_core::generate::GenerateError;
use rpm_core::progress::{daily_top5, plan_progress};
use rpm_core::state::{
    AppState, EMPTY_INPUT_MESSAGE, Effect, Msg, Phase, apply_storage_effect, reduce,
    run_generation,
};
use rpm_store::{FileStorage, SnapshotStore, StoreConfig, open_store};
use rpm_test_utils::{StubGenerator, sample_plan};

/// Feed `msg` through the reducer and run every effect it returns, the way
/// the event loop does.
async fn dispatch(
    state: &mut AppState,
    store: &SnapshotStore<FileStorage>,
    generator: &StubGenerator,
    msg: Msg,
) {
    let mut queue = vec![msg];
    while let Some(msg) = queue.pop() {
        for effect in reduce(state, msg) {
            match effect {
                Effect::StartGeneration {
                    request,
                    tasks,
                    goals,
                } => queue.push(run_generation(generator, request, &tasks, &goals).await),
                other => apply_storage_effect(store, &other).unwrap(),
            }
        }
    }
}

#[tokio::test]
async fn generate_toggle_reload_reset() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = StoreConfig::new(tmp.path());
    let store = open_store(&config);
    let generator = StubGenerator::returning(sample_plan());

    let mut state = AppState::restore(store.load());
    assert_eq!(state.phase(), Phase::Input);

    dispatch(&mut state, &store, &generator, Msg::EditTasks("brain dump".into())).await;
    dispatch(&mut state, &store, &generator, Msg::Generate).await;
    assert_eq!(generator.calls(), 1);
    assert_eq!(state.phase(), Phase::Results);
    assert!(state.completion.is_empty());

    dispatch(&mut state, &store, &generator, Msg::Toggle("h1".into())).await;
    dispatch(&mut state, &store, &generator, Msg::Toggle("w1".into())).await;
    dispatch(&mut state, &store, &generator, Msg::Toggle("w2".into())).await;

    // Reload from disk as a new session would.
    let restored = AppState::restore(open_store(&config).load());
    assert_eq!(restored.phase(), Phase::Results);
    assert_eq!(restored.plan, state.plan);
    assert_eq!(restored.completion, state.completion);

    let plan = restored.plan.as_ref().unwrap();
    let progress = plan_progress(plan, &restored.completion);
    assert_eq!((progress.completed, progress.total, progress.percent), (3, 5, 60));
    assert_eq!(daily_top5(plan).len(), 5);

    dispatch(&mut state, &store, &generator, Msg::RequestReset).await;
    dispatch(&mut state, &store, &generator, Msg::ConfirmReset).await;
    assert_eq!(state.phase(), Phase::Input);

    let after_reset = AppState::restore(open_store(&config).load());
    assert_eq!(after_reset, AppState::new());
}

#[tokio::test]
async fn blank_input_never_calls_generator() {
    let tmp = tempfile::TempDir::new().unwrap();
    let store = open_store(&StoreConfig::new(tmp.path()));
    let generator = StubGenerator::returning(sample_plan());

    let mut state = AppState::new();
    dispatch(&mut state, &store, &generator, Msg::Generate).await;

    assert_eq!(generator.calls(), 0);
    assert_eq!(state.error.as_deref(), Some(EMPTY_INPUT_MESSAGE));
    assert!(store.load().is_none());
}

#[tokio::test]
async fn regeneration_resets_completion() {
    let tmp = tempfile::TempDir::new().unwrap();
    let store = open_store(&StoreConfig::new(tmp.path()));
    let generator = StubGenerator::returning(sample_plan());
    generator.push(Ok(sample_plan()));

    let mut state = AppState::new();
    dispatch(&mut state, &store, &generator, Msg::EditGoals("goals".into())).await;
    dispatch(&mut state, &store, &generator, Msg::Generate).await;
    dispatch(&mut state, &store, &generator, Msg::Toggle("h1".into())).await;
    assert!(state.completion.is_done("h1"));

    dispatch(&mut state, &store, &generator, Msg::Generate).await;
    assert_eq!(generator.calls(), 2);
    assert!(state.completion.is_empty());
    assert!(store.load().unwrap().completion_status.is_empty());
}

#[tokio::test]
async fn failed_generation_writes_nothing() {
    let tmp = tempfile::TempDir::new().unwrap();
    let store = open_store(&StoreConfig::new(tmp.path()));
    let generator =
        StubGenerator::failing(GenerateError::Configuration("API Key is missing.".into()));

    let mut state = AppState::new();
    dispatch(&mut state, &store, &generator, Msg::EditTasks("x".into())).await;
    dispatch(&mut state, &store, &generator, Msg::Generate).await;

    assert_eq!(state.phase(), Phase::Input);
    assert!(state.error.as_deref().unwrap().contains("API key"));
    assert!(store.load().is_none());
}
