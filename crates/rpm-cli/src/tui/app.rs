//! TUI application state: the shared [`AppState`] plus view-only state such
//! as focus and selection.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{info, warn};

use rpm_core::generate::PlanGenerator;
use rpm_core::progress::daily_top5;
use rpm_core::state::{AppState, Effect, Msg, Phase, apply_storage_effect, reduce, run_generation};
use rpm_store::{FileStorage, SnapshotStore, Storage};

/// Which input box receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Tasks,
    Goals,
}

/// Which results panel the cursor moves in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    TopFive,
    Matrix,
}

/// Application state for the TUI.
pub struct App<S: Storage = FileStorage> {
    pub state: AppState,
    store: SnapshotStore<S>,
    generator: Arc<dyn PlanGenerator>,
    results_tx: UnboundedSender<Msg>,
    results_rx: UnboundedReceiver<Msg>,
    pub field: Field,
    pub pane: Pane,
    pub selected_top: usize,
    /// Index into the plan's reasons in display order.
    pub selected_reason: usize,
    pub show_help: bool,
    pub tick_rate: Duration,
    /// Advances on every idle tick; drives the loading spinner.
    pub tick: usize,
    pub should_quit: bool,
    pub status_message: Option<String>,
}

impl<S: Storage> App<S> {
    /// Build the app, restoring any saved matrix from `store`.
    pub fn new(store: SnapshotStore<S>, generator: Arc<dyn PlanGenerator>) -> Self {
        let state = AppState::restore(store.load());
        if let Some(plan) = state.plan.as_ref() {
            info!(
                categories = plan.categories.len(),
                reasons = plan.reason_count(),
                "restored saved matrix"
            );
        }
        let (results_tx, results_rx) = unbounded_channel();
        Self {
            state,
            store,
            generator,
            results_tx,
            results_rx,
            field: Field::Tasks,
            pane: Pane::TopFive,
            selected_top: 0,
            selected_reason: 0,
            show_help: false,
            tick_rate: Duration::from_millis(120),
            tick: 0,
            should_quit: false,
            status_message: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Feed `msg` through the reducer and run the effects it asks for.
    pub fn dispatch(&mut self, msg: Msg) {
        for effect in reduce(&mut self.state, msg) {
            match effect {
                Effect::StartGeneration {
                    request,
                    tasks,
                    goals,
                } => self.spawn_generation(request, tasks, goals),
                other => {
                    if let Err(e) = apply_storage_effect(&self.store, &other) {
                        warn!(error = %e, "failed to write matrix");
                        self.status_message = Some(format!("Save failed: {e}"));
                    }
                }
            }
        }
        self.clamp_selection();
    }

    fn spawn_generation(&self, request: u64, tasks: String, goals: String) {
        info!(generator = self.generator.name(), request, "starting generation");
        let generator = Arc::clone(&self.generator);
        let tx = self.results_tx.clone();
        tokio::spawn(async move {
            let msg = run_generation(generator.as_ref(), request, &tasks, &goals).await;
            // The receiver only goes away when the dashboard exits.
            let _ = tx.send(msg);
        });
    }

    /// Deliver finished generations to the reducer. Called once per loop.
    pub fn poll_generation(&mut self) {
        while let Ok(msg) = self.results_rx.try_recv() {
            self.dispatch(msg);
        }
    }

    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    // -- Input view --

    pub fn focused_text(&self) -> &str {
        match self.field {
            Field::Tasks => &self.state.tasks,
            Field::Goals => &self.state.goals,
        }
    }

    fn set_focused_text(&mut self, text: String) {
        let msg = match self.field {
            Field::Tasks => Msg::EditTasks(text),
            Field::Goals => Msg::EditGoals(text),
        };
        self.dispatch(msg);
    }

    pub fn insert_char(&mut self, c: char) {
        let mut text = self.focused_text().to_string();
        text.push(c);
        self.set_focused_text(text);
    }

    pub fn backspace(&mut self) {
        let mut text = self.focused_text().to_string();
        if text.pop().is_some() {
            self.set_focused_text(text);
        }
    }

    pub fn next_field(&mut self) {
        self.field = match self.field {
            Field::Tasks => Field::Goals,
            Field::Goals => Field::Tasks,
        };
    }

    pub fn generate(&mut self) {
        self.dispatch(Msg::Generate);
    }

    // -- Results view --

    fn row_count(&self) -> usize {
        let Some(plan) = self.state.plan.as_ref() else {
            return 0;
        };
        match self.pane {
            Pane::TopFive => daily_top5(plan).len(),
            Pane::Matrix => plan.reason_count(),
        }
    }

    fn selection_mut(&mut self) -> &mut usize {
        match self.pane {
            Pane::TopFive => &mut self.selected_top,
            Pane::Matrix => &mut self.selected_reason,
        }
    }

    pub fn move_up(&mut self) {
        let selected = self.selection_mut();
        if *selected > 0 {
            *selected -= 1;
        }
    }

    pub fn move_down(&mut self) {
        let count = self.row_count();
        let selected = self.selection_mut();
        if count > 0 && *selected < count - 1 {
            *selected += 1;
        }
    }

    pub fn cycle_pane(&mut self) {
        self.pane = match self.pane {
            Pane::TopFive => Pane::Matrix,
            Pane::Matrix => Pane::TopFive,
        };
    }

    fn clamp_selection(&mut self) {
        let Some(plan) = self.state.plan.as_ref() else {
            self.selected_top = 0;
            self.selected_reason = 0;
            return;
        };
        let top = daily_top5(plan).len();
        let all = plan.reason_count();
        self.selected_top = self.selected_top.min(top.saturating_sub(1));
        self.selected_reason = self.selected_reason.min(all.saturating_sub(1));
    }

    /// ID of the reason under the cursor in the active pane.
    pub fn selected_reason_id(&self) -> Option<String> {
        let plan = self.state.plan.as_ref()?;
        match self.pane {
            Pane::TopFive => daily_top5(plan)
                .get(self.selected_top)
                .map(|entry| entry.reason.id.clone()),
            Pane::Matrix => plan
                .reasons()
                .nth(self.selected_reason)
                .map(|(_, reason)| reason.id.clone()),
        }
    }

    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_reason_id() {
            self.dispatch(Msg::Toggle(id));
        }
    }

    pub fn request_reset(&mut self) {
        self.dispatch(Msg::RequestReset);
    }

    pub fn confirm_reset(&mut self) {
        self.dispatch(Msg::ConfirmReset);
        self.field = Field::Tasks;
        self.pane = Pane::TopFive;
        self.show_help = false;
    }

    pub fn cancel_reset(&mut self) {
        self.dispatch(Msg::CancelReset);
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
