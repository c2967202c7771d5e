//! Interactive TUI dashboard: the brain-dump form and the matrix view.

pub mod app;
mod ui;

use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use rpm_core::generate::GeminiClient;
use rpm_core::state::Phase;
use rpm_store::{Storage, open_store};

use crate::config::RpmConfig;
use app::App;

/// Launch the interactive TUI dashboard.
pub async fn run_dashboard(config: &RpmConfig) -> Result<()> {
    let store = open_store(&config.store);
    let generator = Arc::new(GeminiClient::new(config.gemini.clone()));
    let mut app = App::new(store, generator);

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_event_loop(&mut terminal, &mut app).await;

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_event_loop<S: Storage>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<S>,
) -> Result<()> {
    let tick_rate = app.tick_rate;

    loop {
        app.poll_generation();

        // Render.
        terminal.draw(|f| ui::render(f, app))?;

        // Poll for events with a timeout matching the tick rate. The poll
        // blocks this thread, so yield afterwards to let generation progress
        // on a current-thread runtime too.
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                handle_key(app, key);
            }
        } else {
            app.on_tick();
        }
        tokio::task::yield_now().await;

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Map one key press onto the app.
fn handle_key<S: Storage>(app: &mut App<S>, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    // Clear status message on any keypress.
    app.status_message = None;

    match app.phase() {
        Phase::Input => handle_input_key(app, key, ctrl),
        Phase::Results => handle_results_key(app, key),
    }
}

fn handle_input_key<S: Storage>(app: &mut App<S>, key: KeyEvent, ctrl: bool) {
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('g') if ctrl => app.generate(),
        KeyCode::Tab | KeyCode::BackTab => app.next_field(),
        KeyCode::Enter => app.insert_char('\n'),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Char(c) if !ctrl => app.insert_char(c),
        _ => {}
    }
}

fn handle_results_key<S: Storage>(app: &mut App<S>, key: KeyEvent) {
    if app.state.reset_pending {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_reset(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_reset(),
            _ => {}
        }
        return;
    }

    if app.show_help {
        app.toggle_help();
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Tab | KeyCode::BackTab => app.cycle_pane(),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_selected(),
        KeyCode::Char('n') => app.request_reset(),
        KeyCode::Char('?') => app.toggle_help(),
        _ => {}
    }
}
