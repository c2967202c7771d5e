//! TUI rendering using ratatui.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap};

use rpm_core::progress::{category_progress, daily_top5, plan_progress};
use rpm_core::state::Phase;
use rpm_store::Storage;
use rpm_store::models::{CompletionState, Framework, RpmPlan};

use super::app::{App, Field, Pane};

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// Render the current view.
pub fn render<S: Storage>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Min(5),    // main content
            Constraint::Length(1), // status bar
        ])
        .split(f.area());

    render_title(f, chunks[0]);

    match (app.phase(), app.state.plan.as_ref()) {
        (Phase::Results, Some(plan)) => render_results(f, app, plan, chunks[1]),
        _ => render_input(f, app, chunks[1]),
    }

    render_status_bar(f, app, chunks[2]);

    if app.state.reset_pending {
        render_confirm(f, f.area());
    } else if app.show_help {
        render_help(f, f.area());
    }
}

fn render_title(f: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            " RPM ",
            Style::default()
                .bg(Color::Yellow)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            " 100 Reasons Matrix",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "  Rapid Planning Method",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(title), area);
}

// -- Input view --

fn render_input<S: Storage>(f: &mut Frame, app: &App<S>, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // intro
            Constraint::Min(5),    // text boxes
            Constraint::Length(1), // error
            Constraint::Length(1), // generate button
        ])
        .split(area);

    let intro = Paragraph::new(vec![
        Line::from(Span::styled(
            "The Purpose Generator",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Empty your mind. Every task becomes a reason, every reason becomes fuel.",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    f.render_widget(intro, rows[0]);

    let boxes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    render_text_box(
        f,
        boxes[0],
        "Brain Dump (Current Status)",
        "Tasks, problems, stress... e.g. I'm stuck in my business and need to lose weight.",
        &app.state.tasks,
        app.field == Field::Tasks,
    );
    render_text_box(
        f,
        boxes[1],
        "Desired Outcomes (Dreams)",
        "What do you truly want? e.g. Financial freedom, vitality, impact.",
        &app.state.goals,
        app.field == Field::Goals,
    );

    if let Some(error) = &app.state.error {
        let line = Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
        f.render_widget(Paragraph::new(line), rows[2]);
    }

    let button = if app.state.loading {
        let spin = SPINNER[app.tick % SPINNER.len()];
        Line::from(Span::styled(
            format!(" {spin} Consulting the Council of Sages..."),
            Style::default().fg(Color::Yellow),
        ))
    } else {
        Line::from(vec![
            Span::styled(
                " Ctrl+G ",
                Style::default().bg(Color::Yellow).fg(Color::Black),
            ),
            Span::raw(" Generate 100 Reasons Matrix"),
        ])
    };
    f.render_widget(Paragraph::new(button).alignment(Alignment::Center), rows[3]);
}

fn render_text_box(
    f: &mut Frame,
    area: Rect,
    title: &str,
    placeholder: &str,
    text: &str,
    focused: bool,
) {
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "))
        .border_style(border_style);

    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);

    let paragraph = if text.is_empty() && !focused {
        Paragraph::new(Span::styled(placeholder, Style::default().fg(Color::DarkGray)))
    } else {
        let shown = if focused {
            format!("{text}\u{2588}")
        } else {
            text.to_string()
        };
        // Keep the end of the text (where typing happens) in view.
        let height = wrapped_height(&shown, inner_width);
        let scroll = height.saturating_sub(inner_height);
        Paragraph::new(shown).scroll((scroll, 0))
    };

    f.render_widget(paragraph.block(block).wrap(Wrap { trim: false }), area);
}

// -- Results view --

fn render_results<S: Storage>(f: &mut Frame, app: &App<S>, plan: &RpmPlan, area: Rect) {
    let detail = selected_detail(app, plan);
    let detail_rows = detail
        .as_ref()
        .map(|lines| detail_height(lines, area.width.saturating_sub(2), area.height / 2))
        .unwrap_or(0);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),
            Constraint::Min(4),
            Constraint::Length(detail_rows),
        ])
        .split(area);

    let top_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(rows[0]);

    render_level(f, plan, &app.state.completion, top_row[0]);
    render_top_five(f, app, plan, top_row[1]);
    render_matrix(f, app, plan, rows[1]);
    if let Some(lines) = detail {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Selected Reason ");
        f.render_widget(
            Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: true }),
            rows[2],
        );
    }
}

/// Full text of the reason under the cursor, with its category's outcome and
/// purpose. The list panes cut long text to one row.
fn selected_detail<S: Storage>(app: &App<S>, plan: &RpmPlan) -> Option<Vec<Line<'static>>> {
    let id = app.selected_reason_id()?;
    let (category, reason) = plan.find_reason(&id)?;
    let done = app.state.completion.is_done(&reason.id);
    Some(vec![
        Line::from(vec![
            Span::styled(
                format!(" {} ", reason.framework.label()),
                framework_style(&reason.framework),
            ),
            Span::styled(
                format!("  {}", category.name),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(Span::styled(reason.description.clone(), reason_style(done))),
        Line::from(vec![
            Span::styled("Outcome: ", Style::default().fg(Color::DarkGray)),
            Span::raw(category.outcome.clone()),
        ]),
        Line::from(vec![
            Span::styled("Purpose: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                category.purpose.clone(),
                Style::default().add_modifier(Modifier::ITALIC),
            ),
        ]),
    ])
}

/// Rows the detail panel needs, borders included, capped at `max`.
fn detail_height(lines: &[Line], width: u16, max: u16) -> u16 {
    let text: Vec<String> = lines.iter().map(|line| line.to_string()).collect();
    // Word wrapping can spill one row past the character estimate.
    let rows = wrapped_height(&text.join("\n"), width).saturating_add(1);
    rows.saturating_add(2).min(max.max(4))
}

fn render_level(f: &mut Frame, plan: &RpmPlan, completion: &CompletionState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Internalization Level ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(inner);

    let progress = plan_progress(plan, completion);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Yellow).bg(Color::Black))
        .percent(u16::from(progress.percent))
        .label(format!("{}% realized", progress.percent));
    f.render_widget(gauge, parts[0]);

    let counts = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                progress.completed.to_string(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" sparks"),
        ]),
        Line::from(vec![
            Span::styled(
                progress.total.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(" total reasons"),
        ]),
    ]);
    f.render_widget(counts, parts[1]);
}

fn render_top_five<S: Storage>(f: &mut Frame, app: &App<S>, plan: &RpmPlan, area: Rect) {
    let active = app.pane == Pane::TopFive;
    let block = pane_block(" Daily Top 5 ", active);
    let width = area.width.saturating_sub(4) as usize;

    let lines: Vec<Line> = daily_top5(plan)
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let done = app.state.completion.is_done(&entry.reason.id);
            let tail = format!(
                "  ({} - {})",
                entry.category_name,
                entry.reason.framework.label()
            );
            let desc_width = width.saturating_sub(4 + tail.chars().count());
            let mut line = Line::from(vec![
                Span::raw(checkbox(done)),
                Span::styled(
                    truncate(&entry.reason.description, desc_width),
                    reason_style(done),
                ),
                Span::styled(tail, Style::default().fg(Color::DarkGray)),
            ]);
            if active && i == app.selected_top {
                line = line.style(selected_style());
            }
            line
        })
        .collect();

    let paragraph = if lines.is_empty() {
        Paragraph::new(Span::styled(
            "No daily priorities in this matrix.",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(lines)
    };
    f.render_widget(paragraph.block(block), area);
}

fn render_matrix<S: Storage>(f: &mut Frame, app: &App<S>, plan: &RpmPlan, area: Rect) {
    let active = app.pane == Pane::Matrix;
    let block = pane_block(" The 100 Reasons Matrix ", active);
    let width = area.width.saturating_sub(4) as usize;
    let completion = &app.state.completion;

    let mut lines: Vec<Line> = Vec::new();
    let mut cursor_line = 0usize;
    let mut row = 0usize;

    for category in &plan.categories {
        let progress = category_progress(category, completion);
        lines.push(Line::from(vec![
            Span::styled(
                category.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}% realized", progress.percent),
                Style::default().fg(percent_color(progress.percent)),
            ),
            Span::styled(
                format!("  {} reasons", progress.total),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        lines.push(Line::from(vec![
            Span::styled("  Outcome: ", Style::default().fg(Color::DarkGray)),
            Span::raw(truncate(&category.outcome, width.saturating_sub(11))),
        ]));
        lines.push(Line::from(vec![
            Span::styled("  Purpose: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                truncate(&category.purpose, width.saturating_sub(11)),
                Style::default().add_modifier(Modifier::ITALIC),
            ),
        ]));

        for reason in &category.reasons {
            let done = completion.is_done(&reason.id);
            let badge = format!(" {} ", reason.framework.label());
            let desc_width = width.saturating_sub(8 + badge.chars().count());
            let mut line = Line::from(vec![
                Span::raw("  "),
                Span::raw(checkbox(done)),
                Span::styled(truncate(&reason.description, desc_width), reason_style(done)),
                Span::raw(" "),
                Span::styled(badge, framework_style(&reason.framework)),
            ]);
            if active && row == app.selected_reason {
                line = line.style(selected_style());
                cursor_line = lines.len();
            }
            lines.push(line);
            row += 1;
        }
        lines.push(Line::default());
    }

    let visible = area.height.saturating_sub(2) as usize;
    let scroll = if visible > 0 && cursor_line >= visible {
        cursor_line + 1 - visible
    } else {
        0
    };
    let scroll = u16::try_from(scroll).unwrap_or(u16::MAX);

    f.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);
}

// -- Overlays --

fn render_confirm(f: &mut Frame, area: Rect) {
    let popup = centered_rect(50, 7, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Start over? ")
        .border_style(Style::default().fg(Color::Red));
    let text = vec![
        Line::default(),
        Line::from("This will clear your current Matrix."),
        Line::default(),
        Line::from(vec![
            Span::styled("y", Style::default().fg(Color::Yellow)),
            Span::raw(": clear and start over   "),
            Span::styled("n", Style::default().fg(Color::Yellow)),
            Span::raw(": keep it"),
        ]),
    ];
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center),
        popup,
    );
}

fn render_help(f: &mut Frame, area: Rect) {
    let popup = centered_rect(60, 18, area);
    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("  Brain dump"),
        Line::from("    Tab          Switch between the two fields"),
        Line::from("    Enter        New line"),
        Line::from("    Ctrl+G       Generate the matrix"),
        Line::from("    Esc          Quit"),
        Line::from(""),
        Line::from("  Matrix"),
        Line::from("    j / Down     Move down"),
        Line::from("    k / Up       Move up"),
        Line::from("    Tab          Switch Top 5 / Matrix"),
        Line::from("    Space/Enter  Mark reason realized"),
        Line::from("    n            New matrix (asks first)"),
        Line::from("    q / Esc      Quit"),
        Line::from(""),
        Line::from("  Press any key to close"),
    ];
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(help_text).block(Block::default().borders(Borders::ALL).title(" Help ")),
        popup,
    );
}

fn render_status_bar<S: Storage>(f: &mut Frame, app: &App<S>, area: Rect) {
    let (view_name, hints) = match app.phase() {
        Phase::Input => ("Brain Dump", "Tab:field  Ctrl+G:generate  Esc:quit"),
        Phase::Results => (
            "Matrix",
            "j/k:move  Tab:pane  Space:toggle  n:new  ?:help  q:quit",
        ),
    };
    let status_msg = app.status_message.as_deref().unwrap_or("");

    let bar = Line::from(vec![
        Span::styled(
            format!(" {view_name} "),
            Style::default().bg(Color::Blue).fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(status_msg, Style::default().fg(Color::Green)),
        Span::raw("  "),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ]);

    f.render_widget(Paragraph::new(bar), area);
}

// -- Helpers --

fn pane_block(title: &str, active: bool) -> Block<'_> {
    let border_style = if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style)
}

fn checkbox(done: bool) -> &'static str {
    if done { "[x] " } else { "[ ] " }
}

fn reason_style(done: bool) -> Style {
    if done {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    }
}

fn selected_style() -> Style {
    Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD)
}

fn percent_color(percent: u8) -> Color {
    match percent {
        100 => Color::Green,
        50..=99 => Color::Yellow,
        _ => Color::DarkGray,
    }
}

fn framework_style(framework: &Framework) -> Style {
    let color = match framework {
        Framework::HumanNeeds => Color::LightRed,
        Framework::JungianLibido => Color::Rgb(249, 115, 22),
        Framework::QuantumEconomics => Color::Cyan,
        Framework::Relativity => Color::Magenta,
        Framework::CosmicIdentity => Color::Yellow,
        Framework::TaoistReincarnation => Color::Green,
        Framework::Other(_) => Color::Gray,
    };
    Style::default().fg(Color::Black).bg(color)
}

/// A rectangle `percent_x` wide and `height` rows tall, centred in `area`.
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Rows `text` takes when wrapped at `width` columns.
fn wrapped_height(text: &str, width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = text
        .split('\n')
        .map(|line| line.chars().count().div_ceil(width).max(1))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max <= 3 {
        s.chars().take(max).collect()
    } else {
        let head: String = s.chars().take(max - 3).collect();
        format!("{head}...")
    }
}
