use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph};

use fourth_down_terminal::epa_model::{self, DecisionOutcome};
use fourth_down_terminal::play_data::{self, PlayRow};
use fourth_down_terminal::state::{
    AppState, InputField, MAX_YARDLINE, MAX_YDSTOGO, MIN_YARDLINE, MIN_YDSTOGO,
};

const PUNT_X_BOUNDS: [f64; 2] = [30.0, 80.0];
const PUNT_Y_BOUNDS: [f64; 2] = [-2.0, 2.0];
const FG_X_BOUNDS: [f64; 2] = [0.0, 50.0];
const FG_Y_BOUNDS: [f64; 2] = [-1.5, 1.5];

struct App {
    state: AppState,
    should_quit: bool,
}

impl App {
    fn new() -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent, dataset: &[PlayRow]) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            KeyCode::Tab | KeyCode::BackTab => self.state.toggle_focus(),
            KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('+') => self.state.adjust(1),
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('-') => self.state.adjust(-1),
            KeyCode::Backspace => self.state.backspace(),
            KeyCode::Char(ch) if ch.is_ascii_digit() => {
                self.state.push_digit(ch as u8 - b'0');
            }
            KeyCode::Enter => self.run_recommendation(dataset),
            _ => {}
        }
    }

    fn run_recommendation(&mut self, dataset: &[PlayRow]) {
        let ydstogo = self.state.ydstogo.clamp(MIN_YDSTOGO, MAX_YDSTOGO);
        let yardline = self.state.yardline.clamp(MIN_YARDLINE, MAX_YARDLINE);
        let outcome = epa_model::evaluate(dataset, ydstogo, yardline);
        self.state.push_log(format!(
            "[INFO] 4th and {ydstogo} at the {yardline}: {}",
            outcome.decision.console_label()
        ));
        self.state.queried = Some((ydstogo, yardline));
        self.state.outcome = Some(outcome);
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    // Loading blocks until the history is ready; a first run without a local
    // snapshot downloads every season before the UI appears.
    eprintln!("loading 4th-down play history...");
    let dataset = play_data::analysis_dataset()?;
    eprintln!("{} qualifying plays loaded", dataset.len());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new();
    app.state
        .push_log(format!("[INFO] Dataset ready: {} plays", dataset.len()));
    let res = run_app(&mut terminal, &mut app, dataset);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    dataset: &[PlayRow],
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);

    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key, dataset);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_body(frame, chunks[1], &app.state);

    let footer = Paragraph::new(
        "Tab Switch field | ↑/↓ Adjust | 0-9 Type | Enter Recommendation | ? Help | q Quit",
    )
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    format!(
        "4TH DOWN TERMINAL | 4th and {} at the {} | go / punt / kick by historical EPA",
        state.ydstogo, state.yardline
    )
}

fn render_body(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(5),
        ])
        .split(area);

    render_query_row(frame, rows[0], state);
    render_charts(frame, rows[1], state);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, rows[2]);
}

fn render_query_row(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(22),
            Constraint::Length(26),
            Constraint::Min(30),
        ])
        .split(area);

    render_input(
        frame,
        cols[0],
        "Yards to go (1-10)",
        state.ydstogo,
        state.focus == InputField::YardsToGo,
    );
    render_input(
        frame,
        cols[1],
        "Yards from end zone",
        state.yardline,
        state.focus == InputField::Yardline,
    );

    let recommendation = Paragraph::new(recommendation_line(state))
        .block(Block::default().title("Recommendation").borders(Borders::ALL));
    frame.render_widget(recommendation, cols[2]);
}

fn render_input(frame: &mut Frame, area: Rect, title: &str, value: u8, focused: bool) {
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let value_style = if focused {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let input = Paragraph::new(Span::styled(value.to_string(), value_style)).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(input, area);
}

fn recommendation_line(state: &AppState) -> Line<'static> {
    let Some(outcome) = &state.outcome else {
        return Line::from(Span::styled(
            "Set the situation and press Enter",
            Style::default().fg(Color::DarkGray),
        ));
    };
    match &outcome.decision {
        DecisionOutcome::InsufficientData => Line::from(Span::styled(
            "Insufficient data for this situation.",
            Style::default().fg(Color::Red),
        )),
        DecisionOutcome::Recommend { option, epa } => Line::from(vec![
            Span::raw("Recommended decision: "),
            Span::styled(
                option.label(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" (EPA: {epa:.2})")),
        ]),
    }
}

fn render_charts(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let Some(outcome) = &state.outcome else {
        render_chart_placeholder(frame, cols[0], "EPA vs Punt");
        render_chart_placeholder(frame, cols[1], "EPA vs Field Goal");
        return;
    };
    let (ydstogo, yardline) = state.queried.unwrap_or((state.ydstogo, state.yardline));

    render_comparison_chart(
        frame,
        cols[0],
        format!("4th and {ydstogo} EPA vs Punt"),
        "EPA vs Punt",
        &outcome.vs_punt,
        Color::Yellow,
        PUNT_X_BOUNDS,
        PUNT_Y_BOUNDS,
        yardline,
    );
    render_comparison_chart(
        frame,
        cols[1],
        format!("4th and {ydstogo} EPA vs Field Goal"),
        "EPA vs Field Goal",
        &outcome.vs_field_goal,
        Color::Blue,
        FG_X_BOUNDS,
        FG_Y_BOUNDS,
        yardline,
    );
}

fn render_chart_placeholder(frame: &mut Frame, area: Rect, title: &str) {
    let placeholder = Paragraph::new("No comparison yet")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().title(title.to_string()).borders(Borders::ALL));
    frame.render_widget(placeholder, area);
}

#[allow(clippy::too_many_arguments)]
fn render_comparison_chart(
    frame: &mut Frame,
    area: Rect,
    title: String,
    series_name: &'static str,
    series: &[(f64, f64)],
    accent: Color,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    yardline: u8,
) {
    let marker_x = f64::from(yardline);
    let marker_line = [(marker_x, y_bounds[0]), (marker_x, y_bounds[1])];
    let zero_line = [(x_bounds[0], 0.0), (x_bounds[1], 0.0)];

    let datasets = vec![
        Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::DarkGray))
            .data(&zero_line),
        Dataset::default()
            .name("Your yardline")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&marker_line),
        Dataset::default()
            .name(series_name)
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(accent))
            .data(series),
    ];

    let chart = Chart::new(datasets)
        .block(Block::default().title(title).borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .title("Yards to End Zone")
                .style(Style::default().fg(Color::Gray))
                .bounds(x_bounds)
                .labels(axis_labels(x_bounds)),
        )
        .y_axis(
            Axis::default()
                .title("EPA Difference")
                .style(Style::default().fg(Color::Gray))
                .bounds(y_bounds)
                .labels(axis_labels(y_bounds)),
        );
    frame.render_widget(chart, area);
}

fn axis_labels(bounds: [f64; 2]) -> Vec<Span<'static>> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .iter()
        .map(|val| Span::from(trim_float(*val)))
        .collect()
}

fn trim_float(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{val:.0}")
    } else {
        format!("{val:.1}")
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No queries yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "4th Down Terminal - Help",
        "",
        "Inputs:",
        "  Tab          Switch field",
        "  ↑/k or +     Increase value",
        "  ↓/j or -     Decrease value",
        "  0-9          Type a value",
        "  Backspace    Trim a digit",
        "",
        "Actions:",
        "  Enter        Get recommendation",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
