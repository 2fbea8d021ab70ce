//! Terminal form
//!
//! Rendering functions are pure: they take the query being edited and the
//! current [`View`] and draw widgets. The event loop lives in `terminal`.

mod terminal;

pub use terminal::run;

use crate::input::QueryInput;
use crate::render::View;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const HEADER_HEIGHT: u16 = 2;
const INPUT_HEIGHT: u16 = 6;
const STATUS_HEIGHT: u16 = 1;
const RESULTS_MIN_HEIGHT: u16 = 3;

const HELP: &str = "Enter analyze · Alt+Enter newline · Ctrl+R reset · Esc quit";

/// Render the entire form
pub fn draw(frame: &mut Frame, input: &QueryInput, view: &View) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
            Constraint::Min(RESULTS_MIN_HEIGHT),
        ])
        .split(frame.area());

    let [header_area, input_area, status_area, results_area] = chunks.as_ref() else {
        return;
    };

    draw_header(frame, *header_area);
    draw_input(frame, input, *input_area);
    draw_status(frame, view, *status_area);
    draw_results(frame, view, *results_area);
}

fn draw_header(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::styled(
            "Trade Analysis Platform",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::styled(HELP, Style::default().fg(Color::DarkGray)),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_input(frame: &mut Frame, input: &QueryInput, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Describe your trade");

    let paragraph = if input.query().is_empty() {
        Paragraph::new("For example: Buy 100 shares of AAPL at $200, stop-loss $190, target $220")
            .style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(input.query()).style(Style::default().fg(Color::White))
    };
    frame.render_widget(paragraph.block(block).wrap(Wrap { trim: false }), area);

    // Cursor sits after the last character of the last line
    let line_count = input.query().split('\n').count().max(1);
    let last_line_width = input.query().rsplit('\n').next().map_or(0, |l| l.chars().count());
    let inner_width = area.width.saturating_sub(2);
    let cursor_x = area
        .x
        .saturating_add(1)
        .saturating_add(u16::try_from(last_line_width).unwrap_or(u16::MAX).min(inner_width));
    let cursor_y = area
        .y
        .saturating_add(u16::try_from(line_count).unwrap_or(u16::MAX))
        .min(area.y.saturating_add(area.height.saturating_sub(2)));
    frame.set_cursor_position((cursor_x, cursor_y));
}

fn draw_status(frame: &mut Frame, view: &View, area: Rect) {
    let line = if view.is_loading {
        Line::styled("Analyzing...", Style::default().fg(Color::Blue))
    } else if let Some(error) = &view.error {
        Line::styled(error.as_str(), Style::default().fg(Color::Red))
    } else {
        Line::default()
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_results(frame: &mut Frame, view: &View, area: Rect) {
    let sections = view.sections();
    if sections.is_empty() {
        return;
    }

    let constraints = vec![Constraint::Ratio(1, 3); sections.len()];
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for ((title, body), column) in sections.into_iter().zip(columns.iter()) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(section_color(title)));
        let paragraph = Paragraph::new(body).block(block).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, *column);
    }
}

fn section_color(title: &str) -> Color {
    match title {
        "Trading Analysis" => Color::Blue,
        "Risk Analysis" => Color::Yellow,
        _ => Color::Green,
    }
}
