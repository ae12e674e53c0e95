use rand::Rng;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, Widget},
};

use crate::{
    app::App,
    display::{format_clock, progress_percent, Urgency},
    session::Phase,
};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

fn urgency_color(urgency: Urgency) -> Color {
    match urgency {
        Urgency::Normal => Color::Cyan,
        Urgency::Warning => Color::Yellow,
        Urgency::Critical => Color::Red,
    }
}

fn phase_style(phase: Phase) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match phase {
        Phase::Idle => bold.fg(Color::Gray),
        Phase::Running => bold.fg(Color::Green),
        Phase::Paused => bold.fg(Color::Yellow),
        Phase::Finished => bold.fg(Color::Magenta),
    }
}

fn legend(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "(s)tart / (r)eset / (q)uit",
        Phase::Running => "(p)ause / (x) stop / (r)eset / (q)uit",
        Phase::Paused => "(p) resume / (x) stop / (r)eset / (q)uit",
        Phase::Finished => "(s)tart again / (r)eset / (q)uit",
    }
}

impl<R: Rng> Widget for &App<R> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let state = self.session().state();
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let clock_color = urgency_color(Urgency::for_remaining(state.remaining_seconds));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // exercise title
                Constraint::Length(3), // clock
                Constraint::Length(3), // progress
                Constraint::Length(1), // phase
                Constraint::Length(1), // reps / calories
                Constraint::Min(8),    // sensors
                Constraint::Length(1), // legend
            ])
            .split(area);

        Paragraph::new(Line::from(vec![
            Span::styled(self.exercise.as_str(), bold_style),
            Span::styled(format!("  ·  {}", self.duration_label), dim_style),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        Paragraph::new(Span::styled(
            format_clock(state.remaining_seconds),
            Style::default().patch(bold_style).fg(clock_color),
        ))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Time left"))
        .render(chunks[1], buf);

        let percent = progress_percent(state.remaining_seconds, state.total_seconds);
        Gauge::default()
            .block(Block::default().borders(Borders::ALL))
            .gauge_style(Style::default().fg(clock_color))
            .ratio((percent / 100.0).clamp(0.0, 1.0))
            .label(format!("{percent:.0}%"))
            .render(chunks[2], buf);

        Paragraph::new(Span::styled(
            state.phase.to_string().to_uppercase(),
            phase_style(state.phase),
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

        Paragraph::new(Span::styled(
            format!("{} reps   {:.1} kcal", state.reps, state.calories()),
            bold_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

        let rows = state.sensor.axes().into_iter().map(|(label, value)| {
            let unit = if label.starts_with("accel") {
                "m/s²"
            } else {
                "°/s"
            };
            Row::new(vec![
                Cell::from(label),
                Cell::from(format!("{value:>8.2}")),
                Cell::from(unit),
            ])
        });

        Table::new(
            rows,
            [
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Min(5),
            ],
        )
        .header(Row::new(vec!["axis", "value", "unit"]).style(dim_style))
        .block(Block::default().borders(Borders::ALL).title("Sensors"))
        .render(chunks[5], buf);

        Paragraph::new(Span::styled(legend(state.phase), italic_style))
            .alignment(Alignment::Center)
            .render(chunks[6], buf);
    }
}
