use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use super::app::MonitorApp;
use super::widgets::{severity_color, severity_gauge};
use crate::core::system_monitor::{Severity, Snapshot, SnapshotView};
use crate::ui::formatters::{format_memory, format_percent, format_temperature, format_timestamp};

/// Main render function
pub fn render_ui(frame: &mut Frame, app: &MonitorApp) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with feed status
            Constraint::Length(5), // CPU section
            Constraint::Length(4), // Memory section
            Constraint::Min(0),
            Constraint::Length(1), // Footer
        ])
        .split(area);

    render_header(frame, chunks[0], app);

    match &app.view {
        SnapshotView::Live(snapshot) => {
            render_cpu_section(frame, chunks[1], snapshot, false);
            render_memory_section(frame, chunks[2], snapshot, false);
        }
        SnapshotView::Stopped(Some(snapshot)) => {
            render_cpu_section(frame, chunks[1], snapshot, true);
            render_memory_section(frame, chunks[2], snapshot, true);
        }
        SnapshotView::NoData => render_placeholder(frame, chunks[1], "Waiting for first sample..."),
        SnapshotView::Stopped(None) => {
            render_placeholder(frame, chunks[1], "Sampler stopped before any data")
        }
    }

    render_footer(frame, chunks[4], app);

    if app.show_help {
        render_help_overlay(frame, area);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let (status, color) = match (&app.fault, &app.view) {
        (Some(fault), _) => (format!("FAULT: {}", fault), Color::Red),
        (None, SnapshotView::NoData) => ("No data yet".to_string(), Color::DarkGray),
        (None, SnapshotView::Live(s)) => (
            format!("Live · updated {}", format_timestamp(s.timestamp)),
            Color::Green,
        ),
        (None, SnapshotView::Stopped(_)) => ("Sampler stopped".to_string(), Color::LightRed),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(status, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw(format!("   Refresh: {:.1}s", app.interval.seconds())),
    ]))
    .block(Block::default().title(" MTech Monitor ").borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn render_placeholder(frame: &mut Frame, area: Rect, text: &str) {
    let placeholder = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(placeholder, area);
}

fn dimmed_if(stale: bool) -> Style {
    if stale {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    }
}

/// Stale gauges lose their severity color and render gray.
fn gauge_tint(severity: Option<Severity>, stale: bool) -> Option<Severity> {
    if stale {
        None
    } else {
        severity
    }
}

fn severity_suffix(severity: Option<Severity>) -> String {
    severity
        .map(|s| format!(" [{}]", s.label()))
        .unwrap_or_default()
}

fn render_cpu_section(frame: &mut Frame, area: Rect, snapshot: &Snapshot, stale: bool) {
    let block = Block::default()
        .title(" CPU ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(severity_color(snapshot.cpu_severity)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let temperature = Paragraph::new(format!(
        "CPU Temperature: {}",
        format_temperature(snapshot.cpu_temperature_c)
    ))
    .style(dimmed_if(stale));
    frame.render_widget(temperature, rows[0]);

    let label = format!(
        "CPU Usage: {}{}",
        format_percent(snapshot.cpu_percent),
        severity_suffix(snapshot.cpu_severity)
    );
    frame.render_widget(
        severity_gauge(snapshot.cpu_percent, gauge_tint(snapshot.cpu_severity, stale), &label),
        rows[1],
    );
}

fn render_memory_section(frame: &mut Frame, area: Rect, snapshot: &Snapshot, stale: bool) {
    let block = Block::default()
        .title(" Memory ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(severity_color(snapshot.memory_severity)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let label = format!(
        "Memory Usage: {}{}",
        format_memory(snapshot.memory.as_ref()),
        severity_suffix(snapshot.memory_severity)
    );
    let percent = snapshot.memory.map(|m| m.percent);
    frame.render_widget(
        severity_gauge(percent, gauge_tint(snapshot.memory_severity, stale), &label),
        rows[0],
    );
}

fn render_footer(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let help = format!(
        " q: Quit │ ?: Help │ +/-: Refresh rate ({:.1}s) ",
        app.interval.seconds()
    );
    let para = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(para, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_text = r#"
    MTech Monitor - Help

    Keyboard Shortcuts:
    ─────────────────────────────────────
    q / Esc     Quit the application
    ? / h       Toggle this help screen
    + / →       Sample less often (+0.1s, max 5.0s)
    - / ←       Sample more often (-0.1s, min 0.1s)
    "#;

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::DarkGray));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .alignment(Alignment::Left);

    // Center the help popup
    let popup_area = centered_rect(60, 50, area);
    frame.render_widget(paragraph, popup_area);
}

/// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
