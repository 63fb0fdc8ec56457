use ratatui::{prelude::*, widgets::Gauge};

use crate::core::system_monitor::Severity;

/// Color for a severity tier; unclassified metrics are dimmed
pub fn severity_color(severity: Option<Severity>) -> Color {
    match severity {
        Some(Severity::Normal) => Color::Green,
        Some(Severity::Warning) => Color::LightYellow,
        Some(Severity::Critical) => Color::Red,
        None => Color::DarkGray,
    }
}

/// Gauge colored by the metric's severity
pub fn severity_gauge<'a>(percent: Option<f32>, severity: Option<Severity>, label: &'a str) -> Gauge<'a> {
    let ratio = percent.map(|p| (p as f64 / 100.0).clamp(0.0, 1.0)).unwrap_or(0.0);

    Gauge::default()
        .gauge_style(Style::default().fg(severity_color(severity)).bg(Color::Black))
        .ratio(ratio)
        .label(label)
}
