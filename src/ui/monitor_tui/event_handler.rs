use crossterm::event::KeyCode;

/// Events that can occur in the monitor TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Quit the application
    Quit,
    /// Toggle help overlay
    ToggleHelp,
    /// Lengthen the sampling interval by one step
    IntervalUp,
    /// Shorten the sampling interval by one step
    IntervalDown,
    /// No action
    None,
}

impl MonitorEvent {
    pub fn from_key(code: KeyCode) -> Self {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => MonitorEvent::Quit,
            KeyCode::Char('?') | KeyCode::Char('h') => MonitorEvent::ToggleHelp,
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => MonitorEvent::IntervalUp,
            KeyCode::Char('-') | KeyCode::Left => MonitorEvent::IntervalDown,
            _ => MonitorEvent::None,
        }
    }
}
