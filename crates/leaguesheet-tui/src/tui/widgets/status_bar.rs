// Status bar widget: directory status, champion count, hotkey status.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use leaguesheet_core::directory::DirectoryStatus;
use leaguesheet_core::hotkey::HotkeyStatus;

use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [directory indicator] [directory status] [champion count] [hotkey]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (dot, dot_color) = directory_indicator(&state.directory_status);
    let spans = vec![
        Span::styled(format!(" {} ", dot), Style::default().fg(dot_color)),
        Span::styled(
            format!("Champions: {}", state.directory_status),
            Style::default().fg(Color::White),
        ),
        Span::styled(" | ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{} known", state.directory.len()),
            Style::default().fg(Color::White),
        ),
        Span::styled(" | ", Style::default().fg(Color::Gray)),
        Span::styled(
            state.hotkey.to_string(),
            Style::default().fg(hotkey_color(&state.hotkey)),
        ),
    ];

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Return the directory dot character and its color.
pub fn directory_indicator(status: &DirectoryStatus) -> (&'static str, Color) {
    match status {
        DirectoryStatus::Local => ("●", Color::Gray),
        DirectoryStatus::Updating => ("●", Color::Yellow),
        DirectoryStatus::Updated { .. } => ("●", Color::Green),
        DirectoryStatus::UpdateFailed => ("●", Color::Red),
    }
}

fn hotkey_color(status: &HotkeyStatus) -> Color {
    match status {
        HotkeyStatus::Global(_) => Color::Green,
        HotkeyStatus::TerminalOnly(..) => Color::Yellow,
        HotkeyStatus::Invalid(_) => Color::Red,
        HotkeyStatus::Disabled => Color::DarkGray,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
