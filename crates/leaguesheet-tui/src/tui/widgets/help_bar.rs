// Help bar widget: key hints for the current mode.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        hint_text(state),
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

pub fn hint_text(state: &ViewState) -> String {
    if state.confirm_quit {
        return " y:Quit | n:Cancel".to_string();
    }
    let toggle = state
        .hotkey
        .shortcut()
        .map(|s| format!(" | {s}:Show/Hide"))
        .unwrap_or_default();
    if state.hidden {
        return format!(" Ctrl+C:Quit{toggle}");
    }
    format!(
        " Enter:Lookup all | Ctrl+R:Lookup row | Ctrl+X:Clear | Tab:Complete | F1-F5:Rows | Ctrl+T:Mode | Esc:Quit{toggle}"
    )
}
