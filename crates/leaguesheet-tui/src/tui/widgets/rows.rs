// Form widgets: the row table, the controls strip above it, the
// autocomplete line below it, and the placeholder shown while hidden.
//
// Each visible row shows "Input N", the entry text (or placeholder) and the
// four values. Values that came with an icon get a marker.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use leaguesheet_core::champion::{Icon, SLOT_COUNT};

use crate::form::{FormRow, RowState, PLACEHOLDER, ROW_COUNT};
use crate::tui::ViewState;

/// Prefix for a value whose ability icon was fetched.
pub const ICON_MARKER: &str = "◆ ";

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let header = Row::new(
        std::iter::once(Cell::from(""))
            .chain(std::iter::once(Cell::from("Champion")))
            .chain((0..SLOT_COUNT).map(|i| Cell::from(state.column_label(i).to_string())))
            .collect::<Vec<_>>(),
    )
    .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));

    let focused = state.form.focused();
    let rows: Vec<Row> = state
        .form
        .visible_rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut cells = vec![
                Cell::from(format!("Input {}", i + 1)),
                entry_cell(row, i == focused),
            ];
            cells.extend((0..SLOT_COUNT).map(|slot| {
                let icon = row.icons.as_ref().and_then(|icons| icons[slot].as_ref());
                Cell::from(value_text(&row.values[slot], icon)).style(value_style(row.state))
            }));
            Row::new(cells)
        })
        .collect();

    let mut widths = vec![Constraint::Length(8), Constraint::Length(20)];
    widths.extend(std::iter::repeat(Constraint::Fill(1)).take(SLOT_COUNT));

    let title = format!(
        "Rows {}/{} | {}",
        state.form.visible_count(),
        ROW_COUNT,
        state.form.view_mode()
    );
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
}

fn entry_cell(row: &FormRow, focused: bool) -> Cell<'static> {
    let (text, mut style) = if row.entry.is_empty() {
        (PLACEHOLDER.to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (row.entry.clone(), Style::default().fg(Color::White))
    };
    if focused {
        style = style.bg(Color::Blue).add_modifier(Modifier::BOLD);
    }
    Cell::from(text).style(style)
}

/// Cell text for one value.
pub fn value_text(value: &str, icon: Option<&Icon>) -> String {
    match icon {
        Some(_) => format!("{ICON_MARKER}{value}"),
        None => value.to_string(),
    }
}

pub fn value_style(state: RowState) -> Style {
    match state {
        RowState::Blank => Style::default(),
        RowState::Pending => Style::default().fg(Color::Yellow),
        RowState::Found => Style::default().fg(Color::Green),
        RowState::NotFound => Style::default().fg(Color::Red),
    }
}

/// Row-count selector and view mode above the table.
pub fn render_controls(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = vec![Span::raw(" Rows: ")];
    for n in 1..=ROW_COUNT {
        let style = if n == state.form.visible_count() {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[F{n}]"), style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::raw(" View: "));
    spans.push(Span::styled(
        state.form.view_mode().label(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ));

    let paragraph =
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

pub fn render_suggestion(frame: &mut Frame, area: Rect, state: &ViewState) {
    let line = match state.form.suggestion(&state.directory) {
        Some(name) => Line::from(vec![
            Span::styled(" Tab: ", Style::default().fg(Color::DarkGray)),
            Span::styled(name, Style::default().fg(Color::Cyan)),
        ]),
        None => Line::from(""),
    };
    frame.render_widget(Paragraph::new(line), area);
}

pub fn render_hidden(frame: &mut Frame, area: Rect, state: &ViewState) {
    let hint = match state.hotkey.shortcut() {
        Some(shortcut) => format!(" Hidden. Press {shortcut} to show."),
        None => " Hidden.".to_string(),
    };
    let paragraph = Paragraph::new(hint)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
