// Screen layout:
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Controls: row count, view mode, labels (3 rows)   |
// +--------------------------------------------------+
// | Rows (fill)                                       |
// +--------------------------------------------------+
// | Suggestion (1 row)                                |
// +--------------------------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone)]
pub struct AppLayout {
    pub status_bar: Rect,
    /// Everything between the status bar and the help bar. Used whole when
    /// the form is hidden.
    pub body: Rect,
    pub controls: Rect,
    pub rows: Rect,
    pub suggestion: Rect,
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect) -> AppLayout {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(0),    // body
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let body = outer[1];
    let inner = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // controls
            Constraint::Min(0),    // rows
            Constraint::Length(1), // suggestion
        ])
        .split(body);

    AppLayout {
        status_bar: outer[0],
        body,
        controls: inner[0],
        rows: inner[1],
        suggestion: inner[2],
        help_bar: outer[2],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zones_stack_without_overlap() {
        let layout = build_layout(Rect::new(0, 0, 100, 30));
        assert_eq!(layout.status_bar.y, 0);
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.controls.y, 1);
        assert_eq!(layout.controls.height, 3);
        assert_eq!(layout.rows.y, 4);
        assert_eq!(layout.suggestion.y, layout.rows.y + layout.rows.height);
        assert_eq!(layout.help_bar.y, 29);
        assert_eq!(layout.body.height, 28);
    }

    #[test]
    fn zones_use_full_width() {
        let layout = build_layout(Rect::new(0, 0, 80, 24));
        for rect in [layout.status_bar, layout.controls, layout.rows, layout.help_bar] {
            assert_eq!(rect.width, 80);
        }
    }
}
