// Form state: five lookup rows, of which the first 1-5 are visible.
//
// The controller is owned by the UI loop and is the only writer of row
// state. Batch operations only touch visible rows; results from the
// dispatcher are written to whichever row they name, visible or not.

use leaguesheet_core::champion::{Icon, LookupRequest, LookupResult, ViewMode, SLOT_COUNT};
use leaguesheet_core::directory::ChampionDirectory;

/// Number of row slots the form owns.
pub const ROW_COUNT: usize = 5;

/// Hint text shown in an empty entry. An entry holding exactly this text is
/// treated as empty.
pub const PLACEHOLDER: &str = "Champion name";

/// Shown in every value cell of a row while its lookup is in flight.
pub const PENDING: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowState {
    #[default]
    Blank,
    Pending,
    Found,
    NotFound,
}

#[derive(Debug, Clone, Default)]
pub struct FormRow {
    pub entry: String,
    pub values: [String; SLOT_COUNT],
    pub icons: Option<[Option<Icon>; SLOT_COUNT]>,
    /// Resolved champion name of the last result.
    pub champion: Option<String>,
    pub state: RowState,
}

impl FormRow {
    /// Entry text, or `None` when it is blank or the placeholder.
    pub fn query(&self) -> Option<&str> {
        let text = self.entry.trim();
        if text.is_empty() || text.eq_ignore_ascii_case(PLACEHOLDER) {
            None
        } else {
            Some(text)
        }
    }

    fn clear(&mut self) {
        *self = FormRow::default();
    }

    fn mark_pending(&mut self) {
        self.values = std::array::from_fn(|_| PENDING.to_string());
        self.icons = None;
        self.champion = None;
        self.state = RowState::Pending;
    }
}

#[derive(Debug, Clone)]
pub struct FormController {
    rows: [FormRow; ROW_COUNT],
    visible: usize,
    focused: usize,
    view_mode: ViewMode,
}

impl Default for FormController {
    fn default() -> Self {
        FormController {
            rows: Default::default(),
            visible: ROW_COUNT,
            focused: 0,
            view_mode: ViewMode::default(),
        }
    }
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[FormRow; ROW_COUNT] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&FormRow> {
        self.rows.get(index)
    }

    pub fn visible_rows(&self) -> &[FormRow] {
        &self.rows[..self.visible]
    }

    pub fn visible_count(&self) -> usize {
        self.visible
    }

    /// Show the first `n` rows, `n` clamped to 1..=5. Focus moves up if its
    /// row is hidden.
    pub fn set_visible_count(&mut self, n: usize) {
        self.visible = n.clamp(1, ROW_COUNT);
        self.focused = self.focused.min(self.visible - 1);
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Mode used by requests built from now on. Results already shown are
    /// left as they are.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn toggle_view_mode(&mut self) {
        self.view_mode = self.view_mode.toggled();
    }

    // -- Batch operations --

    pub fn lookup_all(&mut self) -> Vec<LookupRequest> {
        (0..self.visible)
            .filter_map(|index| self.lookup_row(index))
            .collect()
    }

    /// Request for one visible row. `None` for hidden rows and rows with no
    /// query.
    pub fn lookup_row(&mut self, index: usize) -> Option<LookupRequest> {
        if index >= self.visible {
            return None;
        }
        let view_mode = self.view_mode;
        let row = &mut self.rows[index];
        let raw_name = row.query()?.to_string();
        row.mark_pending();
        Some(LookupRequest {
            row_index: index,
            raw_name,
            view_mode,
        })
    }

    pub fn lookup_focused(&mut self) -> Option<LookupRequest> {
        self.lookup_row(self.focused)
    }

    pub fn clear_all(&mut self) {
        for row in &mut self.rows[..self.visible] {
            row.clear();
        }
    }

    /// Write a finished lookup into its row. The last result for a row wins,
    /// including results for requests issued before the row was cleared.
    pub fn apply_result(&mut self, result: LookupResult) {
        let Some(row) = self.rows.get_mut(result.row_index) else {
            return;
        };
        row.state = if result.found {
            RowState::Found
        } else {
            RowState::NotFound
        };
        row.values = result.values;
        row.icons = result.icons;
        row.champion = result.champion;
    }

    // -- Focus and editing --

    pub fn focused(&self) -> usize {
        self.focused
    }

    pub fn focus_next(&mut self) {
        self.focused = (self.focused + 1) % self.visible;
    }

    pub fn focus_prev(&mut self) {
        self.focused = (self.focused + self.visible - 1) % self.visible;
    }

    pub fn set_entry(&mut self, index: usize, text: &str) {
        if let Some(row) = self.rows.get_mut(index) {
            row.entry = text.to_string();
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.rows[self.focused].entry.push(c);
    }

    pub fn delete_char(&mut self) {
        self.rows[self.focused].entry.pop();
    }

    /// Top autocomplete candidate for the focused row, if it differs from
    /// what is already typed.
    pub fn suggestion(&self, directory: &ChampionDirectory) -> Option<String> {
        let query = self.rows[self.focused].query()?;
        directory
            .complete(query, 1)
            .into_iter()
            .next()
            .filter(|name| name != query)
    }

    /// Replace the focused entry with its top suggestion. Returns whether
    /// anything changed.
    pub fn accept_suggestion(&mut self, directory: &ChampionDirectory) -> bool {
        match self.suggestion(directory) {
            Some(name) => {
                self.rows[self.focused].entry = name;
                true
            }
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
