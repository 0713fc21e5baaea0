// TUI: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` holding the form and the status values it
// shows. Lookup workers and the global shortcut push `UiUpdate` messages
// over an mpsc channel; the directory status arrives on a watch channel.
// Both are applied in receive order and the screen re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use leaguesheet_core::directory::{ChampionDirectory, DirectoryStatus};
use leaguesheet_core::dispatcher::LookupDispatcher;
use leaguesheet_core::hotkey::HotkeyStatus;

use crate::form::FormController;
use crate::protocol::{UiUpdate, UserCommand};

use layout::build_layout;

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// Everything the screen shows. Only the TUI loop mutates it.
pub struct ViewState {
    pub form: FormController,
    /// Shared with the workers and the refresh task; used for autocomplete.
    pub directory: ChampionDirectory,
    /// Labels above the four value columns.
    pub columns: Vec<String>,
    pub directory_status: DirectoryStatus,
    pub hotkey: HotkeyStatus,
    /// Whether the quit confirmation dialog is open.
    pub confirm_quit: bool,
    /// Toggled by the show/hide shortcut.
    pub hidden: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            form: FormController::new(),
            directory: ChampionDirectory::default(),
            columns: Vec::new(),
            directory_status: DirectoryStatus::Local,
            hotkey: HotkeyStatus::Disabled,
            confirm_quit: false,
            hidden: false,
        }
    }
}

impl ViewState {
    pub fn new(directory: ChampionDirectory, columns: Vec<String>, hotkey: HotkeyStatus) -> Self {
        ViewState {
            directory,
            columns,
            hotkey,
            ..ViewState::default()
        }
    }

    /// Label for value column `i`, falling back to the slot letter.
    pub fn column_label(&self, i: usize) -> &str {
        self.columns
            .get(i)
            .map(String::as_str)
            .or_else(|| leaguesheet_core::champion::SLOT_LABELS.get(i).copied())
            .unwrap_or("")
    }

    pub fn toggle_hidden(&mut self) {
        self.hidden = !self.hidden;
        debug!(hidden = self.hidden, "visibility toggled");
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::LookupFinished(result) => state.form.apply_result(result),
        UiUpdate::ToggleVisibility => state.toggle_hidden(),
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete frame.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    if state.hidden {
        widgets::rows::render_hidden(frame, layout.body, state);
    } else {
        widgets::rows::render_controls(frame, layout.controls, state);
        widgets::rows::render(frame, layout.rows, state);
        widgets::rows::render_suggestion(frame, layout.suggestion, state);
    }
    widgets::help_bar::render(frame, layout.help_bar, state);

    if state.confirm_quit {
        widgets::quit_confirm::render(frame, frame.area());
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop until the user quits.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook that restores the terminal.
/// 3. Selects over UI updates, directory status, keyboard input and the
///    render tick.
/// 4. Restores the terminal on exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    mut status_rx: watch::Receiver<DirectoryStatus>,
    dispatcher: &LookupDispatcher,
    mut view_state: ViewState,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    view_state.directory_status = status_rx.borrow_and_update().clone();
    let mut status_open = true;

    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    None => break,
                }
            }

            // The sender is dropped once the refresh task ends.
            changed = status_rx.changed(), if status_open => {
                match changed {
                    Ok(()) => {
                        view_state.directory_status = status_rx.borrow_and_update().clone();
                        info!("Directory status: {}", view_state.directory_status);
                    }
                    Err(_) => status_open = false,
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(command) = input::handle_key(key_event, &mut view_state) {
                            if !handle_command(command, dispatcher) {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("Terminal input error: {}", e);
                        break;
                    }
                    None => break,
                }
            }

            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    ratatui::restore();

    Ok(())
}

/// Carry out a command. Returns `false` when the loop should stop.
pub fn handle_command(command: UserCommand, dispatcher: &LookupDispatcher) -> bool {
    match command {
        UserCommand::Lookup(requests) => {
            let queued = dispatcher.submit_all(requests);
            debug!(queued, "lookups submitted");
            true
        }
        UserCommand::Quit => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use leaguesheet_core::champion::LookupResult;

    use crate::form::RowState;

    #[test]
    fn view_state_default_is_sensible() {
        let state = ViewState::default();
        assert_eq!(state.form.visible_count(), 5);
        assert_eq!(state.directory_status, DirectoryStatus::Local);
        assert_eq!(state.hotkey, HotkeyStatus::Disabled);
        assert!(state.directory.is_empty());
        assert!(!state.confirm_quit);
        assert!(!state.hidden);
    }

    #[test]
    fn column_labels_fall_back_to_slots() {
        let mut state = ViewState::default();
        assert_eq!(state.column_label(0), "Q");
        assert_eq!(state.column_label(3), "R");
        state.columns = vec!["Q_CD".into(), "W_CD".into()];
        assert_eq!(state.column_label(1), "W_CD");
        assert_eq!(state.column_label(2), "E");
        assert_eq!(state.column_label(7), "");
    }

    #[test]
    fn apply_ui_update_lookup_finished() {
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::LookupFinished(LookupResult::not_found(2)));
        assert_eq!(state.form.row(2).unwrap().state, RowState::NotFound);
    }

    #[test]
    fn apply_ui_update_toggle_visibility() {
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::ToggleVisibility);
        assert!(state.hidden);
        apply_ui_update(&mut state, UiUpdate::ToggleVisibility);
        assert!(!state.hidden);
    }

    #[test]
    fn render_frame_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(100, 20);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.form.set_entry(0, "Ahri");
        state.confirm_quit = true;
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();

        state.hidden = true;
        state.confirm_quit = false;
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();
    }

    #[test]
    fn render_frame_survives_tiny_terminal() {
        let backend = ratatui::backend::TestBackend::new(10, 3);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();
    }

    #[tokio::test]
    async fn quit_command_stops_the_loop() {
        let (tx, _rx) = mpsc::channel::<UiUpdate>(1);
        let dispatcher = LookupDispatcher::start(
            1,
            std::sync::Arc::new(leaguesheet_core::source::sheet::CsvSource::default()),
            ChampionDirectory::default(),
            tx,
            UiUpdate::LookupFinished,
        );
        assert!(handle_command(UserCommand::Lookup(Vec::new()), &dispatcher));
        assert!(!handle_command(UserCommand::Quit, &dispatcher));
    }
}
