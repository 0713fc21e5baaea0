// Message types between the lookup workers, the global shortcut listener
// and the TUI loop.

use leaguesheet_core::champion::{LookupRequest, LookupResult};
use leaguesheet_core::hotkey::TriggerCallback;
use tokio::sync::mpsc;
use tracing::debug;

/// Updates pushed into the TUI loop from other tasks.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    /// A worker finished a lookup for the tagged row.
    LookupFinished(LookupResult),
    /// The global shortcut fired.
    ToggleVisibility,
}

/// What a key press asks the loop to do beyond local state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Hand these requests to the dispatcher.
    Lookup(Vec<LookupRequest>),
    Quit,
}

/// Shortcut callback that posts `ToggleVisibility` without blocking the
/// listener thread. A full or closed channel drops the toggle.
pub fn toggle_callback(tx: mpsc::Sender<UiUpdate>) -> TriggerCallback {
    Box::new(move || {
        if let Err(e) = tx.try_send(UiUpdate::ToggleVisibility) {
            debug!("Dropped visibility toggle: {}", e);
        }
    })
}
