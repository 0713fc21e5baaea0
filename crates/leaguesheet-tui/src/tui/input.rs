// Keyboard input handling.
//
// Translates crossterm key events into form edits and `UserCommand`s.
// Everything except submitting lookups and quitting is handled locally.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use leaguesheet_core::hotkey::{Shortcut, ShortcutKey};

use super::ViewState;
use crate::protocol::UserCommand;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the loop has to act (submit lookups or
/// quit), `None` when the key was handled by mutating `ViewState`.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Windows reports releases too.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key_event.code == KeyCode::Char('c') {
        return Some(UserCommand::Quit);
    }

    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    if let Some(shortcut) = view_state.hotkey.shortcut() {
        if matches_shortcut(&shortcut, &key_event) {
            view_state.toggle_hidden();
            return None;
        }
    }

    if view_state.hidden {
        return None;
    }

    let form = &mut view_state.form;
    match key_event.code {
        // Row count
        KeyCode::F(n @ 1..=5) => {
            form.set_visible_count(usize::from(n));
            None
        }
        KeyCode::Left if ctrl => {
            form.set_visible_count(form.visible_count().saturating_sub(1));
            None
        }
        KeyCode::Right if ctrl => {
            form.set_visible_count(form.visible_count() + 1);
            None
        }

        KeyCode::Char('t') if ctrl => {
            form.toggle_view_mode();
            None
        }

        // Lookups
        KeyCode::Enter => {
            let requests = form.lookup_all();
            (!requests.is_empty()).then_some(UserCommand::Lookup(requests))
        }
        KeyCode::Char('r') if ctrl => form
            .lookup_focused()
            .map(|request| UserCommand::Lookup(vec![request])),

        KeyCode::Char('x') if ctrl => {
            form.clear_all();
            None
        }

        KeyCode::Tab => {
            form.accept_suggestion(&view_state.directory);
            None
        }

        // Focus
        KeyCode::Up | KeyCode::BackTab => {
            form.focus_prev();
            None
        }
        KeyCode::Down => {
            form.focus_next();
            None
        }

        // Editing
        KeyCode::Backspace => {
            form.delete_char();
            None
        }
        KeyCode::Char(c) if !ctrl && !key_event.modifiers.contains(KeyModifiers::ALT) => {
            form.insert_char(c);
            None
        }

        // Quit: open the confirmation dialog.
        KeyCode::Esc => {
            view_state.confirm_quit = true;
            None
        }

        _ => None,
    }
}

/// Handle key events while the quit dialog is open.
///
/// - `y` or `q` confirms
/// - `n` or `Esc` cancels
/// - everything else is blocked
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

/// Whether `key_event` is the configured show/hide shortcut. Shift is only
/// compared for non-character keys, since terminals fold it into the
/// character.
pub fn matches_shortcut(shortcut: &Shortcut, key_event: &KeyEvent) -> bool {
    let mods = key_event.modifiers;
    if shortcut.ctrl != mods.contains(KeyModifiers::CONTROL)
        || shortcut.alt != mods.contains(KeyModifiers::ALT)
        || shortcut.meta != mods.intersects(KeyModifiers::SUPER | KeyModifiers::META)
    {
        return false;
    }

    match (shortcut.key, key_event.code) {
        (ShortcutKey::Char(want), KeyCode::Char(got)) => want.eq_ignore_ascii_case(&got),
        (key, code) => {
            let same_key = matches!(
                (key, code),
                (ShortcutKey::Space, KeyCode::Char(' '))
                    | (ShortcutKey::Enter, KeyCode::Enter)
                    | (ShortcutKey::Tab, KeyCode::Tab)
            ) || matches!((key, code), (ShortcutKey::F(a), KeyCode::F(b)) if a == b);
            same_key && shortcut.shift == mods.contains(KeyModifiers::SHIFT)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use leaguesheet_core::champion::ViewMode;
    use leaguesheet_core::directory::ChampionDirectory;
    use leaguesheet_core::hotkey::{HotkeyError, HotkeyStatus};

    fn key_with(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        key_with(code, KeyModifiers::NONE)
    }

    fn ctrl_key(code: KeyCode) -> KeyEvent {
        key_with(code, KeyModifiers::CONTROL)
    }

    fn type_text(state: &mut ViewState, text: &str) {
        for c in text.chars() {
            assert!(handle_key(key(KeyCode::Char(c)), state).is_none());
        }
    }

    fn with_hotkey() -> ViewState {
        let shortcut = Shortcut::parse("ctrl+alt+l").unwrap();
        ViewState {
            hotkey: HotkeyStatus::TerminalOnly(shortcut, HotkeyError::Unsupported("test".into())),
            ..ViewState::default()
        }
    }

    // -- Quit --

    #[test]
    fn ctrl_c_quits_immediately() {
        let mut state = ViewState::default();
        assert_eq!(handle_key(ctrl_key(KeyCode::Char('c')), &mut state), Some(UserCommand::Quit));
    }

    #[test]
    fn esc_opens_confirmation() {
        let mut state = ViewState::default();
        assert!(handle_key(key(KeyCode::Esc), &mut state).is_none());
        assert!(state.confirm_quit);

        // Other keys are blocked.
        assert!(handle_key(key(KeyCode::Char('a')), &mut state).is_none());
        assert!(state.form.row(0).unwrap().entry.is_empty());

        assert!(handle_key(key(KeyCode::Char('n')), &mut state).is_none());
        assert!(!state.confirm_quit);

        handle_key(key(KeyCode::Esc), &mut state);
        assert_eq!(handle_key(key(KeyCode::Char('y')), &mut state), Some(UserCommand::Quit));
    }

    #[test]
    fn release_events_are_ignored() {
        let mut state = ViewState::default();
        let mut event = key(KeyCode::Char('a'));
        event.kind = KeyEventKind::Release;
        assert!(handle_key(event, &mut state).is_none());
        assert!(state.form.row(0).unwrap().entry.is_empty());
    }

    // -- Rows and mode --

    #[test]
    fn function_keys_set_row_count() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::F(2)), &mut state);
        assert_eq!(state.form.visible_count(), 2);
        handle_key(key(KeyCode::F(9)), &mut state);
        assert_eq!(state.form.visible_count(), 2);
    }

    #[test]
    fn ctrl_arrows_step_row_count() {
        let mut state = ViewState::default();
        handle_key(ctrl_key(KeyCode::Right), &mut state);
        assert_eq!(state.form.visible_count(), 5);
        for _ in 0..6 {
            handle_key(ctrl_key(KeyCode::Left), &mut state);
        }
        assert_eq!(state.form.visible_count(), 1);
        handle_key(ctrl_key(KeyCode::Right), &mut state);
        assert_eq!(state.form.visible_count(), 2);
    }

    #[test]
    fn ctrl_t_toggles_view_mode() {
        let mut state = ViewState::default();
        handle_key(ctrl_key(KeyCode::Char('t')), &mut state);
        assert_eq!(state.form.view_mode(), ViewMode::Description);
        assert!(state.form.row(0).unwrap().entry.is_empty());
    }

    // -- Lookups --

    #[test]
    fn enter_submits_visible_rows() {
        let mut state = ViewState::default();
        type_text(&mut state, "ahri");
        handle_key(key(KeyCode::Down), &mut state);
        type_text(&mut state, "zz");

        let Some(UserCommand::Lookup(requests)) = handle_key(key(KeyCode::Enter), &mut state)
        else {
            panic!("expected lookups");
        };
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].raw_name, "ahri");
        assert_eq!(requests[1].row_index, 1);
    }

    #[test]
    fn enter_with_nothing_typed_does_nothing() {
        let mut state = ViewState::default();
        assert!(handle_key(key(KeyCode::Enter), &mut state).is_none());
    }

    #[test]
    fn ctrl_r_submits_focused_row() {
        let mut state = ViewState::default();
        type_text(&mut state, "ahri");
        handle_key(key(KeyCode::Down), &mut state);
        type_text(&mut state, "zed");

        let command = handle_key(ctrl_key(KeyCode::Char('r')), &mut state);
        let Some(UserCommand::Lookup(requests)) = command else {
            panic!("expected a lookup");
        };
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].row_index, 1);
    }

    #[test]
    fn ctrl_x_clears_rows() {
        let mut state = ViewState::default();
        type_text(&mut state, "ahri");
        handle_key(ctrl_key(KeyCode::Char('x')), &mut state);
        assert!(state.form.row(0).unwrap().entry.is_empty());
    }

    // -- Editing --

    #[test]
    fn typing_backspace_and_tab_completion() {
        let mut state = ViewState {
            directory: ChampionDirectory::new(["Ahri", "Lee Sin"]),
            ..ViewState::default()
        };
        type_text(&mut state, "lex");
        handle_key(key(KeyCode::Backspace), &mut state);
        assert_eq!(state.form.row(0).unwrap().entry, "le");

        handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(state.form.row(0).unwrap().entry, "Lee Sin");
    }

    #[test]
    fn focus_moves_with_arrows() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Up), &mut state);
        assert_eq!(state.form.focused(), 4);
        handle_key(key(KeyCode::Down), &mut state);
        assert_eq!(state.form.focused(), 0);
    }

    // -- Shortcut --

    #[test]
    fn shortcut_toggles_visibility_and_blocks_editing() {
        let mut state = with_hotkey();
        let toggle = key_with(KeyCode::Char('l'), KeyModifiers::CONTROL | KeyModifiers::ALT);

        handle_key(toggle, &mut state);
        assert!(state.hidden);
        type_text(&mut state, "x");
        assert!(state.form.row(0).unwrap().entry.is_empty());

        handle_key(toggle, &mut state);
        assert!(!state.hidden);
        type_text(&mut state, "l");
        assert_eq!(state.form.row(0).unwrap().entry, "l");
    }

    #[test]
    fn shortcut_matching_rules() {
        let shortcut = Shortcut::parse("ctrl+alt+l").unwrap();
        let both = KeyModifiers::CONTROL | KeyModifiers::ALT;
        assert!(matches_shortcut(&shortcut, &key_with(KeyCode::Char('L'), both | KeyModifiers::SHIFT)));
        assert!(!matches_shortcut(&shortcut, &key_with(KeyCode::Char('l'), KeyModifiers::CONTROL)));
        assert!(!matches_shortcut(&shortcut, &key_with(KeyCode::Char('k'), both)));

        let f5 = Shortcut::parse("ctrl+shift+f5").unwrap();
        let ctrl_shift = KeyModifiers::CONTROL | KeyModifiers::SHIFT;
        assert!(matches_shortcut(&f5, &key_with(KeyCode::F(5), ctrl_shift)));
        assert!(!matches_shortcut(&f5, &key_with(KeyCode::F(5), KeyModifiers::CONTROL)));
    }
}
