// Library root: exposes the form, protocol and TUI modules so integration
// tests can drive them without a terminal.

pub mod form;
pub mod protocol;
pub mod tui;
