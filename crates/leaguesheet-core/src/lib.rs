// Library root: champion model, directory, ability sources, lookup
// dispatcher, configuration and the global shortcut abstraction.

pub mod champion;
pub mod config;
pub mod directory;
pub mod dispatcher;
pub mod hotkey;
pub mod source;
