// TUI widget modules.

pub mod help_bar;
pub mod quit_confirm;
pub mod rows;
pub mod status_bar;
