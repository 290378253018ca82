// Components module - UI building blocks
//
// - Title bar: app name, service, current prompt
// - Code panel: the rendered code block
// - Prompt input: the controlled prompt form
// - Status bar: session status and key hints
// - Logs panel: captured log entries
// - Toast: transient notifications

pub mod code_panel;
pub mod logs_panel;
pub mod prompt_input;
pub mod scrollbar;
pub mod status_bar;
pub mod title_bar;
pub mod toast;
