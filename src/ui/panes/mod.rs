//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`source`]: Source code display with syntax highlighting and current line indicator
//! - [`variables`]: Bindings visible at the current frame, with changes highlighted
//! - [`log`]: `console.log` output recorded up to the current frame
//! - [`status`]: Status bar with the step description and keybindings
//!
//! Each pane module exports a `render_*` function that only reads recorded
//! frames; nothing here runs the interpreter.

pub mod log;
pub mod source;
pub mod status;
pub mod variables;

pub use log::{render_log_pane, visible_log_lines};
pub use source::{render_source_pane, SourceScrollState};
pub use status::render_status_bar;
pub use variables::{changed_names, render_variables_pane};
