//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`structs`]: resolved structs and aliases with their sizes
//! - [`fields`]: field table of the selected struct (offset, size, type)
//! - [`bytes`]: byte map showing which field owns each byte
//! - [`failures`]: structs that did not resolve, with the reason
//! - [`status`]: status bar with keybindings and counts
//! - `utils`: shared helpers for borders and scrolling
//!
//! Each pane module exports a `render_*` function taking the frame, its
//! area, the data to show, whether it is focused, and its scroll state.

mod utils;

pub mod bytes;
pub mod failures;
pub mod fields;
pub mod status;
pub mod structs;

// Re-export render functions for convenience
pub use bytes::render_bytes_pane;
pub use failures::render_failures_pane;
pub use fields::render_fields_pane;
pub use status::render_status_bar;
pub use structs::render_structs_pane;
