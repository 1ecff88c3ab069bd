//! Terminal layout inspector built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into three layers:
//!
//! - **[`app`]**: application state, keyboard event loop, pane focus and
//!   navigation between structs
//! - **[`panes`]**: stateless render functions for each visible pane (structs,
//!   fields, byte map, failures, status bar)
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with a
//! [`Resolution`] and call [`App::run`] to start the event loop.
//!
//! [`Resolution`]: crate::generator::Resolution
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
