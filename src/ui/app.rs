//! Main TUI application state and logic

use crate::ctype::CType;
use crate::generator::Resolution;
use crate::layout::StructLayout;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Structs,
    Fields,
    Bytes,
    Failures,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: structs -> fields -> bytes -> failures)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Structs => FocusedPane::Fields,
            FocusedPane::Fields => FocusedPane::Bytes,
            FocusedPane::Bytes => FocusedPane::Failures,
            FocusedPane::Failures => FocusedPane::Structs,
        }
    }

    /// Move focus to the previous pane (counter-clockwise)
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Structs => FocusedPane::Failures,
            FocusedPane::Fields => FocusedPane::Structs,
            FocusedPane::Bytes => FocusedPane::Fields,
            FocusedPane::Failures => FocusedPane::Bytes,
        }
    }
}

/// The main application state
pub struct App {
    /// Everything resolved from the loaded descriptions
    pub resolution: Resolution,

    /// Registry names in insertion order
    names: Vec<String>,

    /// Index into `names`
    pub selected_struct: usize,

    /// Field of the selected struct
    pub selected_field: usize,

    /// Selections to return to with Backspace
    history: Vec<(usize, usize)>,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub struct_scroll: usize,
    pub field_scroll: usize,
    pub bytes_scroll: usize,
    pub failures_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,
}

impl App {
    pub fn new(resolution: Resolution) -> Self {
        let names = resolution
            .registry
            .iter()
            .map(|layout| layout.name.clone())
            .collect();

        App {
            resolution,
            names,
            selected_struct: 0,
            selected_field: 0,
            history: Vec::new(),
            focused_pane: FocusedPane::Structs,
            struct_scroll: 0,
            field_scroll: 0,
            bytes_scroll: 0,
            failures_scroll: 0,
            should_quit: false,
            status_message: String::from("Ready!"),
        }
    }

    /// Layout of the selected struct
    pub fn current(&self) -> Option<&StructLayout> {
        self.names
            .get(self.selected_struct)
            .and_then(|name| self.resolution.registry.get(name))
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Panes, plus status bar at bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
            .split(main_chunks[0]);

        // Left column: Structs (top) | Failures (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
            .split(columns[0]);

        // Right column: Fields (top) | Byte map (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(columns[1]);

        super::panes::render_structs_pane(
            frame,
            left_rows[0],
            &self.resolution,
            self.selected_struct,
            self.focused_pane == FocusedPane::Structs,
            &mut self.struct_scroll,
        );

        super::panes::render_failures_pane(
            frame,
            left_rows[1],
            &self.resolution.failures,
            self.focused_pane == FocusedPane::Failures,
            &mut self.failures_scroll,
        );

        let current = self
            .names
            .get(self.selected_struct)
            .and_then(|name| self.resolution.registry.get(name));

        super::panes::render_fields_pane(
            frame,
            right_rows[0],
            current,
            current.and_then(|layout| self.resolution.description(&layout.name)),
            self.selected_field,
            self.focused_pane == FocusedPane::Fields,
            &mut self.field_scroll,
        );

        super::panes::render_bytes_pane(
            frame,
            right_rows[1],
            current,
            self.selected_field,
            self.focused_pane == FocusedPane::Bytes,
            &mut self.bytes_scroll,
        );

        super::panes::render_status_bar(
            frame,
            main_chunks[1],
            &self.status_message,
            self.resolution.registry.len(),
            self.resolution.failures.len(),
        );
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Structs => {
                    if self.selected_struct > 0 {
                        self.select_struct(self.selected_struct - 1);
                    }
                }
                FocusedPane::Fields => {
                    self.selected_field = self.selected_field.saturating_sub(1);
                }
                FocusedPane::Bytes => {
                    self.bytes_scroll = self.bytes_scroll.saturating_sub(1);
                }
                FocusedPane::Failures => {
                    self.failures_scroll = self.failures_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Structs => {
                    if self.selected_struct + 1 < self.names.len() {
                        self.select_struct(self.selected_struct + 1);
                    }
                }
                FocusedPane::Fields => {
                    let count = self.current().map_or(0, |layout| layout.fields.len());
                    if self.selected_field + 1 < count {
                        self.selected_field += 1;
                    }
                }
                FocusedPane::Bytes => {
                    self.bytes_scroll = self.bytes_scroll.saturating_add(1);
                }
                FocusedPane::Failures => {
                    self.failures_scroll = self.failures_scroll.saturating_add(1);
                }
            },
            KeyCode::Home => {
                self.select_struct(0);
            }
            KeyCode::End => {
                self.select_struct(self.names.len().saturating_sub(1));
            }
            KeyCode::Enter => self.follow_field(),
            KeyCode::Backspace => match self.history.pop() {
                Some((structure, field)) => {
                    self.select_struct(structure);
                    self.selected_field = field;
                    self.status_message = "Back".to_string();
                }
                None => {
                    self.status_message = "Nothing to go back to".to_string();
                }
            },
            _ => {}
        }
    }

    fn select_struct(&mut self, index: usize) {
        if index < self.names.len() && index != self.selected_struct {
            self.selected_struct = index;
            self.selected_field = 0;
            self.field_scroll = 0;
            self.bytes_scroll = 0;
        }
    }

    /// Jump to the struct the selected field refers to
    fn follow_field(&mut self) {
        let Some(field) = self
            .current()
            .and_then(|layout| layout.fields.get(self.selected_field))
        else {
            self.status_message = "No field selected".to_string();
            return;
        };

        let Some(target) = referenced_struct(&field.ctype).map(str::to_string) else {
            self.status_message = format!("'{}' does not refer to a struct", field.name);
            return;
        };

        match self.names.iter().position(|name| *name == target) {
            Some(index) => {
                self.history.push((self.selected_struct, self.selected_field));
                self.select_struct(index);
                self.focused_pane = FocusedPane::Fields;
                self.status_message = format!("Jumped to {}", target);
            }
            None => {
                self.status_message = format!("'{}' is not resolved", target);
            }
        }
    }
}

/// Struct named by a field type, through pointers and arrays
fn referenced_struct(ctype: &CType) -> Option<&str> {
    match ctype {
        CType::StructRef { name } => Some(name),
        CType::Pointer { to, .. } => referenced_struct(to),
        CType::Array { of, .. } => referenced_struct(of),
        _ => None,
    }
}
